//! Per-channel routing of note events to chains or single devices.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Number of MIDI channels.
pub const CHANNELS: usize = 16;

/// Destination of a channel's note events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Allocate through the chain in this registry slot
    Chain(usize),
    /// Drive this device slot directly
    Device(usize),
}

/// Channel → route table. Channels without a route drop their events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRouting {
    routes: [Option<Route>; CHANNELS],
}

impl Default for ChannelRouting {
    /// Every channel to chain 0.
    fn default() -> Self {
        Self::all(Route::Chain(0))
    }
}

impl ChannelRouting {
    /// No channel routed.
    pub fn empty() -> Self {
        Self {
            routes: [None; CHANNELS],
        }
    }

    /// Every channel to `route`.
    pub fn all(route: Route) -> Self {
        Self {
            routes: [Some(route); CHANNELS],
        }
    }

    /// Channel `n` to device slot `n`, for one-device-per-channel setups.
    pub fn device_per_channel(devices: usize) -> Self {
        let mut routing = Self::empty();
        for (channel, route) in routing.routes.iter_mut().enumerate().take(devices) {
            *route = Some(Route::Device(channel));
        }
        routing
    }

    pub fn set(&mut self, channel: u8, route: Option<Route>) -> Result<()> {
        let slot = self
            .routes
            .get_mut(usize::from(channel))
            .ok_or(mdc_midi::Error::InvalidChannel(channel))?;
        *slot = route;
        Ok(())
    }

    #[inline]
    pub fn get(&self, channel: u8) -> Option<Route> {
        self.routes.get(usize::from(channel)).copied().flatten()
    }

    /// `(channel, route)` for routed channels.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Route)> + '_ {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(channel, route)| route.map(|r| (channel as u8, r)))
    }
}
