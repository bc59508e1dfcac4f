//! Builder for configuring and constructing a `MidiDeviceController`.

use mdc_chain::{ChainRegistry, MAX_CHAINS};
use mdc_core::{
    ActivityIndicator, Arc, Clock, SchedulerConfig, SystemClock, ThreadTimer, Timer,
};

use crate::{ChannelRouting, MidiDeviceController, Result};

/// Timer and clock default to [`ThreadTimer`] and [`SystemClock`]. Hosts that
/// drive ticks themselves (simulators, tests) pass a
/// [`ManualTimer`](mdc_core::ManualTimer) and [`ManualClock`](mdc_core::ManualClock).
///
/// # Example
///
/// ```ignore
/// use mdc::prelude::*;
///
/// let mdc = MidiDeviceController::builder()
///     .max_devices(8)
///     .resolution_us(40)
///     .idle_timeout_ms(5_000)
///     .build()?;
/// ```
pub struct MdcBuilder {
    config: SchedulerConfig,
    chain_capacity: usize,
    routing: ChannelRouting,
    timer: Option<Box<dyn Timer>>,
    clock: Option<Arc<dyn Clock>>,
    indicator: Option<Box<dyn ActivityIndicator>>,
}

impl Default for MdcBuilder {
    fn default() -> Self {
        Self {
            config: SchedulerConfig::default(),
            chain_capacity: MAX_CHAINS,
            routing: ChannelRouting::default(),
            timer: None,
            clock: None,
            indicator: None,
        }
    }
}

impl MdcBuilder {
    /// Replace the whole scheduler configuration.
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 16
    pub fn max_devices(mut self, count: usize) -> Self {
        self.config.max_devices = count;
        self
    }

    /// Default: 16
    pub fn max_chains(mut self, count: usize) -> Self {
        self.chain_capacity = count;
        self
    }

    /// Default: 40
    pub fn resolution_us(mut self, resolution_us: u32) -> Self {
        self.config.resolution_us = resolution_us;
        self
    }

    /// Default: 10000
    pub fn max_duration_ms(mut self, max_duration_ms: u32) -> Self {
        self.config.max_duration_ms = max_duration_ms;
        self
    }

    /// Default: 10000. 0 disables idle shutdown.
    pub fn idle_timeout_ms(mut self, idle_timeout_ms: u32) -> Self {
        self.config.idle_timeout_ms = idle_timeout_ms;
        self
    }

    /// Default: true
    pub fn auto_processing(mut self, enabled: bool) -> Self {
        self.config.auto_processing = enabled;
        self
    }

    /// Default: every channel to chain 0.
    pub fn routing(mut self, routing: ChannelRouting) -> Self {
        self.routing = routing;
        self
    }

    pub fn timer(mut self, timer: impl Timer + 'static) -> Self {
        self.timer = Some(Box::new(timer));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn activity_indicator(mut self, indicator: impl ActivityIndicator + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    pub fn build(self) -> Result<MidiDeviceController> {
        if self.chain_capacity == 0 || self.chain_capacity > MAX_CHAINS {
            return Err(mdc_core::Error::InvalidConfig(format!(
                "max_chains {} out of range (1-{})",
                self.chain_capacity, MAX_CHAINS
            ))
            .into());
        }

        let timer = self
            .timer
            .unwrap_or_else(|| Box::new(ThreadTimer::new()));
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));

        let mut scheduler = mdc_core::DeviceScheduler::new(self.config, timer, clock)?;
        if let Some(indicator) = self.indicator {
            scheduler.set_activity_indicator(indicator);
        }

        tracing::debug!(
            "Built controller: {} device slots, {} chain slots",
            scheduler.max_devices(),
            self.chain_capacity
        );

        Ok(MidiDeviceController::from_parts(
            scheduler,
            ChainRegistry::with_capacity(self.chain_capacity),
            self.routing,
        ))
    }
}
