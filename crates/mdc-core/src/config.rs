//! Scheduler configuration and compile-time defaults.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hard upper bound on device slots.
pub const MAX_DEVICES: usize = 16;

/// Default tick interval in microseconds.
pub const DEFAULT_RESOLUTION_US: u32 = 40;

/// Default ceiling on how long one device may stay assigned.
pub const DEFAULT_MAX_DURATION_MS: u32 = 10_000;

/// Default inactivity period before processing powers down.
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 10_000;

/// Configuration for [`DeviceScheduler`](crate::DeviceScheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of device slots (1..=`MAX_DEVICES`).
    pub max_devices: usize,
    /// Tick interval of the timer interrupt.
    pub resolution_us: u32,
    /// Per-device watchdog: an assignment older than this is cleared by the tick.
    pub max_duration_ms: u32,
    /// Processing stops after this long without a note assignment. 0 disables.
    pub idle_timeout_ms: u32,
    /// Arm a deferred start whenever a note is assigned while idle.
    pub auto_processing: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_devices: MAX_DEVICES,
            resolution_us: DEFAULT_RESOLUTION_US,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            auto_processing: true,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_devices == 0 || self.max_devices > MAX_DEVICES {
            return Err(Error::InvalidConfig(format!(
                "max_devices {} out of range (1-{})",
                self.max_devices, MAX_DEVICES
            )));
        }
        validate_resolution(self.resolution_us)?;
        validate_max_duration(self.max_duration_ms)?;
        Ok(())
    }
}

pub(crate) fn validate_resolution(resolution_us: u32) -> Result<()> {
    if resolution_us == 0 {
        return Err(Error::InvalidConfig(
            "resolution_us must be non-zero".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_max_duration(max_duration_ms: u32) -> Result<()> {
    if max_duration_ms == 0 {
        return Err(Error::InvalidConfig(
            "max_duration_ms must be non-zero".to_string(),
        ));
    }
    Ok(())
}
