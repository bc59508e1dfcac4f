//! Tick handler run from the timer interrupt.

use arc_swap::ArcSwap;

use crate::compat::{Arc, AtomicU32, AtomicU64, Ordering};
use crate::{Device, DeviceSlot, TickHandler};

/// State read by the tick handler.
///
/// The enabled-device list is published through `ArcSwap`, so reloading it on
/// the main loop never blocks a tick in progress.
pub(crate) struct TickContext {
    enabled: ArcSwap<Vec<Arc<DeviceSlot>>>,
    resolution_us: AtomicU32,
    max_duration_us: AtomicU64,
    ticks: AtomicU64,
    expirations: AtomicU64,
}

impl TickContext {
    pub(crate) fn new(resolution_us: u32, max_duration_ms: u32) -> Self {
        Self {
            enabled: ArcSwap::from_pointee(Vec::new()),
            resolution_us: AtomicU32::new(resolution_us),
            max_duration_us: AtomicU64::new(u64::from(max_duration_ms) * 1000),
            ticks: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    pub(crate) fn publish(&self, devices: Vec<Arc<DeviceSlot>>) {
        self.enabled.store(Arc::new(devices));
    }

    pub(crate) fn enabled_count(&self) -> usize {
        self.enabled.load().len()
    }

    pub(crate) fn is_enabled(&self, index: usize) -> bool {
        self.enabled.load().iter().any(|d| d.id() == index)
    }

    pub(crate) fn set_resolution_us(&self, value: u32) {
        self.resolution_us.store(value, Ordering::Release);
    }

    pub(crate) fn set_max_duration_ms(&self, value: u32) {
        self.max_duration_us
            .store(u64::from(value) * 1000, Ordering::Release);
    }

    pub(crate) fn max_duration_ms(&self) -> u32 {
        (self.max_duration_us.load(Ordering::Acquire) / 1000) as u32
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub(crate) fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }
}

impl TickHandler for TickContext {
    fn on_tick(&self) {
        let resolution_us = self.resolution_us.load(Ordering::Acquire);
        let max_duration_us = self.max_duration_us.load(Ordering::Acquire);

        let devices = self.enabled.load();
        for device in devices.iter() {
            if device.tick(resolution_us, max_duration_us) {
                self.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}
