//! Chain member referencing one device slot.

use mdc_core::compat::{Arc, Weak};
use mdc_core::Device;

/// Non-owning handle to a device inside a chain.
///
/// The scheduler owns every device. Once a device is deleted its node stays in
/// the ring but reports unavailable and rejects every operation.
#[derive(Clone)]
pub struct DeviceNode {
    device_index: usize,
    device: Weak<dyn Device>,
}

impl DeviceNode {
    pub fn new<D: Device + 'static>(device: &Arc<D>) -> Self {
        let device: Arc<dyn Device> = device.clone();
        Self {
            device_index: device.id(),
            device: Arc::downgrade(&device),
        }
    }

    /// Slot index of the referenced device.
    #[inline]
    pub fn device_index(&self) -> usize {
        self.device_index
    }

    /// Upgraded handle, or `None` once the device is deleted.
    fn live(&self) -> Option<Arc<dyn Device>> {
        self.device.upgrade().filter(|d| !d.is_removed())
    }

    /// False once the device has been deleted from the scheduler, even if
    /// other handles to it are still alive.
    pub fn is_live(&self) -> bool {
        self.live().is_some()
    }

    pub fn is_available(&self) -> bool {
        self.live().is_some_and(|d| d.is_available())
    }

    pub fn current_note(&self) -> Option<u8> {
        self.live().and_then(|d| d.current_note())
    }

    /// Assign `note` if the device exists and is available.
    pub fn try_assign(&self, note: u8) -> bool {
        self.live().is_some_and(|d| d.try_assign(note))
    }

    /// Clear the device if it exists and holds exactly `note`.
    pub fn try_clear(&self, note: u8) -> bool {
        self.live().is_some_and(|d| d.try_clear(note))
    }

    pub fn pitch_bend(&self, bend: u16) {
        if let Some(device) = self.live() {
            device.pitch_bend(bend);
        }
    }
}

impl core::fmt::Debug for DeviceNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceNode")
            .field("device_index", &self.device_index)
            .field("live", &self.is_live())
            .finish()
    }
}
