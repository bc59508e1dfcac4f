//! Output driver traits implemented by hardware layers.
//!
//! The scheduler owns the note state of every device; an [`Actuator`] only
//! turns that state into physical output. Implementations for frequency
//! generators, shift registers or plain digital pins live outside this crate.

/// Physical output behind one device slot.
///
/// `note_on`, `note_off` and `pitch_bend` are called from the main loop.
/// `tick` is called from the timer interrupt and must not block.
pub trait Actuator: Send {
    /// Start producing `note` (0-127).
    fn note_on(&mut self, note: u8);

    /// Stop producing output. Must be safe to call when already silent.
    fn note_off(&mut self);

    /// 14-bit bend value, center 0x2000.
    fn pitch_bend(&mut self, _bend: u16) {}

    /// Refresh output once per timer tick.
    fn tick(&mut self, _resolution_us: u32) {}

    /// Return a mechanism to its rest position.
    fn reset(&mut self) {}

    /// Run a calibration sweep.
    fn calibrate(&mut self) {}
}

/// Actuator that discards all output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullActuator;

impl Actuator for NullActuator {
    fn note_on(&mut self, _note: u8) {}
    fn note_off(&mut self) {}
}

/// Status light toggled when processing starts and stops.
pub trait ActivityIndicator: Send {
    fn set_active(&mut self, active: bool);
}
