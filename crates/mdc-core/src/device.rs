//! Device slots: per-actuator note state shared with the tick handler.
//!
//! The assigned note and the elapsed-duration counter live in a single
//! `AtomicU64`, so every transition (assign, clear, watchdog expiry) is one
//! compare-and-swap and neither context can observe a torn state.
//!
//! ```text
//!   bits 63..56   note (0xFF = none)
//!   bits 55..0    microseconds since assignment
//! ```
//!
//! The actuator sits behind a mutex. The main loop locks it; the tick handler
//! only ever `try_lock`s. When the tick cannot silence an expired device it
//! marks the output stale and the main loop finishes the job in
//! [`DeviceSlot::sync_output`].

use core::fmt;

use crate::compat::{Arc, AtomicU64, Mutex, Ordering};
use crate::scheduler::Activity;
use crate::{Actuator, AtomicFlag};

/// Highest valid MIDI note number.
pub const MAX_NOTE: u8 = 127;

const NOTE_SHIFT: u32 = 56;
const ELAPSED_MASK: u64 = (1 << NOTE_SHIFT) - 1;
const NO_NOTE: u64 = 0xFF;
const EMPTY: u64 = NO_NOTE << NOTE_SHIFT;

/// Snapshot of a device's note state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteState {
    pub note: Option<u8>,
    pub elapsed_us: u64,
}

impl NoteState {
    #[inline]
    fn pack(self) -> u64 {
        let note = self.note.map_or(NO_NOTE, u64::from);
        (note << NOTE_SHIFT) | (self.elapsed_us & ELAPSED_MASK)
    }

    #[inline]
    fn unpack(raw: u64) -> Self {
        let note = raw >> NOTE_SHIFT;
        Self {
            note: (note != NO_NOTE).then_some(note as u8),
            elapsed_us: raw & ELAPSED_MASK,
        }
    }
}

/// Capability surface the allocation strategies depend on.
pub trait Device: Send + Sync {
    /// Slot index in the owning scheduler.
    fn id(&self) -> usize;

    fn is_available(&self) -> bool;

    /// True once the device has been deleted from its scheduler.
    fn is_removed(&self) -> bool;

    fn current_note(&self) -> Option<u8>;

    /// Assign `note` if the device is available. Never overwrites a busy device.
    fn try_assign(&self, note: u8) -> bool;

    /// Clear the device if it currently holds exactly `note`.
    fn try_clear(&self, note: u8) -> bool;

    fn pitch_bend(&self, bend: u16);
}

/// One device slot: identity, note state and its actuator.
pub struct DeviceSlot {
    id: usize,
    state: AtomicU64,
    output_stale: AtomicFlag,
    removed: AtomicFlag,
    actuator: Mutex<Box<dyn Actuator>>,
    activity: Arc<Activity>,
}

impl DeviceSlot {
    pub(crate) fn new(id: usize, actuator: Box<dyn Actuator>, activity: Arc<Activity>) -> Self {
        Self {
            id,
            state: AtomicU64::new(EMPTY),
            output_stale: AtomicFlag::new(false),
            removed: AtomicFlag::new(false),
            actuator: Mutex::new(actuator),
            activity,
        }
    }

    #[inline]
    pub fn state(&self) -> NoteState {
        NoteState::unpack(self.state.load(Ordering::Acquire))
    }

    /// Microseconds since the current note was assigned (0 when available).
    #[inline]
    pub fn elapsed_us(&self) -> u64 {
        self.state().elapsed_us
    }

    /// Clear whatever note is held and silence the output.
    ///
    /// Main loop only. Returns the note that was cleared.
    pub fn force_clear(&self) -> Option<u8> {
        let previous = NoteState::unpack(self.state.swap(EMPTY, Ordering::AcqRel));
        self.actuator.lock().note_off();
        self.output_stale.set(false);
        previous.note
    }

    /// Silence an output the tick handler expired but could not reach.
    ///
    /// Main loop only. Returns true if the actuator was silenced.
    pub fn sync_output(&self) -> bool {
        if !self.output_stale.swap(false) {
            return false;
        }
        // A newer assignment may have landed since the expiry
        if self.state().note.is_some() {
            return false;
        }
        self.actuator.lock().note_off();
        true
    }

    /// Retire the slot. It rejects every later assignment and bend.
    ///
    /// Main loop only. Callers still holding a handle keep a silent device.
    pub(crate) fn mark_removed(&self) {
        self.removed.set(true);
    }

    pub fn is_output_stale(&self) -> bool {
        self.output_stale.get()
    }

    pub fn reset(&self) {
        self.actuator.lock().reset();
    }

    pub fn calibrate(&self) {
        self.actuator.lock().calibrate();
    }

    /// Advance the elapsed counter and enforce the duration ceiling.
    ///
    /// Interrupt context. Returns true if this tick expired the assignment.
    pub(crate) fn tick(&self, resolution_us: u32, max_duration_us: u64) -> bool {
        let step = u64::from(resolution_us);
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                let current = NoteState::unpack(raw);
                current.note?;
                let elapsed = current.elapsed_us.saturating_add(step).min(ELAPSED_MASK);
                if elapsed > max_duration_us {
                    Some(EMPTY)
                } else {
                    Some(
                        NoteState {
                            note: current.note,
                            elapsed_us: elapsed,
                        }
                        .pack(),
                    )
                }
            });

        let expired = match previous {
            Ok(raw) => NoteState::unpack(raw).elapsed_us.saturating_add(step) > max_duration_us,
            Err(_) => false,
        };

        match self.actuator.try_lock() {
            Some(mut actuator) => {
                if expired {
                    actuator.note_off();
                }
                actuator.tick(resolution_us);
            }
            None => {
                if expired {
                    self.output_stale.set(true);
                }
            }
        }

        expired
    }
}

impl Device for DeviceSlot {
    fn id(&self) -> usize {
        self.id
    }

    fn is_available(&self) -> bool {
        !self.removed.get() && self.state().note.is_none()
    }

    fn is_removed(&self) -> bool {
        self.removed.get()
    }

    fn current_note(&self) -> Option<u8> {
        self.state().note
    }

    fn try_assign(&self, note: u8) -> bool {
        if note > MAX_NOTE || self.removed.get() {
            return false;
        }

        let assigned = NoteState {
            note: Some(note),
            elapsed_us: 0,
        }
        .pack();

        let won = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                NoteState::unpack(raw).note.is_none().then_some(assigned)
            })
            .is_ok();

        if !won {
            return false;
        }

        self.actuator.lock().note_on(note);
        self.output_stale.set(false);
        self.activity.note_assigned();
        true
    }

    fn try_clear(&self, note: u8) -> bool {
        let cleared = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (NoteState::unpack(raw).note == Some(note)).then_some(EMPTY)
            })
            .is_ok();

        if cleared {
            self.actuator.lock().note_off();
        }
        cleared
    }

    fn pitch_bend(&self, bend: u16) {
        if self.removed.get() {
            return;
        }
        self.actuator.lock().pitch_bend(bend);
    }
}

impl fmt::Debug for DeviceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSlot")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("output_stale", &self.output_stale.get())
            .field("removed", &self.removed.get())
            .finish()
    }
}
