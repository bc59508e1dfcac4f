//! Event consumers.

use crate::NoteEvent;

/// Receiver of parsed note events.
///
/// Implement this on whatever routes notes to devices; the parser calls it
/// synchronously for each complete, recognized message.
pub trait NoteHandler {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);

    fn note_off(&mut self, channel: u8, note: u8, velocity: u8);

    fn pitch_bend(&mut self, channel: u8, bend: u16);

    /// Route one event to the matching callback. Returns false for
    /// unrecognized events, which are dropped.
    fn dispatch(&mut self, event: NoteEvent) -> bool {
        match event {
            NoteEvent::NoteOn {
                channel,
                note,
                velocity,
            } => self.note_on(channel, note, velocity),
            NoteEvent::NoteOff {
                channel,
                note,
                velocity,
            } => self.note_off(channel, note, velocity),
            NoteEvent::PitchBend { channel, bend } => self.pitch_bend(channel, bend),
            NoteEvent::Unrecognized { .. } => return false,
        }
        true
    }
}

type NoteCallback = Box<dyn FnMut(u8, u8, u8) + Send>;
type BendCallback = Box<dyn FnMut(u8, u16) + Send>;

/// Closure-based [`NoteHandler`]. Unset callbacks ignore their events.
#[derive(Default)]
pub struct Handlers {
    note_on: Option<NoteCallback>,
    note_off: Option<NoteCallback>,
    pitch_bend: Option<BendCallback>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// `f(channel, note, velocity)`
    pub fn set_note_on_handler(&mut self, f: impl FnMut(u8, u8, u8) + Send + 'static) {
        self.note_on = Some(Box::new(f));
    }

    /// `f(channel, note, velocity)`
    pub fn set_note_off_handler(&mut self, f: impl FnMut(u8, u8, u8) + Send + 'static) {
        self.note_off = Some(Box::new(f));
    }

    /// `f(channel, bend)`
    pub fn set_pitch_bend_handler(&mut self, f: impl FnMut(u8, u16) + Send + 'static) {
        self.pitch_bend = Some(Box::new(f));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl NoteHandler for Handlers {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        if let Some(f) = self.note_on.as_mut() {
            f(channel, note, velocity);
        }
    }

    fn note_off(&mut self, channel: u8, note: u8, velocity: u8) {
        if let Some(f) = self.note_off.as_mut() {
            f(channel, note, velocity);
        }
    }

    fn pitch_bend(&mut self, channel: u8, bend: u16) {
        if let Some(f) = self.pitch_bend.as_mut() {
            f(channel, bend);
        }
    }
}

impl core::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handlers")
            .field("note_on", &self.note_on.is_some())
            .field("note_off", &self.note_off.is_some())
            .field("pitch_bend", &self.pitch_bend.is_some())
            .finish()
    }
}
