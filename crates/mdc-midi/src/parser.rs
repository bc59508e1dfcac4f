//! Running-status note parser.
//!
//! Reconstructs channel messages from a byte stream that may arrive in
//! arbitrary fragments. A status byte may be omitted when it repeats the
//! previous one (running status).
//!
//! - Real-time bytes (0xF8-0xFF) are ignored and do not disturb a message in
//!   progress.
//! - System common bytes (0xF0-0xF7) cancel running status; data that follows
//!   them is dropped until the next channel status.
//! - Data bytes with no status to run under are dropped.

use crate::{NoteEvent, NoteHandler};

/// Number of data bytes following a channel status.
#[inline]
fn data_len(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 1,
        _ => 2,
    }
}

fn decode(status: u8, data: [u8; 2]) -> NoteEvent {
    let channel = status & 0x0F;
    match status & 0xF0 {
        0x90 if data[1] == 0 => NoteEvent::NoteOff {
            channel,
            note: data[0],
            velocity: 0,
        },
        0x90 => NoteEvent::NoteOn {
            channel,
            note: data[0],
            velocity: data[1],
        },
        0x80 => NoteEvent::NoteOff {
            channel,
            note: data[0],
            velocity: data[1],
        },
        0xE0 => NoteEvent::PitchBend {
            channel,
            bend: u16::from(data[0]) | (u16::from(data[1]) << 7),
        },
        _ => NoteEvent::Unrecognized { status },
    }
}

/// Incremental byte-to-event decoder.
///
/// Partial messages persist across calls, so bytes can be fed as they arrive.
#[derive(Debug, Clone, Default)]
pub struct NoteEventParser {
    running_status: Option<u8>,
    data: [u8; 2],
    len: usize,
    events: u64,
    discarded: u64,
}

impl NoteEventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns an event when it completes a message.
    pub fn feed(&mut self, byte: u8) -> Option<NoteEvent> {
        if byte >= 0xF8 {
            return None;
        }

        if byte & 0x80 != 0 {
            self.len = 0;
            self.running_status = (byte < 0xF0).then_some(byte);
            return None;
        }

        let status = self.running_status?;
        self.data[self.len] = byte;
        self.len += 1;
        if self.len < data_len(status) {
            return None;
        }

        self.len = 0;
        let event = decode(status, self.data);
        if event.is_recognized() {
            self.events += 1;
        } else {
            self.discarded += 1;
        }
        Some(event)
    }

    /// Feed a slice and dispatch every recognized event to `handler`.
    ///
    /// Returns the number of events dispatched.
    pub fn parse<H: NoteHandler + ?Sized>(&mut self, bytes: &[u8], handler: &mut H) -> usize {
        bytes
            .iter()
            .filter_map(|&b| self.feed(b))
            .filter(|event| handler.dispatch(*event))
            .count()
    }

    /// Decode a slice into events, including unrecognized ones.
    pub fn events<'a>(&'a mut self, bytes: &'a [u8]) -> impl Iterator<Item = NoteEvent> + 'a {
        bytes.iter().filter_map(move |&b| self.feed(b))
    }

    /// Forget running status and any partial message.
    pub fn reset(&mut self) {
        self.running_status = None;
        self.len = 0;
    }

    #[inline]
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// True while a message is partially received.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.len > 0
    }

    /// Recognized events decoded so far.
    pub fn event_count(&self) -> u64 {
        self.events
    }

    /// Complete but unrecognized messages dropped so far.
    pub fn discarded_count(&self) -> u64 {
        self.discarded
    }
}
