//! MIDI input for MDC: running-status parsing and handler dispatch.
//!
//! - [`NoteEventParser`]: Byte-at-a-time decoder for note on/off and pitch bend
//! - [`NoteHandler`] / [`Handlers`]: Event consumers (trait or closures)
//! - [`MidiSerial`]: Polls a [`ByteSource`] such as a `ringbuf` consumer fed
//!   from a UART interrupt
//!
//! # Example
//!
//! ```ignore
//! use mdc_midi::{serial_buffer, MidiSerial};
//!
//! let (mut uart, rx) = serial_buffer(256);
//! let mut serial = MidiSerial::new(rx);
//! serial.set_note_on_handler(|channel, note, velocity| { /* ... */ });
//!
//! loop {
//!     serial.read();
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

mod event;
pub use event::{NoteEvent, BEND_CENTER, BEND_MAX};

mod handler;
pub use handler::{Handlers, NoteHandler};

mod parser;
pub use parser::NoteEventParser;

mod serial;
pub use serial::{serial_buffer, ByteSource, MidiSerial};

mod utils;
pub use utils::{bend_ratio, bent_period_us, note_period_us, note_to_hz, DEFAULT_BEND_RANGE};

// Upstream message types used by `NoteEvent::to_midi_msg`
pub use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};
