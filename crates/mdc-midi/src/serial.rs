//! Serial front-end: poll a byte source and dispatch events.
//!
//! A UART interrupt (or a host reader thread) pushes raw bytes into a ring
//! buffer; the main loop calls [`MidiSerial::read`] to drain and parse them.

use crossbeam_channel::Receiver;
use ringbuf::traits::{Consumer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::{Handlers, NoteHandler, NoteEventParser};

/// Non-blocking source of incoming MIDI bytes.
pub trait ByteSource {
    /// Next available byte, or `None` if nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;
}

impl ByteSource for HeapCons<u8> {
    #[inline]
    fn read_byte(&mut self) -> Option<u8> {
        self.try_pop()
    }
}

impl ByteSource for Receiver<u8> {
    #[inline]
    fn read_byte(&mut self) -> Option<u8> {
        self.try_recv().ok()
    }
}

impl<'a> ByteSource for core::slice::Iter<'a, u8> {
    #[inline]
    fn read_byte(&mut self) -> Option<u8> {
        self.next().copied()
    }
}

/// Lock-free SPSC byte buffer: push from the receive interrupt, read from the
/// main loop.
pub fn serial_buffer(capacity: usize) -> (HeapProd<u8>, HeapCons<u8>) {
    HeapRb::<u8>::new(capacity).split()
}

/// Byte source, parser and closure handlers bundled for polling.
pub struct MidiSerial<S: ByteSource> {
    source: S,
    parser: NoteEventParser,
    handlers: Handlers,
}

impl<S: ByteSource> MidiSerial<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            parser: NoteEventParser::new(),
            handlers: Handlers::new(),
        }
    }

    pub fn set_note_on_handler(&mut self, f: impl FnMut(u8, u8, u8) + Send + 'static) {
        self.handlers.set_note_on_handler(f);
    }

    pub fn set_note_off_handler(&mut self, f: impl FnMut(u8, u8, u8) + Send + 'static) {
        self.handlers.set_note_off_handler(f);
    }

    pub fn set_pitch_bend_handler(&mut self, f: impl FnMut(u8, u16) + Send + 'static) {
        self.handlers.set_pitch_bend_handler(f);
    }

    /// Drain the source into the registered closures.
    ///
    /// Returns the number of events dispatched.
    pub fn read(&mut self) -> usize {
        let Self {
            source,
            parser,
            handlers,
        } = self;
        drain(source, parser, handlers)
    }

    /// Drain the source into `handler` instead of the registered closures.
    pub fn read_into<H: NoteHandler + ?Sized>(&mut self, handler: &mut H) -> usize {
        drain(&mut self.source, &mut self.parser, handler)
    }

    pub fn parser(&self) -> &NoteEventParser {
        &self.parser
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

fn drain<S: ByteSource, H: NoteHandler + ?Sized>(
    source: &mut S,
    parser: &mut NoteEventParser,
    handler: &mut H,
) -> usize {
    let mut dispatched = 0;
    while let Some(byte) = source.read_byte() {
        if let Some(event) = parser.feed(byte) {
            if handler.dispatch(event) {
                dispatched += 1;
            }
        }
    }
    if dispatched > 0 {
        tracing::trace!("Dispatched {} MIDI events", dispatched);
    }
    dispatched
}
