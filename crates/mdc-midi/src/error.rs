//! Error types for mdc-midi.

use thiserror::Error;

/// Error type for building events from raw values.
///
/// The parser never fails: malformed input is dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid MIDI channel {0} (expected 0-15)")]
    InvalidChannel(u8),

    #[error("Invalid MIDI data byte {0:#04x} (expected 0x00-0x7F)")]
    InvalidDataByte(u8),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
