//! Centralized error type for the mdc umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mdc_core::Error),

    #[error("Chain: {0}")]
    Chain(#[from] mdc_chain::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] mdc_midi::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
