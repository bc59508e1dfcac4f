//! Error types for mdc-chain.

use thiserror::Error;

/// Error type for chain construction and registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Chain slot {index} out of range (capacity {capacity})")]
    SlotOutOfRange { index: usize, capacity: usize },

    #[error("Chain slot {0} already occupied")]
    SlotOccupied(usize),

    #[error("Chain has no member devices")]
    EmptyChain,

    #[error("No device at slot {0}")]
    UnknownDevice(usize),

    #[error("Device {0} listed twice")]
    DuplicateMember(usize),

    #[error("Chain full (capacity {capacity})")]
    ChainFull { capacity: usize },
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
