//! Error types for mdc-core.

use thiserror::Error;

/// Error type for device table and scheduler configuration operations.
///
/// Note-level operations never produce these; they report success as `bool`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Slot {index} out of range (capacity {capacity})")]
    SlotOutOfRange { index: usize, capacity: usize },

    #[error("Slot {0} already occupied")]
    SlotOccupied(usize),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
