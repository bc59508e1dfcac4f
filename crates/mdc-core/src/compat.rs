//! Shared synchronization imports.
//!
//! Every module pulls its locks and atomics from here so the primitives used on
//! the interrupt path can be swapped in one place.

pub use parking_lot::Mutex;

pub use std::sync::{Arc, Weak};

pub use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
