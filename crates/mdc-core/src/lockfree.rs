//! Lock-free primitives shared between the tick handler and the main loop.

use crate::compat::{AtomicBool as StdAtomicBool, AtomicU64, Ordering};

/// Cache-line aligned atomic bool.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFlag {
    value: StdAtomicBool,
}

impl AtomicFlag {
    pub fn new(value: bool) -> Self {
        Self {
            value: StdAtomicBool::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    #[inline]
    pub fn swap(&self, value: bool) -> bool {
        self.value.swap(value, Ordering::AcqRel)
    }
}

impl Clone for AtomicFlag {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl Default for AtomicFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Cache-line aligned millisecond timestamp.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicMillis {
    value: AtomicU64,
}

impl AtomicMillis {
    pub fn new(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Release);
    }

    /// Milliseconds elapsed between the stored timestamp and `now`.
    ///
    /// Saturates at zero if `now` is behind the stored value.
    #[inline]
    pub fn elapsed_since(&self, now: u64) -> u64 {
        now.saturating_sub(self.get())
    }
}

impl Clone for AtomicMillis {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl Default for AtomicMillis {
    fn default() -> Self {
        Self::new(0)
    }
}
