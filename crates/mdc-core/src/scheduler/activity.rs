//! Note-activity bookkeeping shared by device slots and the scheduler.

use crate::compat::Arc;
use crate::{AtomicFlag, AtomicMillis, Clock};

/// Flags and timestamps touched from both the note path and the main loop.
pub struct Activity {
    clock: Arc<dyn Clock>,
    last_activity: AtomicMillis,
    pub(crate) processing: AtomicFlag,
    pub(crate) auto_processing: AtomicFlag,
    pub(crate) pending_start: AtomicFlag,
}

impl Activity {
    pub(crate) fn new(clock: Arc<dyn Clock>, auto_processing: bool) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            last_activity: AtomicMillis::new(now),
            processing: AtomicFlag::new(false),
            auto_processing: AtomicFlag::new(auto_processing),
            pending_start: AtomicFlag::new(false),
        }
    }

    /// Record an assignment. Never starts processing itself, only arms
    /// `pending_start` for the next main-loop poll.
    pub(crate) fn note_assigned(&self) {
        self.touch();
        if self.auto_processing.get() && !self.processing.get() {
            self.pending_start.set(true);
        }
    }

    pub(crate) fn touch(&self) {
        self.last_activity.set(self.clock.now_ms());
    }

    pub(crate) fn idle_for_ms(&self) -> u64 {
        self.last_activity.elapsed_since(self.clock.now_ms())
    }
}
