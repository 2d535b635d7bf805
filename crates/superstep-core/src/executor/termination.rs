//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag a caller sets to stop a running computation.
///
/// Workers check it between vertices: the vertex being computed finishes,
/// the rest of the partition is skipped and the run fails with
/// `Error::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag {
    terminated: Arc<AtomicBool>,
}

impl TerminationFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests termination.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
    }

    /// True once [`terminate`](Self::terminate) was called on any clone.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}
