//! Global continue/stop decision at each superstep barrier.
//!
//! Workers count locally in a [`WorkerStats`] and hand it over when their
//! partition is done, so the per-vertex hot path never touches shared state.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Counters of one worker for one superstep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Vertices on which `init`/`compute` ran.
    pub vertices_processed: u64,
    /// Processed vertices that voted to halt.
    pub halted: u64,
    /// Messages sent.
    pub messages_sent: u64,
}

impl WorkerStats {
    /// Adds `other` into `self`.
    pub fn merge(&mut self, other: &WorkerStats) {
        self.vertices_processed += other.vertices_processed;
        self.halted += other.halted;
        self.messages_sent += other.messages_sent;
    }
}

/// Totals of one finished superstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperstepStats {
    /// Superstep index.
    pub superstep: u64,
    /// Merged worker counters.
    #[serde(flatten)]
    pub totals: WorkerStats,
    /// Wall time in milliseconds.
    pub elapsed_ms: u64,
}

/// Aggregates halt votes and sent messages across workers.
///
/// The next superstep has work iff some processed vertex stayed active or
/// some message is in flight: a halted vertex is only reactivated by a
/// message, and a vertex that was skipped stays halted.
#[derive(Debug, Default)]
pub struct ConvergenceTracker {
    totals: Mutex<WorkerStats>,
}

impl ConvergenceTracker {
    /// Creates a tracker with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes the counters; called at the start of every superstep.
    pub fn reset(&self) {
        *self.totals.lock() = WorkerStats::default();
    }

    /// Records the halt vote of `node`.
    ///
    /// Per-event form of [`merge`](Self::merge), taking the lock once per
    /// call. The executor's workers batch their counts in a [`WorkerStats`]
    /// instead; this suits callers that record outside a worker loop.
    pub fn record_halt(&self, node: u64) {
        tracing::trace!(node, "Vote to halt");
        self.totals.lock().halted += 1;
    }

    /// Records one sent message. Per-event form of [`merge`](Self::merge).
    pub fn record_message_sent(&self) {
        self.totals.lock().messages_sent += 1;
    }

    /// Merges a worker's local counters at the end of its partition.
    pub fn merge(&self, stats: &WorkerStats) {
        self.totals.lock().merge(stats);
    }

    /// Counters merged so far.
    #[must_use]
    pub fn totals(&self) -> WorkerStats {
        *self.totals.lock()
    }

    /// True iff the active set of the next superstep is non-empty.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        let totals = self.totals();
        totals.vertices_processed > totals.halted || totals.messages_sent > 0
    }
}
