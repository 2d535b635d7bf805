//! Progress reporting hooks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives superstep and vertex progress from a running computation.
///
/// `on_vertex_processed` is called from every worker thread.
pub trait ProgressSink: Send + Sync {
    /// A superstep is about to start.
    fn on_superstep_start(&self, superstep: u64);
    /// One vertex finished its `init`/`compute` call.
    fn on_vertex_processed(&self);
    /// All workers passed the barrier of the current superstep.
    fn on_superstep_end(&self);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_superstep_start(&self, _superstep: u64) {}
    fn on_vertex_processed(&self) {}
    fn on_superstep_end(&self) {}
}

/// Logs per-superstep vertex counts through `tracing`.
#[derive(Debug, Default)]
pub struct TracingProgress {
    superstep: AtomicU64,
    processed: AtomicU64,
}

impl TracingProgress {
    /// Creates a sink with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices processed in the current superstep so far.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

impl ProgressSink for TracingProgress {
    fn on_superstep_start(&self, superstep: u64) {
        self.superstep.store(superstep, Ordering::Relaxed);
        self.processed.store(0, Ordering::Relaxed);
        tracing::info!(superstep, "Superstep started");
    }

    fn on_vertex_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_superstep_end(&self) {
        tracing::info!(
            superstep = self.superstep.load(Ordering::Relaxed),
            vertices_processed = self.processed(),
            "Superstep finished"
        );
    }
}
