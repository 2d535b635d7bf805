//! One superstep over one partition.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::TerminationFlag;
use crate::collections::HugeAtomicBitSet;
use crate::computation::PregelComputation;
use crate::context::ComputeContext;
use crate::convergence::{ConvergenceTracker, WorkerStats};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::messages::Messenger;
use crate::partition::Partition;
use crate::progress::ProgressSink;
use crate::values::NodeValueStore;

/// Everything a worker needs for one superstep, shared by all partitions.
pub(super) struct ComputeStep<'a> {
    superstep: u64,
    graph: &'a dyn Graph,
    computation: &'a dyn PregelComputation,
    values: &'a NodeValueStore,
    messenger: &'a dyn Messenger,
    halted: &'a HugeAtomicBitSet,
    tracker: &'a ConvergenceTracker,
    progress: &'a dyn ProgressSink,
    termination: &'a TerminationFlag,
    abort: AtomicBool,
    first_error: Mutex<Option<Error>>,
}

impl<'a> ComputeStep<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        superstep: u64,
        graph: &'a dyn Graph,
        computation: &'a dyn PregelComputation,
        values: &'a NodeValueStore,
        messenger: &'a dyn Messenger,
        halted: &'a HugeAtomicBitSet,
        tracker: &'a ConvergenceTracker,
        progress: &'a dyn ProgressSink,
        termination: &'a TerminationFlag,
    ) -> Self {
        Self {
            superstep,
            graph,
            computation,
            values,
            messenger,
            halted,
            tracker,
            progress,
            termination,
            abort: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    /// Processes every active node of `partition`, then merges the local
    /// counters into the tracker.
    pub(super) fn run_partition(&self, partition: Partition) {
        let mut stats = WorkerStats::default();
        if let Err(err) = self.process(partition, &mut stats) {
            self.fail(err);
        }
        self.tracker.merge(&stats);
    }

    /// Takes the first error reported by any worker.
    pub(super) fn take_error(&self) -> Option<Error> {
        self.first_error.lock().take()
    }

    fn process(&self, partition: Partition, stats: &mut WorkerStats) -> Result<()> {
        let mut ctx = ComputeContext::new(
            self.superstep,
            self.graph,
            self.values,
            self.messenger,
            self.computation,
        );
        for node in partition.nodes() {
            if self.abort.load(Ordering::Acquire) {
                break;
            }
            if self.termination.is_terminated() {
                return Err(Error::Cancelled {
                    superstep: self.superstep,
                });
            }
            if !self.is_active(node)? {
                continue;
            }

            ctx.move_to(node);
            self.invoke(&mut ctx)?;

            stats.vertices_processed += 1;
            stats.messages_sent += ctx.messages_sent();
            if ctx.voted_to_halt() {
                stats.halted += 1;
                self.halted.set(node)?;
            } else {
                self.halted.clear(node)?;
            }
            self.progress.on_vertex_processed();
        }
        Ok(())
    }

    /// Superstep 0 visits every node; afterwards a node runs if it did not
    /// vote to halt or if any message arrived for it.
    fn is_active(&self, node: u64) -> Result<bool> {
        if self.superstep == 0 {
            return Ok(true);
        }
        Ok(!self.halted.get(node)? || self.messenger.has_messages(node)?)
    }

    fn invoke(&self, ctx: &mut ComputeContext<'_>) -> Result<()> {
        let node_id = ctx.node_id();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if self.superstep == 0 {
                self.computation.init(ctx)
            } else {
                let messages = self.messenger.messages(node_id)?;
                self.computation.compute(ctx, messages)
            }
        }));
        let failure = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err,
            Err(payload) => anyhow::anyhow!("computation panicked: {}", panic_message(&*payload)),
        };
        Err(match failure.downcast::<Error>() {
            Ok(err @ Error::OutOfRange { .. }) => err,
            Ok(err) => Error::Computation {
                superstep: self.superstep,
                node_id,
                source: err.into(),
            },
            Err(source) => Error::Computation {
                superstep: self.superstep,
                node_id,
                source,
            },
        })
    }

    fn fail(&self, err: Error) {
        self.abort.store(true, Ordering::Release);
        let mut slot = self.first_error.lock();
        if slot.is_none() {
            tracing::warn!(superstep = self.superstep, error = %err, "Worker failed, stopping superstep");
            *slot = Some(err);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
