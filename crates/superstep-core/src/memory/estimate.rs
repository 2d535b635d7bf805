//! Pre-flight estimate of a whole run.

use super::MemoryRange;
use crate::collections::HugeAtomicBitSet;
use crate::convergence::WorkerStats;
use crate::error::Result;
use crate::messages::{MessengerKind, QueueMessenger, ReducingMessenger};
use crate::partition::Partition;
use crate::schema::PregelSchema;
use crate::values::NodeValueStore;

/// Per-worker bookkeeping: its partition and its local counters.
pub const PER_WORKER_BYTES: u64 =
    (std::mem::size_of::<Partition>() + std::mem::size_of::<WorkerStats>()) as u64;

/// Mirrors the executor's allocations for a given schema and messenger.
///
/// # Example
///
/// ```rust
/// use superstep_core::memory::MemoryEstimator;
/// use superstep_core::messages::MessengerKind;
/// use superstep_core::schema::{PregelSchema, ValueType};
///
/// let schema = PregelSchema::builder().add("value", ValueType::Double).build().unwrap();
/// let estimator = MemoryEstimator::new(schema, MessengerKind::Reducing, 12);
/// let range = estimator.estimate(10_000, 100_000, 1).unwrap();
/// assert_eq!(range.min(), 244_000);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryEstimator {
    schema: PregelSchema,
    messenger: MessengerKind,
    page_shift: u32,
    max_array_length: u64,
}

impl MemoryEstimator {
    /// Creates an estimator. `Auto` is estimated as the queue messenger,
    /// the larger of the two.
    #[must_use]
    pub fn new(schema: PregelSchema, messenger: MessengerKind, page_shift: u32) -> Self {
        Self {
            schema,
            messenger,
            page_shift,
            max_array_length: 0,
        }
    }

    /// Assumes array fields hold up to `max_array_length` elements of
    /// capacity per node. Defaults to zero, which still counts one empty
    /// published array per node.
    #[must_use]
    pub fn with_max_array_length(mut self, max_array_length: u64) -> Self {
        self.max_array_length = max_array_length;
        self
    }

    /// Byte range for a graph of `node_count` nodes and at most
    /// `relationship_count` relationships run with `concurrency` workers.
    ///
    /// The sum of node values, both message buffers, the halt bits and the
    /// per-worker state. Only queued message payloads and published array
    /// values make `max` exceed `min`.
    pub fn estimate(
        &self,
        node_count: u64,
        relationship_count: u64,
        concurrency: usize,
    ) -> Result<MemoryRange> {
        let values = NodeValueStore::memory_estimation(
            &self.schema,
            node_count,
            self.max_array_length,
            self.page_shift,
        )?;
        let messenger = match self.messenger {
            MessengerKind::Reducing => {
                ReducingMessenger::memory_estimation(node_count, self.page_shift)?
            }
            MessengerKind::Queue | MessengerKind::Auto => {
                QueueMessenger::memory_estimation(node_count, relationship_count, self.page_shift)?
            }
        };
        let halted = HugeAtomicBitSet::memory_estimation(node_count, self.page_shift)?;
        let workers = MemoryRange::of(PER_WORKER_BYTES).times(concurrency as u64);

        let total = values + messenger + halted + workers;
        tracing::trace!(
            node_count,
            relationship_count,
            concurrency,
            min = total.min(),
            max = total.max(),
            "Estimated memory"
        );
        Ok(total)
    }
}
