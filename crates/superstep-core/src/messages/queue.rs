//! Messenger keeping every message in per-node queues.

use parking_lot::Mutex;

use super::{Messages, Messenger, MessengerKind};
use crate::collections::{paged_bytes, PagedSlots};
use crate::error::Result;
use crate::memory::MemoryRange;

type Queue = Mutex<Vec<f64>>;

const MESSAGE_BYTES: u64 = std::mem::size_of::<f64>() as u64;

/// Two paged tables of locked queues, one lock per destination node.
///
/// Concurrent senders only contend when they target the same node. Cleared
/// queues keep their capacity, so steady-state supersteps do not allocate.
pub struct QueueMessenger {
    buffers: [PagedSlots<Queue>; 2],
    send: usize,
}

impl QueueMessenger {
    /// Creates empty buffers for `node_count` nodes.
    pub fn new(node_count: u64, page_shift: u32) -> Result<Self> {
        Ok(Self {
            buffers: [
                PagedSlots::new_with(node_count, page_shift, Queue::default)?,
                PagedSlots::new_with(node_count, page_shift, Queue::default)?,
            ],
            send: 0,
        })
    }

    /// Footprint for `node_count` nodes and at most `relationship_count`
    /// messages per superstep, each node receiving at most one message per
    /// incoming relationship.
    ///
    /// The queue tables are always allocated; payload is only counted for the
    /// upper bound. A queue holding `k > 0` messages has a capacity of at
    /// most `2k + 2` (first growth to four, then doubling), and cleared
    /// queues keep their capacity, so each buffer may hold
    /// `2 * relationships + 2 * receivers` slots.
    pub fn memory_estimation(
        node_count: u64,
        relationship_count: u64,
        page_shift: u32,
    ) -> Result<MemoryRange> {
        let table = paged_bytes(node_count, std::mem::size_of::<Queue>() as u64, page_shift)?;
        let receivers = node_count.min(relationship_count);
        let payload = relationship_count
            .saturating_mul(2)
            .saturating_add(receivers.saturating_mul(2))
            .saturating_mul(MESSAGE_BYTES);
        Ok(MemoryRange::new(table, table.saturating_add(payload)).times(2))
    }

    /// Bytes currently reserved for queued messages in both buffers.
    #[cfg(test)]
    pub(crate) fn payload_capacity_bytes(&self) -> u64 {
        self.buffers
            .iter()
            .flat_map(|buffer| buffer.iter())
            .map(|queue| queue.lock().capacity() as u64 * MESSAGE_BYTES)
            .sum()
    }

    fn receive_buffer(&self) -> &PagedSlots<Queue> {
        &self.buffers[self.send ^ 1]
    }
}

impl Messenger for QueueMessenger {
    fn init_iteration(&mut self, superstep: u64) {
        if superstep > 0 {
            self.send ^= 1;
        }
        for queue in self.buffers[self.send].iter_mut() {
            queue.get_mut().clear();
        }
    }

    fn send_to(&self, _source: u64, target: u64, message: f64) -> Result<()> {
        self.buffers[self.send].slot(target)?.lock().push(message);
        Ok(())
    }

    fn messages(&self, node: u64) -> Result<Messages<'_>> {
        Ok(Messages::queue(self.receive_buffer().slot(node)?.lock()))
    }

    fn has_messages(&self, node: u64) -> Result<bool> {
        Ok(!self.receive_buffer().slot(node)?.lock().is_empty())
    }

    fn kind(&self) -> MessengerKind {
        MessengerKind::Queue
    }
}

impl std::fmt::Debug for QueueMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueMessenger")
            .field("buffers", &self.buffers[0])
            .field("send", &self.send)
            .finish()
    }
}
