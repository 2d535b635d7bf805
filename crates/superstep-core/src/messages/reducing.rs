//! Messenger folding messages on arrival.

use super::{Messages, Messenger, MessengerKind, Reducer};
use crate::collections::{HugeAtomicBitSet, HugeAtomicDoubleArray};
use crate::error::Result;
use crate::memory::MemoryRange;

#[derive(Debug)]
struct ReduceBuffer {
    values: HugeAtomicDoubleArray,
    present: HugeAtomicBitSet,
}

impl ReduceBuffer {
    fn new(reducer: Reducer, node_count: u64, page_shift: u32) -> Result<Self> {
        Ok(Self {
            values: HugeAtomicDoubleArray::filled(node_count, page_shift, reducer.identity())?,
            present: HugeAtomicBitSet::new(node_count, page_shift)?,
        })
    }

    fn reset(&mut self, reducer: Reducer) {
        self.values.fill(reducer.identity());
        self.present.clear_all();
    }
}

/// One atomic slot per node and buffer, combined with CAS loops.
///
/// Fixed footprint regardless of message volume. A presence bit tells an
/// identity-valued aggregate apart from no message at all.
#[derive(Debug)]
pub struct ReducingMessenger {
    reducer: Reducer,
    buffers: [ReduceBuffer; 2],
    send: usize,
}

impl ReducingMessenger {
    /// Creates empty buffers for `node_count` nodes.
    pub fn new(reducer: Reducer, node_count: u64, page_shift: u32) -> Result<Self> {
        Ok(Self {
            reducer,
            buffers: [
                ReduceBuffer::new(reducer, node_count, page_shift)?,
                ReduceBuffer::new(reducer, node_count, page_shift)?,
            ],
            send: 0,
        })
    }

    /// Reducer applied to incoming messages.
    #[must_use]
    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    /// Exact footprint for `node_count` nodes.
    pub fn memory_estimation(node_count: u64, page_shift: u32) -> Result<MemoryRange> {
        let values = HugeAtomicDoubleArray::memory_estimation(node_count, page_shift)?;
        let present = HugeAtomicBitSet::memory_estimation(node_count, page_shift)?;
        Ok((values + present).times(2))
    }

    fn receive_buffer(&self) -> &ReduceBuffer {
        &self.buffers[self.send ^ 1]
    }
}

impl Messenger for ReducingMessenger {
    fn init_iteration(&mut self, superstep: u64) {
        if superstep > 0 {
            self.send ^= 1;
        }
        let reducer = self.reducer;
        self.buffers[self.send].reset(reducer);
    }

    fn send_to(&self, _source: u64, target: u64, message: f64) -> Result<()> {
        let buffer = &self.buffers[self.send];
        let reducer = self.reducer;
        buffer
            .values
            .update(target, |current| reducer.reduce(current, message))?;
        buffer.present.set(target)
    }

    fn messages(&self, node: u64) -> Result<Messages<'_>> {
        let buffer = self.receive_buffer();
        if buffer.present.get(node)? {
            Ok(Messages::single(buffer.values.get(node)?))
        } else {
            Ok(Messages::empty())
        }
    }

    fn has_messages(&self, node: u64) -> Result<bool> {
        self.receive_buffer().present.get(node)
    }

    fn kind(&self) -> MessengerKind {
        MessengerKind::Reducing
    }
}
