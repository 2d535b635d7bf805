//! Views handed to computations.

use std::sync::Arc;

use crate::computation::PregelComputation;
use crate::convergence::WorkerStats;
use crate::error::Result;
use crate::graph::Graph;
use crate::messages::Messenger;
use crate::values::NodeValueStore;

/// Context of the node currently processed by a worker.
///
/// One context is reused for every node of a partition. Values are read and
/// written for the current node only; messages go to any node.
pub struct ComputeContext<'a> {
    node_id: u64,
    superstep: u64,
    graph: &'a dyn Graph,
    values: &'a NodeValueStore,
    messenger: &'a dyn Messenger,
    computation: &'a dyn PregelComputation,
    voted_to_halt: bool,
    messages_sent: u64,
}

/// Context passed to [`PregelComputation::init`] in superstep 0.
pub type InitContext<'a> = ComputeContext<'a>;

impl<'a> ComputeContext<'a> {
    pub(crate) fn new(
        superstep: u64,
        graph: &'a dyn Graph,
        values: &'a NodeValueStore,
        messenger: &'a dyn Messenger,
        computation: &'a dyn PregelComputation,
    ) -> Self {
        Self {
            node_id: 0,
            superstep,
            graph,
            values,
            messenger,
            computation,
            voted_to_halt: false,
            messages_sent: 0,
        }
    }

    pub(crate) fn move_to(&mut self, node_id: u64) {
        self.node_id = node_id;
        self.voted_to_halt = false;
        self.messages_sent = 0;
    }

    pub(crate) fn voted_to_halt(&self) -> bool {
        self.voted_to_halt
    }

    pub(crate) fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Id of the current node.
    #[must_use]
    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    /// Index of the running superstep.
    #[must_use]
    pub fn superstep(&self) -> u64 {
        self.superstep
    }

    /// True in superstep 0.
    #[must_use]
    pub fn is_initial_superstep(&self) -> bool {
        self.superstep == 0
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.graph.node_count()
    }

    /// Number of relationships in the graph.
    #[must_use]
    pub fn relationship_count(&self) -> u64 {
        self.graph.relationship_count()
    }

    /// True if relationships carry weights.
    #[must_use]
    pub fn has_relationship_weights(&self) -> bool {
        self.graph.has_relationship_weights()
    }

    /// Out-degree of the current node.
    pub fn degree(&self) -> Result<u64> {
        self.graph.degree(self.node_id)
    }

    /// Reads a long field of the current node.
    pub fn long_value(&self, key: &str) -> Result<i64> {
        self.values.get_long(self.node_id, key)
    }

    /// Writes a long field of the current node.
    pub fn set_long_value(&self, key: &str, value: i64) -> Result<()> {
        self.values.set_long(self.node_id, key, value)
    }

    /// Reads a double field of the current node.
    pub fn double_value(&self, key: &str) -> Result<f64> {
        self.values.get_double(self.node_id, key)
    }

    /// Writes a double field of the current node.
    pub fn set_double_value(&self, key: &str, value: f64) -> Result<()> {
        self.values.set_double(self.node_id, key, value)
    }

    /// Reads a long array field of the current node.
    pub fn long_array_value(&self, key: &str) -> Result<Arc<Vec<i64>>> {
        self.values.get_long_array(self.node_id, key)
    }

    /// Writes a long array field of the current node.
    pub fn set_long_array_value(&self, key: &str, value: Vec<i64>) -> Result<()> {
        self.values.set_long_array(self.node_id, key, value)
    }

    /// Reads a double array field of the current node.
    pub fn double_array_value(&self, key: &str) -> Result<Arc<Vec<f64>>> {
        self.values.get_double_array(self.node_id, key)
    }

    /// Writes a double array field of the current node.
    pub fn set_double_array_value(&self, key: &str, value: Vec<f64>) -> Result<()> {
        self.values.set_double_array(self.node_id, key, value)
    }

    /// Sends `message` to `target`; delivered in the next superstep.
    pub fn send_to(&mut self, target: u64, message: f64) -> Result<()> {
        self.messenger.send_to(self.node_id, target, message)?;
        self.messages_sent += 1;
        Ok(())
    }

    /// Sends `message` along every outgoing relationship.
    ///
    /// On weighted graphs each copy goes through
    /// [`PregelComputation::apply_relationship_weight`].
    pub fn send_to_neighbors(&mut self, message: f64) -> Result<()> {
        let source = self.node_id;
        let messenger = self.messenger;
        let computation = self.computation;
        let weighted = self.graph.has_relationship_weights();
        let mut sent = 0;
        let mut failure = None;
        self.graph.for_each_relationship(source, &mut |target, weight| {
            if failure.is_some() {
                return;
            }
            let payload = if weighted {
                computation.apply_relationship_weight(message, weight)
            } else {
                message
            };
            match messenger.send_to(source, target, payload) {
                Ok(()) => sent += 1,
                Err(e) => failure = Some(e),
            }
        })?;
        self.messages_sent += sent;
        failure.map_or(Ok(()), Err)
    }

    /// Calls `consumer(target)` for every outgoing relationship.
    pub fn for_each_neighbor(&self, mut consumer: impl FnMut(u64)) -> Result<()> {
        self.graph
            .for_each_relationship(self.node_id, &mut |target, _| consumer(target))
    }

    /// Deactivates the node until a message arrives.
    pub fn vote_to_halt(&mut self) {
        self.voted_to_halt = true;
    }
}

impl std::fmt::Debug for ComputeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeContext")
            .field("node_id", &self.node_id)
            .field("superstep", &self.superstep)
            .field("voted_to_halt", &self.voted_to_halt)
            .field("messages_sent", &self.messages_sent)
            .finish_non_exhaustive()
    }
}

/// Global view passed to [`PregelComputation::master_compute`].
///
/// Runs single-threaded between supersteps and may read or write any node.
#[derive(Debug)]
pub struct MasterComputeContext<'a> {
    superstep: u64,
    values: &'a NodeValueStore,
    stats: WorkerStats,
}

impl<'a> MasterComputeContext<'a> {
    pub(crate) fn new(superstep: u64, values: &'a NodeValueStore, stats: WorkerStats) -> Self {
        Self {
            superstep,
            values,
            stats,
        }
    }

    /// Superstep that just finished.
    #[must_use]
    pub fn superstep(&self) -> u64 {
        self.superstep
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.values.node_count()
    }

    /// Counters of the superstep that just finished.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// All node values.
    #[must_use]
    pub fn values(&self) -> &NodeValueStore {
        self.values
    }
}
