//! Read-only graph input for the executor.
//!
//! The engine only needs node counts and a way to walk a node's outgoing
//! relationships. [`CsrGraph`] is the in-memory implementation used by the
//! CLI, tests and benchmarks; callers with their own storage implement
//! [`Graph`] directly.

mod csr;


pub use csr::{CsrGraph, GraphBuilder, Orientation};

use crate::error::Result;

/// Immutable graph seen by a running computation.
///
/// Node ids are dense in `[0, node_count)`. Implementations must be safe to
/// read from every worker thread at once.
pub trait Graph: Send + Sync {
    /// Number of nodes.
    fn node_count(&self) -> u64;

    /// Number of relationships, counting both directions of undirected ones.
    fn relationship_count(&self) -> u64;

    /// Number of outgoing relationships of `node`.
    fn degree(&self, node: u64) -> Result<u64>;

    /// True if relationships carry weights; unweighted graphs report `1.0`.
    fn has_relationship_weights(&self) -> bool;

    /// Calls `consumer(target, weight)` for every outgoing relationship.
    fn for_each_relationship(
        &self,
        node: u64,
        consumer: &mut dyn FnMut(u64, f64),
    ) -> Result<()>;
}
