//! Splitting the node id space into contiguous worker batches.
//!
//! Partitions are computed once per run and reused by every superstep. Each
//! node belongs to exactly one partition, so the worker that owns a
//! partition is the only writer of its nodes' values.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::Graph;

/// Half-open node id range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    start: u64,
    end: u64,
}

impl Partition {
    /// Creates `[start, end)`; an inverted range is empty.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// First node id.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last node id.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.end - self.start
    }

    /// True if the partition holds no node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `node` falls in this partition.
    #[must_use]
    pub fn contains(&self, node: u64) -> bool {
        (self.start..self.end).contains(&node)
    }

    /// Node ids in ascending order.
    #[must_use]
    pub fn nodes(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// Partitioning policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partitioning {
    /// Equal node counts, the last partition takes the remainder.
    #[default]
    Range,
    /// Balanced by `degree + 1` so hubs do not pile up in one batch.
    Degree,
}

/// Partitions the nodes of `graph` with `policy`.
pub fn partition(
    graph: &dyn Graph,
    policy: Partitioning,
    concurrency: usize,
) -> Result<Vec<Partition>> {
    match policy {
        Partitioning::Range => Ok(range_partitions(graph.node_count(), concurrency)),
        Partitioning::Degree => degree_partitions(graph, concurrency),
    }
}

/// Splits `[0, node_count)` into `min(concurrency, node_count)` ranges.
///
/// All ranges hold `node_count / count` nodes except the last, which also
/// takes the remainder. A zero concurrency is treated as one.
///
/// # Example
///
/// ```rust
/// use superstep_core::partition::range_partitions;
///
/// let parts = range_partitions(10, 3);
/// let sizes: Vec<u64> = parts.iter().map(|p| p.node_count()).collect();
/// assert_eq!(sizes, vec![3, 3, 4]);
/// ```
#[must_use]
pub fn range_partitions(node_count: u64, concurrency: usize) -> Vec<Partition> {
    if node_count == 0 {
        return Vec::new();
    }
    let count = (concurrency.max(1) as u64).min(node_count);
    let batch = node_count / count;
    (0..count)
        .map(|i| {
            let start = i * batch;
            let end = if i + 1 == count { node_count } else { start + batch };
            Partition::new(start, end)
        })
        .collect()
}

/// Splits the nodes of `graph` into at most `concurrency` ranges of roughly
/// equal `sum(degree + 1)`.
pub fn degree_partitions(graph: &dyn Graph, concurrency: usize) -> Result<Vec<Partition>> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Ok(Vec::new());
    }
    let concurrency = concurrency.max(1);
    let total = graph.relationship_count().saturating_add(node_count);
    let target = total.div_ceil(concurrency as u64).max(1);

    let mut partitions = Vec::with_capacity(concurrency);
    let mut start = 0;
    let mut weight = 0u64;
    for node in 0..node_count {
        weight = weight.saturating_add(graph.degree(node)? + 1);
        if weight >= target && partitions.len() + 1 < concurrency {
            partitions.push(Partition::new(start, node + 1));
            start = node + 1;
            weight = 0;
        }
    }
    if start < node_count {
        partitions.push(Partition::new(start, node_count));
    }
    Ok(partitions)
}
