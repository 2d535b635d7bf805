//! Compressed sparse row adjacency over paged arrays.

use serde::{Deserialize, Serialize};

use super::Graph;
use crate::collections::{PagedArray, DEFAULT_PAGE_SHIFT};
use crate::error::{Error, Result};

/// How input edges are turned into stored relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `source -> target` as given.
    #[default]
    Natural,
    /// `target -> source`.
    Reverse,
    /// Both directions.
    Undirected,
}

/// Adjacency lists packed into one offsets array and one targets array.
///
/// Relationships of node `n` live at `targets[offsets[n]..offsets[n + 1]]`.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    offsets: PagedArray<u64>,
    targets: PagedArray<u64>,
    weights: Option<PagedArray<f64>>,
    node_count: u64,
}

impl CsrGraph {
    /// Starts a builder for `node_count` nodes.
    #[must_use]
    pub fn builder(node_count: u64) -> GraphBuilder {
        GraphBuilder::new(node_count)
    }

    fn range(&self, node: u64) -> Result<(u64, u64)> {
        if node >= self.node_count {
            return Err(Error::OutOfRange {
                index: node,
                size: self.node_count,
            });
        }
        Ok((self.offsets.get(node)?, self.offsets.get(node + 1)?))
    }
}

impl Graph for CsrGraph {
    fn node_count(&self) -> u64 {
        self.node_count
    }

    fn relationship_count(&self) -> u64 {
        self.targets.size()
    }

    fn degree(&self, node: u64) -> Result<u64> {
        let (start, end) = self.range(node)?;
        Ok(end - start)
    }

    fn has_relationship_weights(&self) -> bool {
        self.weights.is_some()
    }

    fn for_each_relationship(
        &self,
        node: u64,
        consumer: &mut dyn FnMut(u64, f64),
    ) -> Result<()> {
        let (start, end) = self.range(node)?;
        for position in start..end {
            let weight = match &self.weights {
                Some(weights) => weights.get(position)?,
                None => 1.0,
            };
            consumer(self.targets.get(position)?, weight);
        }
        Ok(())
    }
}

/// Collects edges and packs them into a [`CsrGraph`].
///
/// Relationships of a node keep insertion order.
///
/// # Example
///
/// ```rust
/// use superstep_core::graph::{CsrGraph, Graph, Orientation};
///
/// let graph = CsrGraph::builder(3)
///     .orientation(Orientation::Undirected)
///     .add_edge(0, 1)
///     .add_edge(1, 2)
///     .build()
///     .unwrap();
/// assert_eq!(graph.relationship_count(), 4);
/// assert_eq!(graph.degree(1).unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct GraphBuilder {
    node_count: u64,
    edges: Vec<(u64, u64, f64)>,
    weighted: bool,
    orientation: Orientation,
    page_shift: u32,
}

impl GraphBuilder {
    /// Creates an empty builder for `node_count` nodes.
    pub fn new(node_count: u64) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
            weighted: false,
            orientation: Orientation::Natural,
            page_shift: DEFAULT_PAGE_SHIFT,
        }
    }

    /// Sets how edges are stored.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the page shift of the adjacency arrays.
    pub fn page_shift(mut self, page_shift: u32) -> Self {
        self.page_shift = page_shift;
        self
    }

    /// Adds an unweighted edge.
    pub fn add_edge(self, source: u64, target: u64) -> Self {
        self.push(source, target, 1.0)
    }

    /// Adds a weighted edge; the whole graph becomes weighted.
    pub fn add_weighted_edge(mut self, source: u64, target: u64, weight: f64) -> Self {
        self.weighted = true;
        self.push(source, target, weight)
    }

    /// Appends an edge in place, for loaders reading edges one at a time.
    pub fn push_edge(&mut self, source: u64, target: u64, weight: Option<f64>) {
        if weight.is_some() {
            self.weighted = true;
        }
        self.edges.push((source, target, weight.unwrap_or(1.0)));
    }

    /// Packs the collected edges.
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` if an edge references a node `>= node_count`,
    /// `Error::Capacity` on an invalid page shift.
    pub fn build(self) -> Result<CsrGraph> {
        let n = self.node_count;
        for &(source, target, _) in &self.edges {
            for node in [source, target] {
                if node >= n {
                    return Err(Error::OutOfRange { index: node, size: n });
                }
            }
        }

        let oriented: Vec<(u64, u64, f64)> = match self.orientation {
            Orientation::Natural => self.edges,
            Orientation::Reverse => self.edges.into_iter().map(|(s, t, w)| (t, s, w)).collect(),
            Orientation::Undirected => self
                .edges
                .into_iter()
                .flat_map(|(s, t, w)| [(s, t, w), (t, s, w)])
                .collect(),
        };

        let offsets_len = n
            .checked_add(1)
            .ok_or_else(|| Error::Capacity(format!("{n} nodes overflow the offsets array")))?;
        let mut offsets = PagedArray::<u64>::with_page_shift(offsets_len, self.page_shift)?;
        for &(source, _, _) in &oriented {
            offsets.add_to(source + 1, 1)?;
        }
        let mut running = 0;
        for node in 0..=n {
            running += offsets.get(node)?;
            offsets.set(node, running)?;
        }

        let total = oriented.len() as u64;
        let mut targets = PagedArray::<u64>::with_page_shift(total, self.page_shift)?;
        let mut weights = if self.weighted {
            Some(PagedArray::<f64>::with_page_shift(total, self.page_shift)?)
        } else {
            None
        };
        let mut cursor = PagedArray::<u64>::with_page_shift(n, self.page_shift)?;
        for (source, target, weight) in oriented {
            let position = offsets.get(source)? + cursor.get(source)?;
            cursor.add_to(source, 1)?;
            targets.set(position, target)?;
            if let Some(weights) = weights.as_mut() {
                weights.set(position, weight)?;
            }
        }

        tracing::debug!(
            nodes = n,
            relationships = total,
            weighted = self.weighted,
            "Built CSR graph"
        );
        Ok(CsrGraph {
            offsets,
            targets,
            weights,
            node_count: n,
        })
    }

    fn push(mut self, source: u64, target: u64, weight: f64) -> Self {
        self.edges.push((source, target, weight));
        self
    }
}
