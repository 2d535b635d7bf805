//! Edge list loading.
//!
//! One relationship per line: `source target [weight]`, separated by
//! whitespace. Blank lines and lines starting with `#` are skipped. Either
//! every relationship carries a weight or none does.

use std::io::BufRead;
use std::path::Path;

use anyhow::{bail, Context};
use superstep_core::{CsrGraph, Orientation};

/// Parsed relationships before the graph is built.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EdgeList {
    edges: Vec<(u64, u64, Option<f64>)>,
    max_node: Option<u64>,
}

impl EdgeList {
    /// Parses an edge list from `reader`.
    pub fn parse(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut list = EdgeList::default();
        let mut weighted = None;
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("reading line {line_no}"))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let (source, target, weight) = match fields.as_slice() {
                [s, t] => (parse_id(s, line_no)?, parse_id(t, line_no)?, None),
                [s, t, w] => {
                    let weight: f64 = w
                        .parse()
                        .with_context(|| format!("line {line_no}: bad weight '{w}'"))?;
                    (parse_id(s, line_no)?, parse_id(t, line_no)?, Some(weight))
                }
                _ => bail!("line {line_no}: expected 'source target [weight]', got '{line}'"),
            };
            match weighted {
                None => weighted = Some(weight.is_some()),
                Some(expected) if expected != weight.is_some() => {
                    bail!("line {line_no}: mixed weighted and unweighted relationships")
                }
                Some(_) => {}
            }
            list.max_node = Some(list.max_node.unwrap_or(0).max(source).max(target));
            list.edges.push((source, target, weight));
        }
        Ok(list)
    }

    /// Parses the edge list stored at `path`.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening edge list {}", path.display()))?;
        Self::parse(std::io::BufReader::new(file))
    }

    /// Number of relationships read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no relationship was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Smallest node count that holds every referenced id.
    #[must_use]
    pub fn node_count(&self) -> u64 {
        self.max_node.map_or(0, |max| max + 1)
    }

    /// Builds the graph. `node_count` may exceed the referenced ids to add
    /// isolated nodes.
    pub fn into_graph(
        self,
        node_count: Option<u64>,
        orientation: Orientation,
    ) -> anyhow::Result<CsrGraph> {
        let node_count = node_count.unwrap_or_else(|| self.node_count());
        let mut builder = CsrGraph::builder(node_count).orientation(orientation);
        for (source, target, weight) in self.edges {
            builder.push_edge(source, target, weight);
        }
        Ok(builder.build()?)
    }
}

fn parse_id(field: &str, line_no: usize) -> anyhow::Result<u64> {
    field
        .parse()
        .with_context(|| format!("line {line_no}: bad node id '{field}'"))
}
