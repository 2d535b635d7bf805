//! Tests for the partitioner.

use crate::graph::{CsrGraph, GraphBuilder};
use crate::partition::{
    degree_partitions, partition, range_partitions, Partition, Partitioning,
};

fn assert_covers(partitions: &[Partition], node_count: u64) {
    let mut expected = 0;
    for p in partitions {
        assert_eq!(p.start(), expected);
        assert!(!p.is_empty());
        expected = p.end();
    }
    assert_eq!(expected, node_count);
}

#[test]
fn test_single_worker_gets_everything() {
    assert_eq!(range_partitions(100, 1), vec![Partition::new(0, 100)]);
}

#[test]
fn test_last_partition_takes_remainder() {
    let parts = range_partitions(10, 4);
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[3], Partition::new(6, 10));
    assert_covers(&parts, 10);
}

#[test]
fn test_never_more_partitions_than_nodes() {
    let parts = range_partitions(3, 8);
    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|p| p.node_count() == 1));
}

#[test]
fn test_empty_graph_has_no_partitions() {
    assert!(range_partitions(0, 4).is_empty());
    let graph = CsrGraph::builder(0).build().unwrap();
    assert!(degree_partitions(&graph, 4).unwrap().is_empty());
}

#[test]
fn test_degree_partitions_isolate_hub() {
    // node 0 is a hub with 8 relationships, the rest are leaves
    let mut builder = GraphBuilder::new(9);
    for leaf in 1..9 {
        builder.push_edge(0, leaf, None);
    }
    let graph = builder.build().unwrap();
    let parts = degree_partitions(&graph, 2).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], Partition::new(0, 1));
    assert_covers(&parts, 9);
}

#[test]
fn test_degree_partitions_bounded_by_concurrency() {
    let graph = CsrGraph::builder(20).add_edge(0, 1).build().unwrap();
    for concurrency in 1..30 {
        let parts = degree_partitions(&graph, concurrency).unwrap();
        assert!(parts.len() <= concurrency);
        assert_covers(&parts, 20);
    }
}

#[test]
fn test_partition_dispatches_on_policy() {
    let graph = CsrGraph::builder(10).build().unwrap();
    let range = partition(&graph, Partitioning::Range, 2).unwrap();
    let degree = partition(&graph, Partitioning::Degree, 2).unwrap();
    assert_eq!(range, degree);
    assert!(range[0].contains(4));
    assert_eq!(range[1].nodes().count(), 5);
}
