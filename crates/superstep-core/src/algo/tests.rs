#![allow(clippy::float_cmp)]
//! Tests for the built-in computations.

use super::*;
use crate::config::PregelConfig;
use crate::error::Error;
use crate::executor::Pregel;
use crate::graph::{CsrGraph, Orientation};
use crate::messages::MessengerKind;

#[test]
fn test_min_message() {
    assert_eq!(min_message([3.0, 1.0, 2.0].into_iter()), Some(1.0));
    assert_eq!(min_message(std::iter::empty()), None);
}

#[test]
fn test_sssp_unweighted_counts_hops() {
    let graph = CsrGraph::builder(5)
        .add_edge(0, 1)
        .add_edge(0, 2)
        .add_edge(2, 3)
        .add_edge(1, 3)
        .build()
        .unwrap();
    let result = Pregel::new(&graph, &SingleSourceShortestPaths::new(0), PregelConfig::default())
        .run()
        .unwrap();
    let distances = result.node_values().double_values("distance").unwrap();
    assert_eq!(distances[..4], [0.0, 1.0, 1.0, 2.0]);
    assert_eq!(distances[4], f64::INFINITY);
}

#[test]
fn test_sssp_weighted_adds_weights() {
    let graph = CsrGraph::builder(3)
        .add_weighted_edge(0, 1, 5.0)
        .add_weighted_edge(0, 2, 1.0)
        .add_weighted_edge(2, 1, 1.5)
        .build()
        .unwrap();
    for messenger in [MessengerKind::Queue, MessengerKind::Reducing] {
        let config = PregelConfig::default().with_messenger(messenger);
        let result = Pregel::new(&graph, &SingleSourceShortestPaths::new(0), config)
            .run()
            .unwrap();
        assert_eq!(
            result.node_values().double_values("distance").unwrap(),
            vec![0.0, 2.5, 1.0]
        );
    }
}

#[test]
fn test_wcc_labels_components_with_min_id() {
    let graph = CsrGraph::builder(6)
        .orientation(Orientation::Undirected)
        .add_edge(1, 0)
        .add_edge(2, 1)
        .add_edge(4, 3)
        .build()
        .unwrap();
    let config = PregelConfig::default().with_concurrency(3);
    let result = Pregel::new(&graph, &ConnectedComponents::new(), config)
        .run()
        .unwrap();
    assert!(result.did_converge());
    assert_eq!(
        result.node_values().long_values("component").unwrap(),
        vec![0, 0, 0, 3, 3, 5]
    );
}

#[test]
fn test_pagerank_on_cycle_converges_to_one() {
    let graph = CsrGraph::builder(3)
        .add_edge(0, 1)
        .add_edge(1, 2)
        .add_edge(2, 0)
        .build()
        .unwrap();
    let config = PregelConfig::default().with_max_iterations(500);
    let result = Pregel::new(&graph, &PageRank::new(), config).run().unwrap();
    assert!(result.did_converge());
    for rank in result.node_values().double_values("pagerank").unwrap() {
        assert!((rank - 1.0).abs() < 1e-5, "rank {rank}");
    }
}

#[test]
fn test_pagerank_hides_private_delta() {
    let graph = CsrGraph::builder(2).add_edge(0, 1).build().unwrap();
    let result = Pregel::new(&graph, &PageRank::new(), PregelConfig::default())
        .run()
        .unwrap();
    let public = result.public_values().unwrap();
    assert!(public.contains_key("pagerank"));
    assert!(!public.contains_key("delta"));
    // sink gets 0.15 + 0.85 * 0.15
    let ranks = result.node_values().double_values("pagerank").unwrap();
    assert!((ranks[1] - 0.2775).abs() < 1e-12);
}

#[test]
fn test_sssp_rejects_source_outside_graph() {
    let graph = CsrGraph::builder(3).add_edge(0, 1).add_edge(1, 2).build().unwrap();
    let sssp = SingleSourceShortestPaths::new(3);
    let config = PregelConfig::default().with_concurrency(2);
    let result = Pregel::new(&graph, &sssp, config).run();
    assert!(matches!(result, Err(Error::OutOfRange { index: 3, size: 3 })));
}

#[test]
fn test_pagerank_rejects_invalid_damping() {
    let graph = CsrGraph::builder(1).build().unwrap();
    let pagerank = PageRank::new().with_damping_factor(1.5);
    let result = Pregel::new(&graph, &pagerank, PregelConfig::default()).run();
    assert!(matches!(result, Err(Error::Configuration(_))));
}
