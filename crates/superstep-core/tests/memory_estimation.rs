//! Memory estimation through the public API.

use superstep_core::memory::{human_readable, MemoryEstimator, PER_WORKER_BYTES};
use superstep_core::{
    CsrGraph, Error, Messages, MessengerKind, Pregel, PregelComputation, PregelConfig,
    PregelSchema, Reducer, Result, ValueType,
};

fn value_schema() -> PregelSchema {
    PregelSchema::builder()
        .add("value", ValueType::Double)
        .build()
        .expect("schema")
}

#[test]
fn test_queue_estimate_for_ten_thousand_nodes() {
    let estimator = MemoryEstimator::new(value_schema(), MessengerKind::Queue, 12);
    let range = estimator.estimate(10_000, 100_000, 1).expect("estimate");
    assert_eq!(range.min(), 721_456);
    assert_eq!(range.max(), 4_241_456);
}

#[test]
fn test_reducing_estimate_has_no_spread() {
    let estimator = MemoryEstimator::new(value_schema(), MessengerKind::Reducing, 12);
    let range = estimator.estimate(10_000, 100_000, 1).expect("estimate");
    assert_eq!(range.min(), 244_000);
    assert_eq!(range.max(), 244_000);
    assert_eq!(human_readable(range.min()), "238.28 KiB");
}

#[test]
fn test_auto_is_estimated_like_queue() {
    let auto = MemoryEstimator::new(value_schema(), MessengerKind::Auto, 12)
        .estimate(5_000, 20_000, 4)
        .expect("auto");
    let queue = MemoryEstimator::new(value_schema(), MessengerKind::Queue, 12)
        .estimate(5_000, 20_000, 4)
        .expect("queue");
    assert_eq!(auto, queue);
}

#[test]
fn test_estimate_grows_with_every_input() {
    let estimator = MemoryEstimator::new(value_schema(), MessengerKind::Queue, 12);
    let base = estimator.estimate(1_000, 1_000, 1).expect("base");

    let more_nodes = estimator.estimate(2_000, 1_000, 1).expect("nodes");
    let more_relationships = estimator.estimate(1_000, 2_000, 1).expect("relationships");
    let more_workers = estimator.estimate(1_000, 1_000, 2).expect("workers");

    assert!(more_nodes.min() > base.min());
    assert_eq!(more_relationships.min(), base.min());
    assert!(more_relationships.max() > base.max());
    assert_eq!(more_workers.min(), base.min() + PER_WORKER_BYTES);
}

struct Summing;

impl PregelComputation for Summing {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        Ok(value_schema())
    }

    fn compute(
        &self,
        ctx: &mut superstep_core::ComputeContext<'_>,
        messages: Messages<'_>,
    ) -> anyhow::Result<()> {
        ctx.set_double_value("value", messages.sum())?;
        ctx.vote_to_halt();
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Sum)
    }
}

#[test]
fn test_executor_estimate_matches_estimator() {
    let mut builder = CsrGraph::builder(10_000);
    for node in 0..10_000 {
        builder.push_edge(node, (node + 1) % 10_000, None);
    }
    let graph = builder.build().expect("graph");

    // a declared reducer resolves Auto to the reducing messenger
    let pregel = Pregel::new(&graph, &Summing, PregelConfig::default().with_concurrency(1));
    let expected = MemoryEstimator::new(value_schema(), MessengerKind::Reducing, 12)
        .estimate(10_000, 10_000, 1)
        .expect("estimate");
    assert_eq!(pregel.memory_estimation().expect("pregel estimate"), expected);

    let tight = PregelConfig::default()
        .with_concurrency(1)
        .with_memory_budget(expected.min() - 1);
    let err = Pregel::new(&graph, &Summing, tight).run().expect_err("over budget");
    assert!(matches!(err, Error::MemoryBudgetExceeded { .. }));

    let exact = PregelConfig::default()
        .with_concurrency(1)
        .with_memory_budget(expected.min());
    assert!(Pregel::new(&graph, &Summing, exact).run().is_ok());
}

struct Collects;

impl PregelComputation for Collects {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        PregelSchema::builder().add("seen", ValueType::LongArray).build()
    }

    fn compute(
        &self,
        _ctx: &mut superstep_core::ComputeContext<'_>,
        _messages: Messages<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn test_array_length_widens_only_the_upper_bound() {
    let graph = CsrGraph::builder(500).build().expect("graph");
    let base = PregelConfig::default().with_concurrency(1);
    let short = Pregel::new(&graph, &Collects, base.clone())
        .memory_estimation()
        .expect("short");
    let long = Pregel::new(&graph, &Collects, base.with_max_array_length(32))
        .memory_estimation()
        .expect("long");
    assert_eq!(short.min(), long.min());
    assert_eq!(long.max() - short.max(), 500 * 32 * 8);
}
