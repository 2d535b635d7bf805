//! End-to-end runs of the engine over small graphs with known answers.

#![allow(clippy::float_cmp, clippy::cast_possible_wrap, clippy::cast_precision_loss)]

use std::sync::atomic::{AtomicU64, Ordering};

use superstep_core::algo::{ConnectedComponents, SingleSourceShortestPaths};
use superstep_core::{
    run, ComputeContext, CsrGraph, Error, ExecutorState, InitContext, Messages, MessengerKind,
    Orientation, Partitioning, Pregel, PregelComputation, PregelConfig, PregelSchema, Result,
    ValueType,
};

fn chain(n: u64) -> CsrGraph {
    let mut builder = CsrGraph::builder(n);
    for node in 1..n {
        builder.push_edge(node - 1, node, None);
    }
    builder.build().expect("chain graph")
}

/// Deterministic pseudo-random graph, no external seed source.
fn scrambled(n: u64, edges_per_node: u64, weighted: bool) -> CsrGraph {
    let mut builder = CsrGraph::builder(n);
    let mut state = 0x9E37_79B9_7F4A_7C15_u64;
    for source in 0..n {
        for _ in 0..edges_per_node {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let target = state % n;
            let weight = weighted.then(|| (state % 97) as f64 / 10.0 + 0.1);
            builder.push_edge(source, target, weight);
        }
    }
    builder.build().expect("scrambled graph")
}

#[test]
fn test_chain_shortest_paths() {
    let graph = chain(5);
    let result = run(&graph, &SingleSourceShortestPaths::new(0), PregelConfig::default())
        .expect("run");

    assert!(result.did_converge());
    assert_eq!(result.state(), ExecutorState::Converged);
    // supersteps 0..=4, the last one sends nothing
    assert_eq!(result.ran_iterations(), 5);
    assert_eq!(
        result.node_values().double_values("distance").expect("distances"),
        vec![0.0, 1.0, 2.0, 3.0, 4.0]
    );
    let last = result.superstep_stats().last().expect("stats");
    assert_eq!(last.totals.messages_sent, 0);
}

/// Halts in `init`, sends nothing.
struct QuietInit;

impl PregelComputation for QuietInit {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        PregelSchema::builder().add("seen", ValueType::Long).build()
    }

    fn init(&self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        ctx.set_long_value("seen", 1)?;
        ctx.vote_to_halt();
        Ok(())
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, _messages: Messages<'_>) -> anyhow::Result<()> {
        ctx.set_long_value("seen", ctx.long_value("seen")? + 1)?;
        Ok(())
    }
}

#[test]
fn test_isolated_node_halting_in_init_ends_after_one_superstep() {
    let graph = CsrGraph::builder(1).build().expect("graph");
    let result = run(&graph, &QuietInit, PregelConfig::default()).expect("run");

    assert!(result.did_converge());
    assert_eq!(result.ran_iterations(), 1);
    assert_eq!(result.node_values().long_values("seen").expect("seen"), vec![1]);
    assert_eq!(result.superstep_stats()[0].totals.messages_sent, 0);
}

/// Node 0 pings itself `rounds` times, everyone else halts at once.
struct Countdown {
    rounds: u64,
}

impl PregelComputation for Countdown {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        PregelSchema::builder().add("pings", ValueType::Long).build()
    }

    fn init(&self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        if ctx.node_id() == 0 && self.rounds > 0 {
            ctx.send_to(0, 1.0)?;
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages<'_>) -> anyhow::Result<()> {
        let pings = ctx.long_value("pings")? + messages.count() as i64;
        ctx.set_long_value("pings", pings)?;
        if (pings as u64) < self.rounds {
            ctx.send_to(0, 1.0)?;
        }
        ctx.vote_to_halt();
        Ok(())
    }
}

#[test]
fn test_converging_after_k_rounds_reports_k_plus_one_supersteps() {
    let graph = chain(4);
    for rounds in [0, 1, 3, 7] {
        let config = PregelConfig::default().with_max_iterations(50);
        let result = run(&graph, &Countdown { rounds }, config).expect("run");
        assert!(result.did_converge());
        assert_eq!(result.ran_iterations(), rounds + 1, "rounds {rounds}");
        let pings = result.node_values().long_values("pings").expect("pings");
        assert_eq!(pings[0] as u64, rounds);
        assert_eq!(&pings[1..], &[0, 0, 0]);
    }
}

#[test]
fn test_iteration_cap_is_not_convergence() {
    let graph = chain(4);
    let config = PregelConfig::default().with_max_iterations(3);
    let result = run(&graph, &Countdown { rounds: 10 }, config).expect("run");

    assert!(!result.did_converge());
    assert_eq!(result.state(), ExecutorState::MaxIterationsReached);
    assert_eq!(result.ran_iterations(), 3);
    assert_eq!(result.node_values().long_values("pings").expect("pings")[0], 2);
}

#[test]
fn test_rerun_is_bit_identical_on_one_worker() {
    let graph = scrambled(300, 4, true);
    let computation = SingleSourceShortestPaths::new(3);
    let pregel = Pregel::new(&graph, &computation, PregelConfig::default().with_concurrency(1));

    let first = pregel.run().expect("first run");
    let second = pregel.run().expect("second run");

    let a = first.node_values().double_values("distance").expect("a");
    let b = second.node_values().double_values("distance").expect("b");
    let bits = |values: &[f64]| values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(first.ran_iterations(), second.ran_iterations());
}

#[test]
fn test_results_do_not_depend_on_worker_count() {
    let weighted = scrambled(2_000, 3, true);
    let undirected = {
        let mut builder = CsrGraph::builder(2_000).orientation(Orientation::Undirected);
        for node in (0..2_000).step_by(3) {
            builder.push_edge(node, (node * 7 + 1) % 2_000, None);
        }
        builder.build().expect("undirected graph")
    };

    let baseline_config = PregelConfig::default()
        .with_concurrency(1)
        .with_max_iterations(1_000);
    let sssp = SingleSourceShortestPaths::new(0);
    let wcc = ConnectedComponents::new();
    let distances = run(&weighted, &sssp, baseline_config.clone())
        .expect("baseline sssp")
        .into_node_values()
        .double_values("distance")
        .expect("distances");
    let components = run(&undirected, &wcc, baseline_config)
        .expect("baseline wcc")
        .into_node_values()
        .long_values("component")
        .expect("components");

    for partitioning in [Partitioning::Range, Partitioning::Degree] {
        for messenger in [MessengerKind::Queue, MessengerKind::Reducing] {
            for concurrency in [2, 4, 7] {
                let config = PregelConfig::default()
                    .with_concurrency(concurrency)
                    .with_partitioning(partitioning)
                    .with_messenger(messenger)
                    .with_max_iterations(1_000);
                let got = run(&weighted, &sssp, config.clone()).expect("sssp");
                assert_eq!(
                    got.node_values().double_values("distance").expect("distances"),
                    distances,
                    "{partitioning:?} {messenger:?} x{concurrency}"
                );
                let got = run(&undirected, &wcc, config).expect("wcc");
                assert_eq!(
                    got.node_values().long_values("component").expect("components"),
                    components,
                    "{partitioning:?} {messenger:?} x{concurrency}"
                );
            }
        }
    }
}

/// Fails once the run reaches `superstep`, recording how many nodes ran.
struct FailsLate {
    superstep: u64,
    calls: AtomicU64,
}

impl PregelComputation for FailsLate {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        Ok(PregelSchema::default())
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, _messages: Messages<'_>) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if ctx.superstep() == self.superstep && ctx.node_id() == 0 {
            anyhow::bail!("node zero gave up");
        }
        Ok(())
    }
}

#[test]
fn test_failure_stops_the_run() {
    let graph = chain(100);
    let failing = FailsLate {
        superstep: 3,
        calls: AtomicU64::new(0),
    };
    let config = PregelConfig::default().with_concurrency(1).with_max_iterations(10);
    let pregel = Pregel::new(&graph, &failing, config);
    let err = pregel.run().expect_err("run must fail");

    assert!(matches!(err, Error::Computation { superstep: 3, node_id: 0, .. }));
    assert!(err.to_string().starts_with("[SUPERSTEP-"));
    assert_eq!(pregel.state(), ExecutorState::Failed);
    // single worker: supersteps 1 and 2 in full, then node 0 aborts the partition
    assert_eq!(failing.calls.load(Ordering::Relaxed), 201);
}
