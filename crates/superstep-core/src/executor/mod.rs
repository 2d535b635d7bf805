//! Bulk-synchronous superstep executor.
//!
//! A run walks through the states below. Each superstep fans out one task per
//! partition on a fixed rayon pool and waits for all of them (the barrier)
//! before flipping the message buffers.
//!
//! ```text
//! NotStarted -> Running(0) -> Running(1) -> ... -> Converged
//!                                               -> MaxIterationsReached
//!                                               -> Failed
//! ```

mod termination;
mod worker;


pub use termination::TerminationFlag;

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

use crate::collections::HugeAtomicBitSet;
use crate::computation::PregelComputation;
use crate::config::PregelConfig;
use crate::context::MasterComputeContext;
use crate::convergence::{ConvergenceTracker, SuperstepStats};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::memory::{MemoryBudget, MemoryEstimator, MemoryRange};
use crate::messages::{self, MessengerKind};
use crate::partition::{self, Partition};
use crate::progress::{NoopProgress, ProgressSink};
use crate::schema::{PregelSchema, Value, Visibility};
use crate::values::NodeValueStore;
use worker::ComputeStep;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExecutorState {
    /// `run` was not called yet.
    NotStarted,
    /// Superstep in progress.
    Running {
        /// Current superstep.
        superstep: u64,
    },
    /// Active set became empty, or master compute stopped the run.
    Converged,
    /// Superstep cap reached while nodes were still active.
    MaxIterationsReached,
    /// A worker failed or the run was cancelled.
    Failed,
}

/// Runs a [`PregelComputation`] over a [`Graph`].
///
/// # Example
///
/// ```rust
/// use superstep_core::algo::SingleSourceShortestPaths;
/// use superstep_core::graph::CsrGraph;
/// use superstep_core::{Pregel, PregelConfig};
///
/// let graph = CsrGraph::builder(3).add_edge(0, 1).add_edge(1, 2).build().unwrap();
/// let sssp = SingleSourceShortestPaths::new(0);
/// let result = Pregel::new(&graph, &sssp, PregelConfig::default()).run().unwrap();
/// assert!(result.did_converge());
/// assert_eq!(result.node_values().double_values("distance").unwrap(), vec![0.0, 1.0, 2.0]);
/// ```
pub struct Pregel<'a> {
    graph: &'a dyn Graph,
    computation: &'a dyn PregelComputation,
    config: PregelConfig,
    progress: Arc<dyn ProgressSink>,
    termination: TerminationFlag,
    state: Mutex<ExecutorState>,
}

impl<'a> Pregel<'a> {
    /// Prepares a run; nothing is allocated until [`run`](Self::run).
    pub fn new(
        graph: &'a dyn Graph,
        computation: &'a dyn PregelComputation,
        config: PregelConfig,
    ) -> Self {
        Self {
            graph,
            computation,
            config,
            progress: Arc::new(NoopProgress),
            termination: TerminationFlag::new(),
            state: Mutex::new(ExecutorState::NotStarted),
        }
    }

    /// Reports progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Observes `termination` for cooperative cancellation.
    #[must_use]
    pub fn with_termination_flag(mut self, termination: TerminationFlag) -> Self {
        self.termination = termination;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ExecutorState {
        *self.state.lock()
    }

    /// Memory the run would allocate, without allocating it.
    pub fn memory_estimation(&self) -> Result<MemoryRange> {
        self.config.validate()?;
        let schema = self.computation.schema(&self.config)?;
        self.estimator(&schema)?.estimate(
            self.graph.node_count(),
            self.graph.relationship_count(),
            self.config.concurrency,
        )
    }

    /// Runs supersteps until convergence or the iteration cap.
    ///
    /// The executor can be run again; each run starts from fresh state.
    ///
    /// # Errors
    ///
    /// Configuration, capacity and budget errors before superstep 0; the
    /// first worker failure or `Error::Cancelled` while running.
    pub fn run(&self) -> Result<PregelResult> {
        let result = self.execute();
        if result.is_err() {
            self.set_state(ExecutorState::Failed);
        }
        result
    }

    fn execute(&self) -> Result<PregelResult> {
        let config = &self.config;
        config.validate()?;
        let schema = self.computation.schema(config)?;
        let node_count = self.graph.node_count();

        let estimate = self.estimator(&schema)?.estimate(
            node_count,
            self.graph.relationship_count(),
            config.concurrency,
        )?;
        if let Some(budget) = config.memory_budget_bytes {
            MemoryBudget::new(budget).check(estimate)?;
        }

        let mut values = NodeValueStore::new(&schema, node_count, config.page_shift)?;
        values.freeze();
        let mut messenger = messages::create(
            config.messenger,
            self.computation.reducer(),
            node_count,
            config.page_shift,
        )?;
        let halted = HugeAtomicBitSet::new(node_count, config.page_shift)?;
        let partitions = partition::partition(self.graph, config.partitioning, config.concurrency)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency)
            .thread_name(|i| format!("superstep-worker-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;
        let tracker = ConvergenceTracker::new();

        tracing::info!(
            computation = self.computation.name(),
            nodes = node_count,
            relationships = self.graph.relationship_count(),
            concurrency = config.concurrency,
            partitions = partitions.len(),
            messenger = ?messenger.kind(),
            estimated_memory = %estimate,
            "Starting computation"
        );

        let mut superstep_stats = Vec::new();
        let mut did_converge = false;
        for superstep in 0..config.max_iterations {
            if self.termination.is_terminated() {
                return Err(Error::Cancelled { superstep });
            }
            self.set_state(ExecutorState::Running { superstep });
            messenger.init_iteration(superstep);
            tracker.reset();
            self.progress.on_superstep_start(superstep);
            let started = Instant::now();

            let step = ComputeStep::new(
                superstep,
                self.graph,
                self.computation,
                &values,
                messenger.as_ref(),
                &halted,
                &tracker,
                self.progress.as_ref(),
                &self.termination,
            );
            run_superstep(&pool, &step, &partitions);
            self.progress.on_superstep_end();
            if let Some(err) = step.take_error() {
                tracing::warn!(superstep, error = %err, "Computation failed");
                return Err(err);
            }

            let totals = tracker.totals();
            let stats = SuperstepStats {
                superstep,
                totals,
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            };
            tracing::debug!(
                superstep,
                vertices_processed = totals.vertices_processed,
                halted = totals.halted,
                messages_sent = totals.messages_sent,
                elapsed_ms = stats.elapsed_ms,
                "Superstep completed"
            );
            superstep_stats.push(stats);

            let mut master = MasterComputeContext::new(superstep, &values, totals);
            if self.computation.master_compute(&mut master) {
                tracing::debug!(superstep, "Master compute requested termination");
                did_converge = true;
                break;
            }
            if !tracker.should_continue() {
                did_converge = true;
                break;
            }
        }

        let ran_iterations = superstep_stats.len() as u64;
        let state = if did_converge {
            ExecutorState::Converged
        } else {
            tracing::warn!(
                max_iterations = config.max_iterations,
                "Iteration cap reached before convergence"
            );
            ExecutorState::MaxIterationsReached
        };
        self.set_state(state);
        tracing::info!(ran_iterations, did_converge, "Computation finished");

        Ok(PregelResult {
            values,
            ran_iterations,
            did_converge,
            state,
            superstep_stats,
        })
    }

    fn estimator(&self, schema: &PregelSchema) -> Result<MemoryEstimator> {
        let kind: MessengerKind = self.config.messenger.resolve(self.computation.reducer())?;
        Ok(MemoryEstimator::new(schema.clone(), kind, self.config.page_shift)
            .with_max_array_length(self.config.max_array_length))
    }

    fn set_state(&self, state: ExecutorState) {
        *self.state.lock() = state;
    }
}

impl std::fmt::Debug for Pregel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pregel")
            .field("computation", &self.computation.name())
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Spawns one task per partition and returns once all of them finished.
fn run_superstep(pool: &rayon::ThreadPool, step: &ComputeStep<'_>, partitions: &[Partition]) {
    pool.scope(|scope| {
        for &partition in partitions {
            scope.spawn(move |_| step.run_partition(partition));
        }
    });
}

/// Runs `computation` over `graph` with `config`.
pub fn run(
    graph: &dyn Graph,
    computation: &dyn PregelComputation,
    config: PregelConfig,
) -> Result<PregelResult> {
    Pregel::new(graph, computation, config).run()
}

/// Outcome of a finished run.
#[derive(Debug)]
pub struct PregelResult {
    values: NodeValueStore,
    ran_iterations: u64,
    did_converge: bool,
    state: ExecutorState,
    superstep_stats: Vec<SuperstepStats>,
}

impl PregelResult {
    /// Final node values, private fields included.
    #[must_use]
    pub fn node_values(&self) -> &NodeValueStore {
        &self.values
    }

    /// Takes ownership of the node values.
    #[must_use]
    pub fn into_node_values(self) -> NodeValueStore {
        self.values
    }

    /// Executed supersteps, superstep 0 included.
    #[must_use]
    pub fn ran_iterations(&self) -> u64 {
        self.ran_iterations
    }

    /// False if the run stopped at the iteration cap.
    #[must_use]
    pub fn did_converge(&self) -> bool {
        self.did_converge
    }

    /// Final state, `Converged` or `MaxIterationsReached`.
    #[must_use]
    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Per-superstep counters.
    #[must_use]
    pub fn superstep_stats(&self) -> &[SuperstepStats] {
        &self.superstep_stats
    }

    /// Public fields by name, one value per node.
    pub fn public_values(&self) -> Result<IndexMap<String, Vec<Value>>> {
        let mut out = IndexMap::new();
        for element in self.values.schema().elements() {
            if element.visibility() == Visibility::Private {
                continue;
            }
            let column = (0..self.values.node_count())
                .map(|node| self.values.value(node, element.key()))
                .collect::<Result<Vec<_>>>()?;
            out.insert(element.key().to_string(), column);
        }
        Ok(out)
    }

    /// Public fields as one JSON object per node.
    ///
    /// Non-finite doubles have no JSON form and become `null`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let public = self.public_values()?;
        let rows = (0..self.values.node_count())
            .map(|node| {
                let mut row = serde_json::Map::new();
                row.insert("nodeId".to_string(), serde_json::Value::from(node));
                for (key, column) in &public {
                    // node < node_count == column.len()
                    #[allow(clippy::cast_possible_truncation)]
                    let value = serde_json::to_value(&column[node as usize])
                        .unwrap_or(serde_json::Value::Null);
                    row.insert(key.clone(), value);
                }
                serde_json::Value::Object(row)
            })
            .collect();
        Ok(serde_json::Value::Array(rows))
    }
}
