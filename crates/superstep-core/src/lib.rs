//! # Superstep Core
//!
//! Vertex-centric, bulk-synchronous graph computation engine.
//!
//! A user supplied [`PregelComputation`] runs in synchronized rounds
//! (supersteps). In every superstep each active node reads the messages sent
//! to it during the previous round, updates its values and sends new
//! messages. A node that votes to halt is skipped until a message wakes it
//! up; the run ends when no node is active or the iteration cap is reached.
//!
//! ## Features
//!
//! - **Paged storage**: node values and message buffers live in paged arrays
//!   addressed by `u64` node ids, never in one giant allocation
//! - **Exact BSP delivery**: messages sent in superstep `k` are seen in
//!   `k + 1`, exactly once
//! - **Two messengers**: per-node queues, or reducing slots when the
//!   computation declares a [`Reducer`]
//! - **Pre-flight memory estimation** mirroring the run's allocations
//!
//! ## Quick Start
//!
//! ```rust
//! use superstep_core::algo::SingleSourceShortestPaths;
//! use superstep_core::graph::CsrGraph;
//! use superstep_core::{run, PregelConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let graph = CsrGraph::builder(4)
//!         .add_edge(0, 1)
//!         .add_edge(1, 2)
//!         .add_edge(2, 3)
//!         .build()?;
//!
//!     let config = PregelConfig::default().with_concurrency(2);
//!     let result = run(&graph, &SingleSourceShortestPaths::new(0), config)?;
//!
//!     assert!(result.did_converge());
//!     let distances = result.node_values().double_values("distance")?;
//!     assert_eq!(distances, vec![0.0, 1.0, 2.0, 3.0]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::cast_lossless,
        clippy::manual_assert
    )
)]

pub mod algo;
pub mod collections;
pub mod computation;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod context;
pub mod convergence;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod executor;
pub mod graph;
pub mod memory;
pub mod messages;
pub mod partition;
#[cfg(test)]
mod partition_tests;
pub mod progress;
pub mod schema;
#[cfg(test)]
mod schema_tests;
pub mod values;
#[cfg(test)]
mod values_tests;

pub use computation::PregelComputation;
pub use config::PregelConfig;
pub use context::{ComputeContext, InitContext, MasterComputeContext};
pub use convergence::{ConvergenceTracker, SuperstepStats, WorkerStats};
pub use error::{Error, Result};
pub use executor::{run, ExecutorState, Pregel, PregelResult, TerminationFlag};
pub use graph::{CsrGraph, Graph, GraphBuilder, Orientation};
pub use memory::{MemoryBudget, MemoryEstimator, MemoryRange};
pub use messages::{Messages, Messenger, MessengerKind, Reducer};
pub use partition::{Partition, Partitioning};
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use schema::{PregelSchema, Value, ValueType, Visibility};
pub use values::NodeValueStore;
