//! Superstep CLI: runs built-in vertex computations over edge-list files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use superstep_core::algo::{ConnectedComponents, PageRank, SingleSourceShortestPaths};
use superstep_core::memory::human_readable;
use superstep_core::{
    Graph, MessengerKind, Orientation, Pregel, PregelComputation, PregelConfig, TracingProgress,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod loader;

use loader::EdgeList;

/// Superstep - vertex-centric graph computation
#[derive(Parser, Debug)]
#[command(name = "superstep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file, merged over defaults and under SUPERSTEP_* variables
    #[arg(short, long, global = true, env = "SUPERSTEP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an algorithm and print node values as JSON
    Run {
        /// Edge list file: `source target [weight]` per line
        #[arg(short, long)]
        edges: PathBuf,

        /// Algorithm to run
        #[arg(short, long, value_enum)]
        algorithm: Algorithm,

        /// Source node for shortest paths
        #[arg(long, default_value = "0")]
        source: u64,

        /// Node count, if larger than the highest id in the edge list
        #[arg(long)]
        nodes: Option<u64>,

        /// Relationship orientation
        #[arg(long, value_enum, default_value = "natural")]
        orientation: OrientationArg,

        /// Worker threads, overrides the configuration
        #[arg(long)]
        concurrency: Option<usize>,

        /// Superstep cap, overrides the configuration
        #[arg(long)]
        max_iterations: Option<u64>,

        /// Messenger, overrides the configuration
        #[arg(long, value_enum)]
        messenger: Option<MessengerArg>,

        /// PageRank damping factor
        #[arg(long, default_value = "0.85")]
        damping: f64,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Estimate the memory of a run without allocating it
    Estimate {
        /// Number of nodes
        #[arg(long)]
        nodes: u64,

        /// Number of relationships
        #[arg(long)]
        relationships: u64,

        /// Algorithm whose schema is estimated
        #[arg(short, long, value_enum, default_value = "pagerank")]
        algorithm: Algorithm,

        /// Worker threads, overrides the configuration
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Algorithm {
    /// Single-source shortest paths
    Sssp,
    /// Delta-based PageRank
    Pagerank,
    /// Connected components
    Wcc,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    Natural,
    Reverse,
    Undirected,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Natural => Orientation::Natural,
            OrientationArg::Reverse => Orientation::Reverse,
            OrientationArg::Undirected => Orientation::Undirected,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MessengerArg {
    Auto,
    Queue,
    Reducing,
}

impl From<MessengerArg> for MessengerKind {
    fn from(arg: MessengerArg) -> Self {
        match arg {
            MessengerArg::Auto => MessengerKind::Auto,
            MessengerArg::Queue => MessengerKind::Queue,
            MessengerArg::Reducing => MessengerKind::Reducing,
        }
    }
}

fn computation(algorithm: Algorithm, source: u64, damping: f64) -> Box<dyn PregelComputation> {
    match algorithm {
        Algorithm::Sssp => Box::new(SingleSourceShortestPaths::new(source)),
        Algorithm::Pagerank => Box::new(PageRank::new().with_damping_factor(damping)),
        Algorithm::Wcc => Box::new(ConnectedComponents::new()),
    }
}

/// A graph with counts only, enough for the estimator.
struct Shape {
    nodes: u64,
    relationships: u64,
}

impl Graph for Shape {
    fn node_count(&self) -> u64 {
        self.nodes
    }

    fn relationship_count(&self) -> u64 {
        self.relationships
    }

    fn degree(&self, _node: u64) -> superstep_core::Result<u64> {
        Ok(0)
    }

    fn has_relationship_weights(&self) -> bool {
        false
    }

    fn for_each_relationship(
        &self,
        _node: u64,
        _consumer: &mut dyn FnMut(u64, f64),
    ) -> superstep_core::Result<()> {
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PregelConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run {
            edges,
            algorithm,
            source,
            nodes,
            orientation,
            concurrency,
            max_iterations,
            messenger,
            damping,
            pretty,
        } => {
            let mut config = config;
            if let Some(concurrency) = concurrency {
                config = config.with_concurrency(concurrency);
            }
            if let Some(max_iterations) = max_iterations {
                config = config.with_max_iterations(max_iterations);
            }
            if let Some(messenger) = messenger {
                config = config.with_messenger(messenger.into());
            }

            let list = EdgeList::from_path(&edges)?;
            tracing::info!("Loaded {} relationships from {}", list.len(), edges.display());
            let graph = list.into_graph(nodes, orientation.into())?;
            if matches!(algorithm, Algorithm::Sssp) && source >= graph.node_count() {
                let err = superstep_core::Error::OutOfRange {
                    index: source,
                    size: graph.node_count(),
                };
                return Err(anyhow::Error::new(err).context("--source is not a node of the graph"));
            }

            let computation = computation(algorithm, source, damping);
            let pregel = Pregel::new(&graph, computation.as_ref(), config)
                .with_progress(Arc::new(TracingProgress::new()));
            let estimate = pregel.memory_estimation()?;
            tracing::info!(
                "Estimated memory: {} - {}",
                human_readable(estimate.min()),
                human_readable(estimate.max())
            );

            let result = pregel.run()?;
            tracing::info!(
                "{} finished after {} supersteps (converged: {})",
                computation.name(),
                result.ran_iterations(),
                result.did_converge()
            );
            let json = result.to_json()?;
            let out = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{out}");
        }
        Commands::Estimate {
            nodes,
            relationships,
            algorithm,
            concurrency,
        } => {
            let mut config = config;
            if let Some(concurrency) = concurrency {
                config = config.with_concurrency(concurrency);
            }
            let shape = Shape {
                nodes,
                relationships,
            };
            let computation = computation(algorithm, 0, 0.85);
            let range = Pregel::new(&shape, computation.as_ref(), config).memory_estimation()?;
            println!(
                "{}",
                serde_json::json!({
                    "min": range.min(),
                    "max": range.max(),
                    "minHuman": human_readable(range.min()),
                    "maxHuman": human_readable(range.max()),
                })
            );
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
