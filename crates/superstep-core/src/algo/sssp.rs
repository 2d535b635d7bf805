//! Single-source shortest paths by distance propagation.

use super::min_message;
use crate::computation::PregelComputation;
use crate::config::PregelConfig;
use crate::context::{ComputeContext, InitContext};
use crate::error::{Error, Result};
use crate::messages::{Messages, Reducer};
use crate::schema::{PregelSchema, ValueType};

/// Output field holding the distance from the source.
pub const DISTANCE: &str = "distance";

/// Distance of every node from `source`.
///
/// Unweighted graphs count hops; weighted graphs add relationship weights.
/// Unreachable nodes keep `f64::INFINITY`. A source outside the graph fails
/// superstep 0 with `Error::OutOfRange`.
#[derive(Debug, Clone, Copy)]
pub struct SingleSourceShortestPaths {
    source: u64,
}

impl SingleSourceShortestPaths {
    /// Distances from `source`.
    #[must_use]
    pub fn new(source: u64) -> Self {
        Self { source }
    }

    fn propagate(ctx: &mut ComputeContext<'_>, distance: f64) -> Result<()> {
        if ctx.has_relationship_weights() {
            ctx.send_to_neighbors(distance)
        } else {
            ctx.send_to_neighbors(distance + 1.0)
        }
    }
}

impl PregelComputation for SingleSourceShortestPaths {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        PregelSchema::builder().add(DISTANCE, ValueType::Double).build()
    }

    fn init(&self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        if self.source >= ctx.node_count() {
            return Err(Error::out_of_range(self.source, ctx.node_count()).into());
        }
        if ctx.node_id() == self.source {
            ctx.set_double_value(DISTANCE, 0.0)?;
            Self::propagate(ctx, 0.0)?;
        } else {
            ctx.set_double_value(DISTANCE, f64::INFINITY)?;
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages<'_>) -> anyhow::Result<()> {
        let current = ctx.double_value(DISTANCE)?;
        if let Some(candidate) = min_message(messages) {
            if candidate < current {
                ctx.set_double_value(DISTANCE, candidate)?;
                Self::propagate(ctx, candidate)?;
            }
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Min)
    }

    fn apply_relationship_weight(&self, message: f64, weight: f64) -> f64 {
        message + weight
    }

    fn name(&self) -> &str {
        "sssp"
    }
}
