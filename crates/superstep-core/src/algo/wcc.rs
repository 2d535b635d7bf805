//! Connected components by minimum label propagation.

use super::min_message;
use crate::computation::PregelComputation;
use crate::config::PregelConfig;
use crate::context::{ComputeContext, InitContext};
use crate::error::Result;
use crate::messages::{Messages, Reducer};
use crate::schema::{PregelSchema, ValueType};

/// Output field holding the component id.
pub const COMPONENT: &str = "component";

/// Labels every node with the smallest node id of its component.
///
/// Components follow relationships in their stored direction, so build the
/// graph with `Orientation::Undirected` for weakly connected components.
/// Labels travel as `f64` and are exact for node ids below 2^53.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl ConnectedComponents {
    /// Creates the computation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
impl PregelComputation for ConnectedComponents {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        PregelSchema::builder().add(COMPONENT, ValueType::Long).build()
    }

    fn init(&self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        let node = ctx.node_id();
        ctx.set_long_value(COMPONENT, node as i64)?;
        ctx.send_to_neighbors(node as f64)?;
        ctx.vote_to_halt();
        Ok(())
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages<'_>) -> anyhow::Result<()> {
        let current = ctx.long_value(COMPONENT)?;
        if let Some(candidate) = min_message(messages) {
            let candidate = candidate as i64;
            if candidate < current {
                ctx.set_long_value(COMPONENT, candidate)?;
                ctx.send_to_neighbors(candidate as f64)?;
            }
        }
        ctx.vote_to_halt();
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Min)
    }

    fn name(&self) -> &str {
        "wcc"
    }
}
