//! User supplied vertex programs.

use crate::config::PregelConfig;
use crate::context::{ComputeContext, InitContext, MasterComputeContext};
use crate::error::Result;
use crate::messages::{Messages, Reducer};
use crate::schema::PregelSchema;

/// A vertex-centric computation run by the executor.
///
/// The executor calls [`init`](Self::init) once per node in superstep 0 and
/// [`compute`](Self::compute) once per active node in every later superstep.
/// A node is active unless it voted to halt and received no message.
///
/// Both calls run concurrently on the worker threads. Each node is handled
/// by exactly one worker per superstep, so a node may freely update its own
/// values.
///
/// # Example
///
/// ```rust
/// use superstep_core::{
///     ComputeContext, Messages, PregelComputation, PregelConfig, PregelSchema, Result,
///     ValueType,
/// };
///
/// /// Counts incoming messages once, then stops.
/// struct InDegree;
///
/// impl PregelComputation for InDegree {
///     fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
///         PregelSchema::builder().add("in_degree", ValueType::Long).build()
///     }
///
///     fn init(&self, ctx: &mut ComputeContext<'_>) -> anyhow::Result<()> {
///         ctx.send_to_neighbors(1.0)?;
///         Ok(())
///     }
///
///     fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages<'_>) -> anyhow::Result<()> {
///         ctx.set_long_value("in_degree", messages.count() as i64)?;
///         ctx.vote_to_halt();
///         Ok(())
///     }
/// }
/// ```
pub trait PregelComputation: Send + Sync {
    /// Node value fields, declared before superstep 0.
    fn schema(&self, config: &PregelConfig) -> Result<PregelSchema>;

    /// Seeds node values in superstep 0. May send messages and vote to halt.
    fn init(&self, _ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Processes the messages sent to the node in the previous superstep.
    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages<'_>) -> anyhow::Result<()>;

    /// Runs once after each superstep's barrier, outside the parallel phase.
    ///
    /// Returning `true` ends the run as converged.
    fn master_compute(&self, _ctx: &mut MasterComputeContext<'_>) -> bool {
        false
    }

    /// Reducer folding messages to the same node, enabling the reducing
    /// messenger.
    fn reducer(&self) -> Option<Reducer> {
        None
    }

    /// Combines a message with the weight of the relationship it travels
    /// along in [`ComputeContext::send_to_neighbors`].
    fn apply_relationship_weight(&self, message: f64, _weight: f64) -> f64 {
        message
    }

    /// Name used in logs.
    fn name(&self) -> &str {
        "pregel"
    }
}
