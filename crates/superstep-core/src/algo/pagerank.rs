//! Delta-based PageRank.

use crate::computation::PregelComputation;
use crate::config::PregelConfig;
use crate::context::{ComputeContext, InitContext};
use crate::error::{Error, Result};
use crate::messages::{Messages, Reducer};
use crate::schema::{PregelSchema, ValueType, Visibility};

/// Output field holding the rank.
pub const PAGE_RANK: &str = "pagerank";
/// Scratch field holding the last rank change.
pub const DELTA: &str = "delta";

/// PageRank where nodes forward only the change of their rank.
///
/// Every node starts at `1 - damping` and keeps sending `delta / degree`
/// while its change exceeds `tolerance`. Ranks are not normalised.
#[derive(Debug, Clone, Copy)]
pub struct PageRank {
    damping_factor: f64,
    tolerance: f64,
}

impl Default for PageRank {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            tolerance: 1e-7,
        }
    }
}

impl PageRank {
    /// PageRank with damping `0.85` and tolerance `1e-7`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the damping factor, in `[0, 1)`.
    #[must_use]
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    /// Sets the smallest change still propagated.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[allow(clippy::cast_precision_loss)] // degrees far below 2^53
    fn spread(ctx: &mut ComputeContext<'_>, delta: f64) -> Result<()> {
        let degree = ctx.degree()?;
        if degree == 0 {
            ctx.vote_to_halt();
            return Ok(());
        }
        ctx.send_to_neighbors(delta / degree as f64)
    }
}

impl PregelComputation for PageRank {
    fn schema(&self, _config: &PregelConfig) -> Result<PregelSchema> {
        if !(0.0..1.0).contains(&self.damping_factor) {
            return Err(Error::Configuration(format!(
                "damping factor {} outside [0, 1)",
                self.damping_factor
            )));
        }
        PregelSchema::builder()
            .add(PAGE_RANK, ValueType::Double)
            .add_with_visibility(DELTA, ValueType::Double, Visibility::Private)
            .build()
    }

    fn init(&self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        let initial = 1.0 - self.damping_factor;
        ctx.set_double_value(PAGE_RANK, initial)?;
        ctx.set_double_value(DELTA, initial)?;
        Self::spread(ctx, initial)?;
        Ok(())
    }

    fn compute(&self, ctx: &mut ComputeContext<'_>, messages: Messages<'_>) -> anyhow::Result<()> {
        let delta = self.damping_factor * messages.sum::<f64>();
        ctx.set_double_value(PAGE_RANK, ctx.double_value(PAGE_RANK)? + delta)?;
        ctx.set_double_value(DELTA, delta)?;
        if delta > self.tolerance {
            Self::spread(ctx, delta)?;
        } else {
            ctx.vote_to_halt();
        }
        Ok(())
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Sum)
    }

    fn name(&self) -> &str {
        "pagerank"
    }
}
