//! Memory estimation for pre-flight feasibility checks.
//!
//! Estimates are computed from the same element sizes and page tables the
//! runtime allocates, so a caller can reject a workload before any
//! allocation happens.

mod estimate;


pub use estimate::{MemoryEstimator, PER_WORKER_BYTES};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive byte range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryRange {
    min: u64,
    max: u64,
}

impl MemoryRange {
    /// Creates a range; bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Creates a range with `min == max == bytes`.
    #[must_use]
    pub fn of(bytes: u64) -> Self {
        Self {
            min: bytes,
            max: bytes,
        }
    }

    /// Empty range.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lower bound in bytes.
    #[must_use]
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Upper bound in bytes.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Range multiplied by `factor`, saturating at `u64::MAX`.
    #[must_use]
    pub fn times(self, factor: u64) -> Self {
        Self {
            min: self.min.saturating_mul(factor),
            max: self.max.saturating_mul(factor),
        }
    }

    /// Smallest range covering both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Sum of two ranges, saturating at `u64::MAX`.
impl std::ops::Add for MemoryRange {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            min: self.min.saturating_add(other.min),
            max: self.max.saturating_add(other.max),
        }
    }
}

impl std::fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.min == self.max {
            write!(f, "{}", human_readable(self.min))
        } else {
            write!(f, "[{} ... {}]", human_readable(self.min), human_readable(self.max))
        }
    }
}

/// Formats a byte count with binary units.
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn human_readable(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} Bytes");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Caller supplied upper bound on memory for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBudget {
    bytes: u64,
}

impl MemoryBudget {
    /// Creates a budget of `bytes`.
    #[must_use]
    pub fn new(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Returns the budget in bytes.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Rejects `range` if even its lower bound does not fit.
    ///
    /// A range whose upper bound exceeds the budget is accepted with a
    /// warning: message volume depends on the computation.
    pub fn check(&self, range: MemoryRange) -> Result<()> {
        if range.min() > self.bytes {
            return Err(Error::MemoryBudgetExceeded {
                required: range.min(),
                budget: self.bytes,
            });
        }
        if range.max() > self.bytes {
            tracing::warn!(
                budget = self.bytes,
                estimated_max = range.max(),
                "Estimated peak memory exceeds budget; run may not fit if message volume peaks"
            );
        }
        Ok(())
    }
}
