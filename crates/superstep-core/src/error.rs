//! Error types for the superstep engine.
//!
//! Every failure surfaced by the engine maps onto one of the categories below.
//! Configuration and capacity problems are raised synchronously before any
//! superstep runs; range and computation failures abort a running computation.
//!
//! Each variant carries a stable code (`SUPERSTEP-NNN`) usable by callers that
//! need to branch on the failure kind without matching the enum.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the paged storage layer and the BSP engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid concurrency, iteration bounds or malformed configuration (SUPERSTEP-001).
    #[error("[SUPERSTEP-001] Configuration error: {0}")]
    Configuration(String),

    /// Node id or slot index outside the declared bounds (SUPERSTEP-002).
    #[error("[SUPERSTEP-002] Index {index} out of range for size {size}")]
    OutOfRange {
        /// Offending index.
        index: u64,
        /// Size of the addressed structure.
        size: u64,
    },

    /// Field accessed with a type other than the declared one (SUPERSTEP-003).
    #[error("[SUPERSTEP-003] Type mismatch on field '{field}': declared {declared}, accessed as {requested}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Type the field was declared with.
        declared: &'static str,
        /// Type the caller asked for.
        requested: &'static str,
    },

    /// Field name not present in the schema (SUPERSTEP-004).
    #[error("[SUPERSTEP-004] Unknown node value field '{0}'")]
    UnknownField(String),

    /// Field declared twice (SUPERSTEP-005).
    #[error("[SUPERSTEP-005] Field '{0}' is already declared")]
    DuplicateField(String),

    /// Schema mutation after the computation started (SUPERSTEP-006).
    #[error("[SUPERSTEP-006] Schema is frozen, cannot declare field '{0}'")]
    SchemaFrozen(String),

    /// User computation failed inside a superstep (SUPERSTEP-007).
    #[error("[SUPERSTEP-007] Computation failed in superstep {superstep} at node {node_id}: {source}")]
    Computation {
        /// Superstep in which the failure happened.
        superstep: u64,
        /// Node whose `init`/`compute` call failed.
        node_id: u64,
        /// Error reported by the computation.
        #[source]
        source: anyhow::Error,
    },

    /// Requested sizes overflow the addressable range (SUPERSTEP-008).
    #[error("[SUPERSTEP-008] Capacity error: {0}")]
    Capacity(String),

    /// Memory estimation does not fit the caller supplied budget (SUPERSTEP-009).
    #[error("[SUPERSTEP-009] Estimated memory of at least {required} bytes exceeds budget of {budget} bytes")]
    MemoryBudgetExceeded {
        /// Minimum number of bytes the run would need.
        required: u64,
        /// Budget supplied by the caller.
        budget: u64,
    },

    /// Run was cancelled through its termination flag (SUPERSTEP-010).
    #[error("[SUPERSTEP-010] Computation cancelled during superstep {superstep}")]
    Cancelled {
        /// Superstep during which cancellation was observed.
        superstep: u64,
    },

    /// Worker pool could not be created (SUPERSTEP-011).
    #[error("[SUPERSTEP-011] Worker pool error: {0}")]
    WorkerPool(String),

    /// IO error (SUPERSTEP-012).
    #[error("[SUPERSTEP-012] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SUPERSTEP-001",
            Self::OutOfRange { .. } => "SUPERSTEP-002",
            Self::TypeMismatch { .. } => "SUPERSTEP-003",
            Self::UnknownField(_) => "SUPERSTEP-004",
            Self::DuplicateField(_) => "SUPERSTEP-005",
            Self::SchemaFrozen(_) => "SUPERSTEP-006",
            Self::Computation { .. } => "SUPERSTEP-007",
            Self::Capacity(_) => "SUPERSTEP-008",
            Self::MemoryBudgetExceeded { .. } => "SUPERSTEP-009",
            Self::Cancelled { .. } => "SUPERSTEP-010",
            Self::WorkerPool(_) => "SUPERSTEP-011",
            Self::Io(_) => "SUPERSTEP-012",
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    ///
    /// The engine never retries internally. Only cancellation and IO are
    /// transient; everything else fails the same way on a second attempt.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::Io(_))
    }

    pub(crate) fn out_of_range(index: u64, size: u64) -> Self {
        Self::OutOfRange { index, size }
    }
}
