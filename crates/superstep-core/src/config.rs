//! Run configuration.
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `SUPERSTEP_*` environment variables (e.g. `SUPERSTEP_CONCURRENCY=8`)
//!
//! ```toml
//! concurrency = 4
//! max_iterations = 30
//! partitioning = "degree"
//! page_shift = 14
//! messenger = "queue"
//! memory_budget_bytes = 1073741824
//! max_array_length = 64
//! ```

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::collections::{DEFAULT_PAGE_SHIFT, MAX_PAGE_SHIFT};
use crate::error::{Error, Result};
use crate::messages::MessengerKind;
use crate::partition::Partitioning;

/// Prefix of the environment variables read by [`PregelConfig::load`].
pub const ENV_PREFIX: &str = "SUPERSTEP_";

/// Default superstep cap.
pub const DEFAULT_MAX_ITERATIONS: u64 = 20;

/// Settings of one computation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PregelConfig {
    /// Worker threads, one partition each. Default: available parallelism.
    pub concurrency: usize,
    /// Maximum number of supersteps, superstep 0 included.
    pub max_iterations: u64,
    /// How nodes are split into partitions.
    pub partitioning: Partitioning,
    /// Elements per page are `2^page_shift`.
    pub page_shift: u32,
    /// Message transport.
    pub messenger: MessengerKind,
    /// Reject runs whose minimum estimate exceeds this many bytes.
    pub memory_budget_bytes: Option<u64>,
    /// Largest array capacity a node is expected to store per array field.
    /// Only feeds the upper bound of the memory estimate.
    pub max_array_length: u64,
}

impl Default for PregelConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            partitioning: Partitioning::Range,
            page_shift: DEFAULT_PAGE_SHIFT,
            messenger: MessengerKind::Auto,
            memory_budget_bytes: None,
            max_array_length: 0,
        }
    }
}

impl PregelConfig {
    /// Loads defaults, then `path` if given, then `SUPERSTEP_*` variables.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` on unreadable or malformed input, or if the
    /// merged values fail [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(PregelConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Configuration(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(&figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extracts and validates a config from any figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: PregelConfig = figment
            .extract()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the bounds the executor relies on.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for zero concurrency or zero iterations,
    /// `Error::Capacity` for a page shift outside `1..=30`.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Configuration(
                "concurrency must be greater than zero".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::Configuration(
                "max_iterations must be greater than zero".to_string(),
            ));
        }
        if self.page_shift == 0 || self.page_shift > MAX_PAGE_SHIFT {
            return Err(Error::Capacity(format!(
                "page_shift {} outside 1..={MAX_PAGE_SHIFT}",
                self.page_shift
            )));
        }
        if self.memory_budget_bytes == Some(0) {
            return Err(Error::Configuration(
                "memory_budget_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Serializes to TOML, e.g. to print the effective configuration.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the superstep cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the partitioning policy.
    #[must_use]
    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Self {
        self.partitioning = partitioning;
        self
    }

    /// Sets the page shift.
    #[must_use]
    pub fn with_page_shift(mut self, page_shift: u32) -> Self {
        self.page_shift = page_shift;
        self
    }

    /// Sets the messenger.
    #[must_use]
    pub fn with_messenger(mut self, messenger: MessengerKind) -> Self {
        self.messenger = messenger;
        self
    }

    /// Sets the array capacity assumed by the memory estimate.
    #[must_use]
    pub fn with_max_array_length(mut self, max_array_length: u64) -> Self {
        self.max_array_length = max_array_length;
        self
    }

    /// Sets a memory budget.
    #[must_use]
    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget_bytes = Some(bytes);
        self
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}
