// packages/engine/src/utils/config.rs
//! Engine configuration
//!
//! Configuration is layered with the `config` crate:
//!
//! 1. Built-in defaults (every field has one)
//! 2. An optional `signalgp.toml` (or `.yaml`/`.json`) in the working directory
//! 3. `SIGNALGP__*` environment variables, e.g.
//!    `SIGNALGP__HARDWARE__MAX_ACTIVE_THREADS=16`

use crate::utils::errors::{EngineError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base name of the optional configuration file
pub const DEFAULT_CONFIG_FILE: &str = "signalgp";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SIGNALGP";

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Thread capacity limits
    pub hardware: HardwareConfig,

    /// Logging and metrics
    pub observability: ObservabilityConfig,

    /// Demo workload driven by the binary
    pub simulation: SimulationConfig,
}

/// Thread capacity limits for one hardware instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Maximum number of concurrently running threads (default: 64)
    pub max_active_threads: usize,

    /// Maximum number of thread slots, pending + active (default: 512)
    pub max_thread_space: usize,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            max_active_threads: 64,
            max_thread_space: 512,
        }
    }
}

impl HardwareConfig {
    /// Create limits with the given caps
    pub fn new(max_active_threads: usize, max_thread_space: usize) -> Self {
        Self {
            max_active_threads,
            max_thread_space,
        }
    }

    /// Number of slots the thread table is pre-sized to
    pub fn initial_thread_space(&self) -> usize {
        self.max_active_threads
            .saturating_mul(2)
            .min(self.max_thread_space)
    }

    /// Validate limits
    pub fn validate(&self) -> Result<()> {
        if self.max_active_threads == 0 {
            return Err(EngineError::ConfigError(
                "max_active_threads must be greater than 0".to_string(),
            ));
        }
        if self.max_thread_space == 0 {
            return Err(EngineError::ConfigError(
                "max_thread_space must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging and metrics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Install the Prometheus metrics recorder
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

/// Demo workload settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cycles to run
    pub cycles: usize,

    /// Spawn events queued per cycle
    pub spawns_per_cycle: usize,

    /// Longest program (in steps) a spawned thread runs
    pub max_program_len: usize,

    /// RNG seed for priorities and program lengths
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles: 100,
            spawns_per_cycle: 8,
            max_program_len: 16,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file (if present) and environment
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(Self::environment())
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;

        Self::finish(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn finish(config: Config) -> Result<Self> {
        let engine: EngineConfig = config.try_deserialize()?;
        engine.hardware.validate()?;
        Ok(engine)
    }
}
