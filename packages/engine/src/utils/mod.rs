// packages/engine/src/utils/mod.rs
//! Common utilities: configuration and error types

pub mod config;
pub mod errors;

pub use self::config::{EngineConfig, HardwareConfig, ObservabilityConfig, SimulationConfig};
pub use self::errors::{EngineError, Result};
