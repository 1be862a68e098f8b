// packages/engine/src/lib.rs
//! SignalGP Engine Library
//!
//! This library provides the execution substrate for signal-driven program
//! hardware: many lightweight, cooperatively scheduled threads, each running
//! a program module, spawned at startup or in response to events.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **runtime**: Thread table, admission control, step loop, stepper interface
//! - **events**: Event queue and the caller-owned event library
//! - **observability**: Tracing and metrics
//! - **utils**: Configuration and error types
//!
//! The engine does not interpret instructions. Program semantics come from an
//! [`ExecutionStepper`] supplied by the caller.

// Public module exports
pub mod events;
pub mod observability;
pub mod runtime;
pub mod utils;

// Re-export commonly used types
pub use events::{Event, EventId, EventLibrary};
pub use runtime::{ExecutionStepper, Hardware, HardwareStats, Thread, ThreadId, ThreadState};
pub use utils::config::{EngineConfig, HardwareConfig};
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
