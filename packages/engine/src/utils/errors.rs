// packages/engine/src/utils/errors.rs
//! Engine error types
//!
//! Only recoverable conditions live here. Caller misuse (resetting the
//! hardware mid-cycle, asking for the current thread outside the execution
//! phase, indexing a thread id that does not exist) panics instead.

use thiserror::Error;

/// Result alias used across the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// No unused thread id and the table is already at `max_thread_space`
    #[error("Thread space exhausted ({max_thread_space} slots in use)")]
    ThreadSpaceExhausted { max_thread_space: usize },

    /// Spawn by tag found no module to run
    #[error("No module matches the requested tag")]
    NoModuleMatch,

    /// Event id is not registered in the event library
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Invalid or unloadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Logging or metrics could not be installed
    #[error("Observability error: {0}")]
    ObservabilityError(String),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::ThreadSpaceExhausted { max_thread_space: 8 };
        assert_eq!(err.to_string(), "Thread space exhausted (8 slots in use)");

        let err = EngineError::ConfigError("max_active_threads must be > 0".into());
        assert!(err.to_string().contains("max_active_threads"));
    }
}
