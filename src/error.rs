//! # Executor Error Types
//!
//! Producer-visible errors raised synchronously by the executors. Failures that
//! happen inside a unit of work never surface here; they are delivered to the
//! unit's own `handle_failure` on the consumer thread.

use thiserror::Error;

pub use crate::config::ConfigurationError;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Invalid argument: {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Failed to spawn {executor} thread: {message}")]
    ThreadSpawn { executor: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl ExecutorError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn thread_spawn(executor: impl Into<String>, error: &std::io::Error) -> Self {
        Self::ThreadSpawn {
            executor: executor.into(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = ExecutorError::invalid_argument("action.name", "must not be blank");
        assert_eq!(
            err.to_string(),
            "Invalid argument: action.name: must not be blank"
        );
    }

    #[test]
    fn test_configuration_error_converts() {
        let err: ExecutorError =
            ConfigurationError::invalid("polling.tick_interval_ms", "must be > 0").into();
        assert!(matches!(err, ExecutorError::Configuration(_)));
    }
}
