//! # Executor Configuration
//!
//! Capacity thresholds and tick interval for the executors. Every field has a
//! default, so an empty source yields a working configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use action_executor::config::ConfigManager;
//! use action_executor::threading::{FireAndForgetQueue, PollingHandler};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let queue = FireAndForgetQueue::from_config(&manager.config().queue)?;
//! let poller = PollingHandler::from_config(&manager.config().polling)?;
//! # drop((queue, poller));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_POLLING_INTERVAL_MS, DEFAULT_QUEUE_THRESHOLD, DEFAULT_SHARED_QUEUE_THRESHOLD,
};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring action-executor.toml
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Dedicated fire-and-forget queues
    pub queue: QueueConfig,

    /// The process-wide shared consumer
    pub shared_queue: QueueConfig,

    /// Polling handler settings
    pub polling: PollingConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            shared_queue: QueueConfig {
                capacity_threshold: DEFAULT_SHARED_QUEUE_THRESHOLD,
            },
            polling: PollingConfig::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.queue.validate("queue")?;
        self.shared_queue.validate("shared_queue")?;
        self.polling.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pending items held before further enqueues are dropped
    pub capacity_threshold: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity_threshold: DEFAULT_QUEUE_THRESHOLD,
        }
    }
}

impl QueueConfig {
    fn validate(&self, section: &str) -> ConfigResult<()> {
        if self.capacity_threshold == 0 {
            return Err(ConfigurationError::invalid_value(
                format!("{section}.capacity_threshold"),
                "0",
                "capacity threshold must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub tick_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
        }
    }
}

impl PollingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "polling.tick_interval_ms",
                "0",
                "tick interval must be greater than 0",
            ));
        }
        Ok(())
    }
}
