//! # System Constants
//!
//! Defaults shared by the executors and the configuration layer.

use std::time::Duration;

/// Pending-item threshold for a dedicated fire-and-forget queue
pub const DEFAULT_QUEUE_THRESHOLD: usize = 2000;

/// Pending-item threshold for the shared consumer
pub const DEFAULT_SHARED_QUEUE_THRESHOLD: usize = 5000;

/// Tick interval for the polling handler, in milliseconds
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 1000;

pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS);

/// Thread name prefixes, suffixed with a process-unique sequence number
pub mod thread_names {
    pub const QUEUE: &str = "action-queue";
    pub const SHARED_QUEUE: &str = "action-queue-shared";
    pub const POLLING: &str = "polling-handler";
}

/// Environment variables read by the logging and configuration layers
pub mod env {
    pub const ENVIRONMENT: &str = "ACTION_EXECUTOR_ENV";
    pub const FALLBACK_ENVIRONMENT: &str = "APP_ENV";
    pub const LOG_FORMAT: &str = "ACTION_EXECUTOR_LOG_FORMAT";
    pub const CONFIG_DIR: &str = "ACTION_EXECUTOR_CONFIG_DIR";
    pub const CONFIG_PREFIX: &str = "ACTION_EXECUTOR";
}
