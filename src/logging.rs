//! # Structured Logging Module
//!
//! Environment-aware structured logging for the executor threads. Console
//! output is human-readable by default; set `ACTION_EXECUTOR_LOG_FORMAT=json`
//! for one JSON object per line.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ConfigManager;
use crate::constants::env as env_keys;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber,
/// and an already-installed global subscriber is left in place.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = if json_output_requested() {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_names(true)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

fn json_output_requested() -> bool {
    std::env::var(env_keys::LOG_FORMAT)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log a unit-of-work failure with full context
pub fn log_action_failure(
    executor: &str,
    action_name: &str,
    action_description: &str,
    error: &str,
) {
    tracing::warn!(
        executor = %executor,
        action_name = %action_name,
        action_description = %action_description,
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ACTION_FAILED"
    );
}
