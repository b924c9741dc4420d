//! # Unit of Work Contract
//!
//! [`ActionItem`] is the only capability the executors consume. Producers wrap
//! their payload and destination in an implementation and hand it to a
//! [`FireAndForgetQueue`](super::FireAndForgetQueue) (one-shot) or a
//! [`PollingHandler`](super::PollingHandler) (recurring).

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};

/// A schedulable unit of work.
///
/// `execute` and `handle_failure` always run on the executor's consumer
/// thread, never concurrently with another call on the same unit.
pub trait ActionItem: Send + 'static {
    /// Stable identifier used in diagnostics
    fn name(&self) -> &str;

    /// Human-readable purpose
    fn description(&self) -> &str;

    /// Perform the side effect. An `Err` or a panic counts as a failure.
    fn execute(&mut self) -> anyhow::Result<()>;

    /// Called on the consumer thread after `execute` fails.
    ///
    /// Recurring actions may call [`ActionFailure::cancel_action`] to stop
    /// being scheduled from the next tick on. Errors returned here are
    /// discarded by the executor.
    fn handle_failure(&mut self, failure: &ActionFailure) -> anyhow::Result<()> {
        let _ = failure;
        Ok(())
    }
}

/// Notification describing one failed execution.
pub struct ActionFailure {
    action_name: String,
    action_description: String,
    error: anyhow::Error,
    occurred_at: DateTime<Utc>,
    cancelled: OnceLock<()>,
}

impl ActionFailure {
    pub fn new(
        action_name: impl Into<String>,
        action_description: impl Into<String>,
        error: anyhow::Error,
    ) -> Self {
        Self {
            action_name: action_name.into(),
            action_description: action_description.into(),
            error,
            occurred_at: Utc::now(),
            cancelled: OnceLock::new(),
        }
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn action_description(&self) -> &str {
        &self.action_description
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Request that the failing action not be scheduled again.
    ///
    /// Once set the flag stays set; further calls have no effect. Only the
    /// polling handler acts on it.
    pub fn cancel_action(&self) {
        let _ = self.cancelled.set(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get().is_some()
    }
}

impl fmt::Debug for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionFailure")
            .field("action_name", &self.action_name)
            .field("action_description", &self.action_description)
            .field("error", &format_args!("{:#}", self.error))
            .field("occurred_at", &self.occurred_at)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action '{}' failed: {:#}", self.action_name, self.error)
    }
}
