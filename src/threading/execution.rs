//! Failure isolation around a single unit of work.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::anyhow;
use tracing::debug;

use super::action_item::{ActionFailure, ActionItem};
use crate::logging::log_action_failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionOutcome {
    Completed,
    /// `cancel_requested` is `None` when `handle_failure` itself failed
    Failed { cancel_requested: Option<bool> },
}

/// Run `action` once. Never panics and never returns the action's error:
/// failures go to `handle_failure`, and anything that goes wrong there is
/// discarded.
pub(crate) fn run_action(executor: &str, action: &mut dyn ActionItem) -> ExecutionOutcome {
    let error = match panic::catch_unwind(AssertUnwindSafe(|| action.execute())) {
        Ok(Ok(())) => return ExecutionOutcome::Completed,
        Ok(Err(error)) => error,
        Err(payload) => panic_error(payload.as_ref()),
    };

    log_action_failure(
        executor,
        action.name(),
        action.description(),
        &format!("{error:#}"),
    );

    let failure = ActionFailure::new(action.name(), action.description(), error);
    let handled = panic::catch_unwind(AssertUnwindSafe(|| action.handle_failure(&failure)))
        .unwrap_or_else(|payload| Err(panic_error(payload.as_ref())));

    match handled {
        Ok(()) => ExecutionOutcome::Failed {
            cancel_requested: Some(failure.is_cancelled()),
        },
        Err(secondary) => {
            debug!(
                executor = %executor,
                action_name = %failure.action_name(),
                error = %format!("{secondary:#}"),
                "Discarding failure handler error"
            );
            ExecutionOutcome::Failed {
                cancel_requested: None,
            }
        }
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    anyhow!("action panicked: {message}")
}
