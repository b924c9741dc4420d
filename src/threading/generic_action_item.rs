//! Closure-backed unit of work for producers without a dedicated type.

use std::fmt;

use super::action_item::{ActionFailure, ActionItem};

type ActionFn = Box<dyn FnMut() -> anyhow::Result<()> + Send>;
type FailureFn = Box<dyn FnMut(&ActionFailure) + Send>;

/// [`ActionItem`] built from a closure.
///
/// Failures are swallowed unless an [`on_failure`](Self::on_failure) handler
/// is attached.
pub struct GenericActionItem {
    name: String,
    description: String,
    action: ActionFn,
    on_failure: Option<FailureFn>,
}

impl GenericActionItem {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, action: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            action: Box::new(action),
            on_failure: None,
        }
    }

    /// Attach a failure handler. It may call
    /// [`ActionFailure::cancel_action`] to stop a recurring action.
    pub fn on_failure<H>(mut self, handler: H) -> Self
    where
        H: FnMut(&ActionFailure) + Send + 'static,
    {
        self.on_failure = Some(Box::new(handler));
        self
    }
}

impl ActionItem for GenericActionItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self) -> anyhow::Result<()> {
        (self.action)()
    }

    fn handle_failure(&mut self, failure: &ActionFailure) -> anyhow::Result<()> {
        if let Some(handler) = self.on_failure.as_mut() {
            handler(failure);
        }
        Ok(())
    }
}

impl fmt::Debug for GenericActionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericActionItem")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_failure_handler", &self.on_failure.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_failure_handler_can_cancel() {
        let handled = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&handled);
        let mut item = GenericActionItem::new("sync", "Sync mirror", || Err(anyhow!("offline")))
            .on_failure(move |failure| {
                seen.store(true, Ordering::SeqCst);
                failure.cancel_action();
            });

        let error = item.execute().unwrap_err();
        let failure = ActionFailure::new(item.name(), item.description(), error);
        item.handle_failure(&failure).unwrap();

        assert!(handled.load(Ordering::SeqCst));
        assert!(failure.is_cancelled());
    }

    #[test]
    fn test_without_handler_failure_is_ignored() {
        let mut item = GenericActionItem::new("noop", "Does nothing", || Ok(()));
        let failure = ActionFailure::new("noop", "Does nothing", anyhow!("unused"));

        assert!(item.execute().is_ok());
        assert!(item.handle_failure(&failure).is_ok());
        assert!(!failure.is_cancelled());
    }
}
