//! # Polling Handler
//!
//! Re-executes a registered set of long-lived actions on a fixed tick, on one
//! background thread, independently of any fire-and-forget work.
//!
//! ## Tick Semantics
//!
//! Each tick runs one pass: if not suspended, every non-cancelled action
//! executes once, sequentially, outside the set lock. After a pass that ran
//! anything, the consumer rests a full tick interval and only "terminate" can
//! cut that rest short, so registrations never make existing actions run more
//! than once per tick. When the last pass ran nothing (empty set, everything
//! cancelled, or suspended) the consumer waits up to one interval and a new
//! registration wakes it early. Terminate ends the loop at once; an action
//! already executing is never interrupted.
//!
//! ## Cancellation
//!
//! A failing action's `handle_failure` may call
//! [`ActionFailure::cancel_action`](super::ActionFailure::cancel_action); the
//! action then stays registered but is skipped from the next pass on.
//! [`PollingHandler::cancel`] does the same from outside.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use super::action_item::ActionItem;
use super::consumer::{
    join_consumer, next_consumer_name, spawn_consumer, ConsumerSignals, ConsumerState, Wake,
};
use super::execution::{run_action, ExecutionOutcome};
use super::metrics::{PollingCounters, PollingMetrics};
use crate::config::PollingConfig;
use crate::constants::{thread_names, DEFAULT_POLLING_INTERVAL};
use crate::error::{ExecutorError, Result};

/// Handle to one registration, returned by
/// [`PollingHandler::add_polling_action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PollingActionId(u64);

impl fmt::Display for PollingActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "polling-action-{}", self.0)
    }
}

#[derive(Clone)]
struct PollingEntry {
    id: PollingActionId,
    name: String,
    action: Arc<Mutex<Box<dyn ActionItem>>>,
    cancelled: Arc<AtomicBool>,
}

impl PollingEntry {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns true when this call is the one that disabled the entry
    fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }
}

struct PollingCore {
    name: String,
    interval: Duration,
    state: ConsumerState<Vec<PollingEntry>>,
    signals: ConsumerSignals,
    suspended: AtomicBool,
    next_id: AtomicU64,
    counters: PollingCounters,
}

impl PollingCore {
    fn register(&self, action: Box<dyn ActionItem>) -> PollingActionId {
        let id = PollingActionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = PollingEntry {
            id,
            name: action.name().to_string(),
            action: Arc::new(Mutex::new(action)),
            cancelled: Arc::new(AtomicBool::new(false)),
        };

        debug!(
            executor = %self.name,
            action_id = %id,
            action_name = %entry.name,
            "Registering polling action"
        );

        let mut state = self.state.lock();
        state.items.push(entry);
        state.mark_submitted();
        drop(state);

        self.signals.notify_work();
        id
    }

    fn find<R>(&self, id: PollingActionId, f: impl FnOnce(&PollingEntry) -> R) -> Option<R> {
        let state = self.state.lock();
        state.items.iter().find(|entry| entry.id == id).map(f)
    }

    fn run(&self) {
        debug!(
            executor = %self.name,
            interval_ms = self.interval.as_millis() as u64,
            "Polling consumer started"
        );

        let mut ran_actions = false;
        loop {
            self.state.enter_idle();
            let wake = if ran_actions {
                self.signals.rest(self.interval)
            } else {
                self.signals.wait(Some(self.interval))
            };
            if wake == Wake::Terminate {
                break;
            }

            // The suspended flag is read under the set lock so that
            // `suspend()` followed by `flush()` is a quiescent point.
            let mut suspended = false;
            let snapshot: Vec<PollingEntry> = self.state.begin_pass(|entries| {
                suspended = self.suspended.load(Ordering::Acquire);
                if suspended {
                    Vec::new()
                } else {
                    entries
                        .iter()
                        .filter(|entry| !entry.is_cancelled())
                        .cloned()
                        .collect()
                }
            });

            trace!(
                executor = %self.name,
                suspended = suspended,
                actions = snapshot.len(),
                "Polling tick"
            );

            ran_actions = false;
            for entry in &snapshot {
                ran_actions |= self.execute(entry);
            }
            self.counters.record_tick(suspended);
        }

        self.state.close(|_| ());
        self.state.finish();
        debug!(executor = %self.name, "Polling consumer stopped");
    }

    /// Returns false when the entry was skipped
    fn execute(&self, entry: &PollingEntry) -> bool {
        // Cancelled through the public API after the snapshot was taken
        if entry.is_cancelled() {
            return false;
        }

        let mut action = entry.action.lock();
        let outcome = run_action(&self.name, &mut **action);
        drop(action);

        match outcome {
            ExecutionOutcome::Completed => self.counters.record_execution(false),
            ExecutionOutcome::Failed { cancel_requested } => {
                self.counters.record_execution(true);
                if cancel_requested == Some(true) && entry.cancel() {
                    self.counters.record_cancelled();
                    warn!(
                        executor = %self.name,
                        action_id = %entry.id,
                        action_name = %entry.name,
                        "⏹️ Polling action cancelled by its failure handler"
                    );
                }
            }
        }
        true
    }
}

/// Fixed-interval executor for recurring actions.
pub struct PollingHandler {
    core: Arc<PollingCore>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollingHandler {
    /// Handler ticking once per second
    pub fn new() -> Result<Self> {
        Self::with_interval(DEFAULT_POLLING_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ExecutorError::invalid_argument(
                "interval",
                "tick interval must be greater than 0",
            ));
        }

        let name = next_consumer_name(thread_names::POLLING);
        let core = Arc::new(PollingCore {
            name: name.clone(),
            interval,
            state: ConsumerState::new(Vec::new()),
            signals: ConsumerSignals::new(),
            suspended: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            counters: PollingCounters::default(),
        });

        let consumer = Arc::clone(&core);
        let handle = spawn_consumer(&name, move || consumer.run())?;

        info!(
            executor = %name,
            interval_ms = interval.as_millis() as u64,
            "🚀 Polling handler started"
        );

        Ok(Self {
            core,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn from_config(config: &PollingConfig) -> Result<Self> {
        Self::with_interval(config.tick_interval())
    }

    /// Register a recurring action. It first runs on the next pass: at once
    /// when the consumer has nothing else to run, otherwise at the next tick.
    ///
    /// Fails with [`ExecutorError::InvalidArgument`] when the action's name
    /// or description is blank.
    pub fn add_polling_action<A: ActionItem>(&self, action: A) -> Result<PollingActionId> {
        self.add_boxed(Box::new(action))
    }

    pub fn add_boxed(&self, action: Box<dyn ActionItem>) -> Result<PollingActionId> {
        if action.name().trim().is_empty() {
            return Err(ExecutorError::invalid_argument(
                "action.name",
                "must not be blank",
            ));
        }
        if action.description().trim().is_empty() {
            return Err(ExecutorError::invalid_argument(
                "action.description",
                "must not be blank",
            ));
        }

        Ok(self.core.register(action))
    }

    /// Stop executing actions; ticks keep firing and the set is untouched.
    pub fn suspend(&self) {
        self.core.suspended.store(true, Ordering::Release);
        info!(executor = %self.core.name, "⏸️ Polling handler suspended");
    }

    pub fn unsuspend(&self) {
        self.core.suspended.store(false, Ordering::Release);
        info!(executor = %self.core.name, "▶️ Polling handler resumed");
    }

    pub fn is_suspended(&self) -> bool {
        self.core.suspended.load(Ordering::Acquire)
    }

    /// Disable one action without removing it. Returns false for an unknown id.
    pub fn cancel(&self, id: PollingActionId) -> bool {
        let newly_cancelled = match self.core.find(id, PollingEntry::cancel) {
            Some(newly_cancelled) => newly_cancelled,
            None => return false,
        };
        if newly_cancelled {
            self.core.counters.record_cancelled();
            debug!(executor = %self.core.name, action_id = %id, "Polling action cancelled");
        }
        true
    }

    /// `None` for an unknown id
    pub fn is_cancelled(&self, id: PollingActionId) -> Option<bool> {
        self.core.find(id, PollingEntry::is_cancelled)
    }

    /// Registered actions, cancelled ones included
    pub fn action_count(&self) -> usize {
        self.core.state.lock().items.len()
    }

    pub fn interval(&self) -> Duration {
        self.core.interval
    }

    /// Block until the consumer is idle between passes, so that actions this
    /// thread registered have run at least once. Advisory: concurrent
    /// registrations from other threads are not held back.
    pub fn flush(&self) {
        self.core.state.wait_until_idle();
    }

    /// Signal terminate and join; a pass already running finishes first.
    pub fn shutdown(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        self.core.signals.request_terminate();
        join_consumer(handle, &self.core.name);
        info!(executor = %self.core.name, "🛑 Polling handler shut down");
    }

    pub fn is_running(&self) -> bool {
        !self.core.state.is_terminated()
    }

    pub fn metrics(&self) -> PollingMetrics {
        self.core.counters.snapshot(self.action_count())
    }
}

impl Drop for PollingHandler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
