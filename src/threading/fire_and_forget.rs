//! # Fire-and-Forget Queue
//!
//! Multi-producer, single-consumer queue that runs units of work on a
//! background thread. Producers never wait for execution: `queue_action`
//! only takes the pending lock long enough to append (or drop) the unit.
//!
//! The consumer drains the whole pending sequence in one swap, releases the
//! lock and executes the batch in insertion order, so producers keep filling
//! the next batch while the current one runs. Once the pending sequence holds
//! `threshold` units, further units are dropped without error: this queue
//! favours availability over completeness.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use action_executor::threading::{FireAndForgetQueue, GenericActionItem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = FireAndForgetQueue::new()?;
//! queue.queue_action(GenericActionItem::new(
//!     "audit_write",
//!     "Append one audit record",
//!     || Ok(()),
//! ));
//! queue.flush();
//! # Ok(())
//! # }
//! ```

use std::mem;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use super::action_item::ActionItem;
use super::consumer::{
    join_consumer, next_consumer_name, spawn_consumer, ConsumerSignals, ConsumerState, Wake,
};
use super::execution::{run_action, ExecutionOutcome};
use super::metrics::{QueueCounters, QueueMetrics};
use super::shared::SharedQueueExecutor;
use crate::config::QueueConfig;
use crate::constants::{thread_names, DEFAULT_QUEUE_THRESHOLD};
use crate::error::{ExecutorError, Result};

type PendingActions = Vec<Box<dyn ActionItem>>;

/// State shared between producers and the consumer thread.
struct QueueCore {
    name: String,
    threshold: usize,
    state: ConsumerState<PendingActions>,
    signals: ConsumerSignals,
    counters: QueueCounters,
}

impl QueueCore {
    fn enqueue(&self, action: Box<dyn ActionItem>) {
        let mut state = self.state.lock();
        if !state.is_closed() && state.items.len() < self.threshold {
            state.items.push(action);
            state.mark_submitted();
            drop(state);
            self.counters.record_enqueued();
        } else {
            drop(state);
            self.counters.record_dropped();
            trace!(
                executor = %self.name,
                action_name = %action.name(),
                threshold = self.threshold,
                "Dropping action, queue full or stopped"
            );
        }

        // Unconditional: a drop still wakes the consumer, which finds nothing
        // new. The signal coalesces, so sustained overflow cannot spin it.
        self.signals.notify_work();
    }

    fn run(&self) {
        debug!(executor = %self.name, threshold = self.threshold, "Queue consumer started");

        loop {
            self.state.enter_idle();
            if self.signals.wait(None) == Wake::Terminate {
                break;
            }

            let batch = self.state.begin_pass(mem::take);
            self.drain(batch);
        }

        // Work accepted before terminate still runs; later enqueues are dropped.
        let remaining = self.state.close(mem::take);
        let drained = remaining.len();
        self.drain(remaining);
        self.state.finish();

        debug!(executor = %self.name, drained = drained, "Queue consumer stopped");
    }

    fn drain(&self, batch: PendingActions) {
        if batch.is_empty() {
            return;
        }

        self.counters.record_batch();
        trace!(executor = %self.name, batch_size = batch.len(), "Draining batch");

        for mut action in batch {
            let outcome = run_action(&self.name, &mut *action);
            self.counters
                .record_execution(matches!(outcome, ExecutionOutcome::Failed { .. }));
        }
    }

    fn metrics(&self) -> QueueMetrics {
        let pending = self.state.lock().items.len();
        self.counters.snapshot(pending)
    }
}

/// A queue core together with the consumer thread draining it.
pub(crate) struct QueueWorker {
    core: Arc<QueueCore>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl QueueWorker {
    pub(crate) fn start(prefix: &str, threshold: usize) -> Result<Self> {
        if threshold == 0 {
            return Err(ExecutorError::invalid_argument(
                "threshold",
                "capacity threshold must be greater than 0",
            ));
        }

        let name = next_consumer_name(prefix);
        let core = Arc::new(QueueCore {
            name: name.clone(),
            threshold,
            state: ConsumerState::new(Vec::new()),
            signals: ConsumerSignals::new(),
            counters: QueueCounters::default(),
        });

        let consumer = Arc::clone(&core);
        let handle = spawn_consumer(&name, move || consumer.run())?;

        info!(executor = %name, threshold = threshold, "🚀 Fire-and-forget queue started");

        Ok(Self {
            core,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub(crate) fn enqueue(&self, action: Box<dyn ActionItem>) {
        self.core.enqueue(action);
    }

    pub(crate) fn flush(&self) {
        self.core.state.wait_until_idle();
    }

    /// Signal terminate and join once the in-flight batch and everything
    /// still pending have run.
    pub(crate) fn shutdown(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        self.core.signals.request_terminate();
        join_consumer(handle, &self.core.name);
        info!(executor = %self.core.name, "🛑 Fire-and-forget queue shut down");
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.core.state.is_terminated()
    }

    pub(crate) fn threshold(&self) -> usize {
        self.core.threshold
    }

    pub(crate) fn name(&self) -> &str {
        &self.core.name
    }

    pub(crate) fn metrics(&self) -> QueueMetrics {
        self.core.metrics()
    }
}

impl Drop for QueueWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

enum QueueBackend {
    Dedicated(QueueWorker),
    Shared(SharedQueueExecutor),
}

/// Bounded fire-and-forget queue.
///
/// A *dedicated* queue owns its consumer thread and stops it on
/// [`shutdown`](Self::shutdown) or drop. A *shared* queue forwards every
/// enqueue to a [`SharedQueueExecutor`] and never stops it.
pub struct FireAndForgetQueue {
    backend: QueueBackend,
}

impl FireAndForgetQueue {
    /// Dedicated queue with the default threshold (2000)
    pub fn new() -> Result<Self> {
        Self::with_threshold(DEFAULT_QUEUE_THRESHOLD)
    }

    /// Dedicated queue holding at most `threshold` pending units
    pub fn with_threshold(threshold: usize) -> Result<Self> {
        let worker = QueueWorker::start(thread_names::QUEUE, threshold)?;
        Ok(Self {
            backend: QueueBackend::Dedicated(worker),
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        Self::with_threshold(config.capacity_threshold)
    }

    /// Queue that routes all work to the shared consumer thread
    pub fn shared(executor: &SharedQueueExecutor) -> Self {
        Self {
            backend: QueueBackend::Shared(executor.clone()),
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.backend, QueueBackend::Shared(_))
    }

    /// Fire and forget. Queue `action` to be executed on the consumer thread,
    /// or drop it if the pending threshold is reached.
    pub fn queue_action<A: ActionItem>(&self, action: A) {
        self.queue_boxed(Box::new(action));
    }

    pub fn queue_boxed(&self, action: Box<dyn ActionItem>) {
        match &self.backend {
            QueueBackend::Dedicated(worker) => worker.enqueue(action),
            QueueBackend::Shared(executor) => executor.queue_boxed(action),
        }
    }

    /// Block until the consumer is idle.
    ///
    /// Everything this thread queued before calling `flush` has run when it
    /// returns. Work queued concurrently by other threads may or may not have.
    pub fn flush(&self) {
        self.worker().flush();
    }

    /// Stop a dedicated queue's consumer. Blocks until the current batch and
    /// every unit accepted before the call have run; units queued afterwards
    /// are dropped. No-op for shared queues.
    pub fn shutdown(&self) {
        match &self.backend {
            QueueBackend::Dedicated(worker) => worker.shutdown(),
            QueueBackend::Shared(executor) => debug!(
                executor = %executor.name(),
                "Ignoring shutdown of a shared queue handle"
            ),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker().is_running()
    }

    /// Threshold of the consumer this queue feeds
    pub fn threshold(&self) -> usize {
        self.worker().threshold()
    }

    pub fn metrics(&self) -> QueueMetrics {
        self.worker().metrics()
    }

    fn worker(&self) -> &QueueWorker {
        match &self.backend {
            QueueBackend::Dedicated(worker) => worker,
            QueueBackend::Shared(executor) => executor.worker(),
        }
    }
}
