//! # Shared Queue Consumer
//!
//! One consumer thread servicing many logical [`FireAndForgetQueue`]s. The
//! composition root builds a single `SharedQueueExecutor` and hands clones to
//! every queue created with [`FireAndForgetQueue::shared`]; all of them drain
//! through the same pending sequence and the same threshold.
//!
//! The consumer stops on [`SharedQueueExecutor::shutdown`] or when the last
//! clone (including those held by shared queues) is dropped.

use std::sync::Arc;

use super::action_item::ActionItem;
use super::fire_and_forget::{FireAndForgetQueue, QueueWorker};
use super::metrics::QueueMetrics;
use crate::config::QueueConfig;
use crate::constants::{thread_names, DEFAULT_SHARED_QUEUE_THRESHOLD};
use crate::error::Result;

#[derive(Clone)]
pub struct SharedQueueExecutor {
    worker: Arc<QueueWorker>,
}

impl SharedQueueExecutor {
    /// Shared consumer with the default threshold (5000)
    pub fn new() -> Result<Self> {
        Self::with_threshold(DEFAULT_SHARED_QUEUE_THRESHOLD)
    }

    pub fn with_threshold(threshold: usize) -> Result<Self> {
        let worker = QueueWorker::start(thread_names::SHARED_QUEUE, threshold)?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        Self::with_threshold(config.capacity_threshold)
    }

    /// Convenience for `FireAndForgetQueue::shared(self)`
    pub fn queue(&self) -> FireAndForgetQueue {
        FireAndForgetQueue::shared(self)
    }

    pub fn queue_action<A: ActionItem>(&self, action: A) {
        self.queue_boxed(Box::new(action));
    }

    pub fn queue_boxed(&self, action: Box<dyn ActionItem>) {
        self.worker.enqueue(action);
    }

    pub fn flush(&self) {
        self.worker.flush();
    }

    /// Stop the shared consumer for every queue routed to it.
    pub fn shutdown(&self) {
        self.worker.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Consumer thread name
    pub fn name(&self) -> &str {
        self.worker.name()
    }

    pub fn threshold(&self) -> usize {
        self.worker.threshold()
    }

    pub fn metrics(&self) -> QueueMetrics {
        self.worker.metrics()
    }

    pub(crate) fn worker(&self) -> &QueueWorker {
        &self.worker
    }
}
