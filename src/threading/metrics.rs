//! Executor counters.
//!
//! Updated with relaxed atomics from producer and consumer threads; snapshots
//! are point-in-time and not mutually consistent across fields.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct QueueCounters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    batches: AtomicU64,
    executed: AtomicU64,
    failed: AtomicU64,
}

impl QueueCounters {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_execution(&self, failed: bool) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self, pending: usize) -> QueueMetrics {
        QueueMetrics {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            pending,
        }
    }
}

/// Fire-and-forget queue metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueMetrics {
    /// Units accepted into the pending sequence
    pub enqueued: u64,
    /// Units rejected because the threshold was reached
    pub dropped: u64,
    /// Non-empty batches drained by the consumer
    pub batches: u64,
    /// Units executed, successful or not
    pub executed: u64,
    pub failed: u64,
    /// Units waiting for the next drain
    pub pending: usize,
}

#[derive(Debug, Default)]
pub(crate) struct PollingCounters {
    ticks: AtomicU64,
    suspended_ticks: AtomicU64,
    executed: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
}

impl PollingCounters {
    pub(crate) fn record_tick(&self, suspended: bool) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if suspended {
            self.suspended_ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_execution(&self, failed: bool) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, registered: usize) -> PollingMetrics {
        PollingMetrics {
            ticks: self.ticks.load(Ordering::Relaxed),
            suspended_ticks: self.suspended_ticks.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            registered,
        }
    }
}

/// Polling handler metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollingMetrics {
    /// Passes of the consumer loop, suspended ones included
    pub ticks: u64,
    pub suspended_ticks: u64,
    pub executed: u64,
    pub failed: u64,
    /// Actions disabled by their failure handler or by `cancel`
    pub cancelled: u64,
    pub registered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_counters_snapshot() {
        let counters = QueueCounters::default();
        counters.record_enqueued();
        counters.record_enqueued();
        counters.record_dropped();
        counters.record_batch();
        counters.record_execution(false);
        counters.record_execution(true);

        assert_eq!(
            counters.snapshot(0),
            QueueMetrics {
                enqueued: 2,
                dropped: 1,
                batches: 1,
                executed: 2,
                failed: 1,
                pending: 0,
            }
        );
    }

    #[test]
    fn test_polling_counters_track_suspended_ticks() {
        let counters = PollingCounters::default();
        counters.record_tick(false);
        counters.record_tick(true);
        counters.record_cancelled();

        let metrics = counters.snapshot(3);
        assert_eq!(metrics.ticks, 2);
        assert_eq!(metrics.suspended_ticks, 1);
        assert_eq!(metrics.cancelled, 1);
        assert_eq!(metrics.registered, 3);
    }

    #[test]
    fn test_snapshots_are_serializable() {
        fn exported<T: Serialize>(_: &T) {}
        exported(&QueueCounters::default().snapshot(0));
        exported(&PollingCounters::default().snapshot(0));
    }
}
