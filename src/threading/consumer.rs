//! Consumer-thread plumbing shared by both executors.
//!
//! The "work available" and "terminate" signals are crossbeam channels so the
//! consumer can block on both at once (optionally bounded by a tick timeout).
//! The "idle" signal is a condition variable on the same mutex that guards the
//! executor's pending work, so producers and `flush()` see a consistent view.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error};

use crate::error::{ExecutorError, Result};

static NEXT_CONSUMER_ID: AtomicUsize = AtomicUsize::new(1);

/// Why the consumer woke up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    Work,
    Tick,
    Terminate,
}

pub(crate) struct ConsumerSignals {
    work_tx: Sender<()>,
    work_rx: Receiver<()>,
    terminate_tx: Mutex<Option<Sender<()>>>,
    terminate_rx: Receiver<()>,
}

impl ConsumerSignals {
    pub(crate) fn new() -> Self {
        // Capacity 1: repeated notifications coalesce into a single pending wakeup.
        let (work_tx, work_rx) = bounded(1);
        let (terminate_tx, terminate_rx) = bounded(0);
        Self {
            work_tx,
            work_rx,
            terminate_tx: Mutex::new(Some(terminate_tx)),
            terminate_rx,
        }
    }

    /// Signal "work available". Never blocks.
    pub(crate) fn notify_work(&self) {
        let _ = self.work_tx.try_send(());
    }

    /// Signal "terminate". Dropping the only sender disconnects the channel,
    /// which every current and future wait observes.
    pub(crate) fn request_terminate(&self) {
        self.terminate_tx.lock().take();
    }

    pub(crate) fn terminate_requested(&self) -> bool {
        matches!(
            self.terminate_rx.try_recv(),
            Err(TryRecvError::Disconnected)
        )
    }

    /// Block until work is signalled, termination is requested, or `timeout`
    /// elapses. Termination wins whenever it is visible.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> Wake {
        let wake = match timeout {
            Some(timeout) => select! {
                recv(self.work_rx) -> _ => Wake::Work,
                recv(self.terminate_rx) -> _ => Wake::Terminate,
                default(timeout) => Wake::Tick,
            },
            None => select! {
                recv(self.work_rx) -> _ => Wake::Work,
                recv(self.terminate_rx) -> _ => Wake::Terminate,
            },
        };

        if self.terminate_requested() {
            Wake::Terminate
        } else {
            wake
        }
    }

    /// Sleep for `duration`, cut short only by termination. Work signals
    /// raised meanwhile stay pending for the next `wait`.
    pub(crate) fn rest(&self, duration: Duration) -> Wake {
        match self.terminate_rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Wake::Tick,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Wake::Terminate,
        }
    }
}

pub(crate) struct ConsumerInner<T> {
    pub(crate) items: T,
    /// Work submitted that the consumer has not picked up yet
    pub(crate) work_pending: bool,
    idle: bool,
    /// No further work is accepted; the consumer may still be draining
    closed: bool,
    terminated: bool,
}

/// Pending work plus the idle/closed/terminated flags, behind one lock.
pub(crate) struct ConsumerState<T> {
    inner: Mutex<ConsumerInner<T>>,
    idle_changed: Condvar,
}

impl<T> ConsumerState<T> {
    pub(crate) fn new(items: T) -> Self {
        Self {
            inner: Mutex::new(ConsumerInner {
                items,
                work_pending: false,
                idle: false,
                closed: false,
                terminated: false,
            }),
            idle_changed: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ConsumerInner<T>> {
        self.inner.lock()
    }

    /// Enter `Idle` unless producers have submitted work since the last pass.
    pub(crate) fn enter_idle(&self) {
        let mut inner = self.inner.lock();
        if !inner.work_pending {
            inner.idle = true;
            self.idle_changed.notify_all();
        }
    }

    /// Enter `Active`, taking ownership of whatever the producers submitted.
    pub(crate) fn begin_pass<R>(&self, take: impl FnOnce(&mut T) -> R) -> R {
        let mut inner = self.inner.lock();
        inner.idle = false;
        inner.work_pending = false;
        take(&mut inner.items)
    }

    /// Stop accepting work and take what is still pending. `flush()` callers
    /// keep waiting until [`finish`](Self::finish).
    pub(crate) fn close<R>(&self, take: impl FnOnce(&mut T) -> R) -> R {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.work_pending = false;
        inner.idle = false;
        take(&mut inner.items)
    }

    /// Enter `Terminated`; releases every `flush()` caller.
    pub(crate) fn finish(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.idle = true;
        inner.terminated = true;
        self.idle_changed.notify_all();
    }

    /// Block until the consumer reports `Idle` or has terminated.
    pub(crate) fn wait_until_idle(&self) {
        let mut inner = self.inner.lock();
        while !(inner.idle || inner.terminated) {
            self.idle_changed.wait(&mut inner);
        }
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.inner.lock().terminated
    }
}

impl<T> ConsumerInner<T> {
    /// Record a producer submission; the consumer is no longer idle.
    pub(crate) fn mark_submitted(&mut self) {
        self.work_pending = true;
        self.idle = false;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Process-unique consumer name, also used as the thread name.
pub(crate) fn next_consumer_name(prefix: &str) -> String {
    let id = NEXT_CONSUMER_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

/// Spawn a named consumer thread.
pub(crate) fn spawn_consumer<F>(name: &str, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|e| ExecutorError::thread_spawn(name, &e))
}

/// Join a consumer thread unless called from that thread itself.
pub(crate) fn join_consumer(handle: JoinHandle<()>, executor: &str) {
    if handle.thread().id() == thread::current().id() {
        debug!(executor = %executor, "Shutdown requested from the consumer thread, skipping join");
        return;
    }
    if handle.join().is_err() {
        error!(executor = %executor, "Consumer thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_wait_times_out_as_tick() {
        let signals = ConsumerSignals::new();
        assert_eq!(signals.wait(Some(Duration::from_millis(10))), Wake::Tick);
    }

    #[test]
    fn test_work_notifications_coalesce() {
        let signals = ConsumerSignals::new();
        signals.notify_work();
        signals.notify_work();
        signals.notify_work();

        assert_eq!(signals.wait(None), Wake::Work);
        assert_eq!(signals.wait(Some(Duration::from_millis(10))), Wake::Tick);
    }

    #[test]
    fn test_terminate_wins_over_pending_work() {
        let signals = ConsumerSignals::new();
        signals.notify_work();
        signals.request_terminate();

        assert_eq!(signals.wait(None), Wake::Terminate);
        assert_eq!(signals.wait(None), Wake::Terminate);
    }

    #[test]
    fn test_terminate_interrupts_blocked_wait() {
        let signals = Arc::new(ConsumerSignals::new());
        let waiter = Arc::clone(&signals);
        let started = Instant::now();
        let handle = thread::spawn(move || waiter.wait(Some(Duration::from_secs(30))));

        thread::sleep(Duration::from_millis(20));
        signals.request_terminate();

        assert_eq!(handle.join().unwrap(), Wake::Terminate);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_idle_is_withheld_while_work_pending() {
        let state = ConsumerState::new(Vec::<u32>::new());
        state.lock().mark_submitted();
        state.enter_idle();
        assert!(!state.lock().idle);

        let taken = state.begin_pass(std::mem::take);
        assert!(taken.is_empty());
        state.enter_idle();
        state.wait_until_idle();
    }

    #[test]
    fn test_close_hands_over_pending_and_finish_releases_waiters() {
        let state = Arc::new(ConsumerState::new(vec![1, 2, 3]));
        state.begin_pass(|_| ());
        let waiter = Arc::clone(&state);
        let handle = thread::spawn(move || waiter.wait_until_idle());

        let remaining = state.close(std::mem::take);
        assert_eq!(remaining, vec![1, 2, 3]);
        assert!(state.lock().is_closed());
        assert!(!state.is_terminated());

        state.finish();
        handle.join().unwrap();
        assert!(state.is_terminated());
    }

    #[test]
    fn test_rest_ignores_work_but_not_terminate() {
        let signals = ConsumerSignals::new();
        signals.notify_work();
        assert_eq!(signals.rest(Duration::from_millis(10)), Wake::Tick);
        assert_eq!(signals.wait(None), Wake::Work);

        signals.request_terminate();
        let started = Instant::now();
        assert_eq!(signals.rest(Duration::from_secs(30)), Wake::Terminate);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_spawn_consumer_names_thread() {
        let name = next_consumer_name("unit-test");
        let handle = spawn_consumer(&name, || {
            let name = thread::current().name().map(str::to_string);
            assert!(name.unwrap().starts_with("unit-test-"));
        })
        .unwrap();
        join_consumer(handle, &name);
    }
}
