//! Test units of work

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use action_executor::{ActionFailure, ActionItem};
use anyhow::bail;
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// Appends its label (and the executing thread's name) to a shared log
pub struct RecordingAction {
    label: usize,
    log: Arc<Mutex<Vec<usize>>>,
    threads: Option<Arc<Mutex<Vec<String>>>>,
}

impl RecordingAction {
    pub fn new(label: usize, log: &Arc<Mutex<Vec<usize>>>) -> Self {
        Self {
            label,
            log: Arc::clone(log),
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: &Arc<Mutex<Vec<String>>>) -> Self {
        self.threads = Some(Arc::clone(threads));
        self
    }
}

impl ActionItem for RecordingAction {
    fn name(&self) -> &str {
        "recording_action"
    }

    fn description(&self) -> &str {
        "Records its label"
    }

    fn execute(&mut self) -> anyhow::Result<()> {
        self.log.lock().push(self.label);
        if let Some(threads) = &self.threads {
            let name = thread::current().name().unwrap_or("unnamed").to_string();
            threads.lock().push(name);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    Never,
    Always,
    FirstOnly,
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub action_name: String,
    pub action_description: String,
    pub error: String,
    pub thread: String,
}

/// Counts executions and failure-handler calls, failing as scripted
pub struct ScriptedAction {
    name: String,
    description: String,
    mode: FailMode,
    cancel_on_failure: bool,
    handler_fails: bool,
    executions: Arc<AtomicUsize>,
    failures: Arc<Mutex<Vec<FailureRecord>>>,
}

#[derive(Clone)]
pub struct ScriptedProbe {
    pub executions: Arc<AtomicUsize>,
    pub failures: Arc<Mutex<Vec<FailureRecord>>>,
}

impl ScriptedProbe {
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        self.failures.lock().clone()
    }
}

impl ScriptedAction {
    pub fn new(name: &str, mode: FailMode) -> (Self, ScriptedProbe) {
        let probe = ScriptedProbe {
            executions: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(Mutex::new(Vec::new())),
        };
        let action = Self {
            name: name.to_string(),
            description: format!("Scripted action {name}"),
            mode,
            cancel_on_failure: false,
            handler_fails: false,
            executions: Arc::clone(&probe.executions),
            failures: Arc::clone(&probe.failures),
        };
        (action, probe)
    }

    pub fn cancel_on_failure(mut self) -> Self {
        self.cancel_on_failure = true;
        self
    }

    pub fn handler_fails(mut self) -> Self {
        self.handler_fails = true;
        self
    }
}

impl ActionItem for ScriptedAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self) -> anyhow::Result<()> {
        let attempt = self.executions.fetch_add(1, Ordering::SeqCst) + 1;
        match self.mode {
            FailMode::Never => Ok(()),
            FailMode::Always => bail!("{} failed on attempt {attempt}", self.name),
            FailMode::FirstOnly if attempt == 1 => bail!("{} failed on attempt 1", self.name),
            FailMode::FirstOnly => Ok(()),
            FailMode::Panic => panic!("{} panicked", self.name),
        }
    }

    fn handle_failure(&mut self, failure: &ActionFailure) -> anyhow::Result<()> {
        self.failures.lock().push(FailureRecord {
            action_name: failure.action_name().to_string(),
            action_description: failure.action_description().to_string(),
            error: failure.error().to_string(),
            thread: thread::current().name().unwrap_or("unnamed").to_string(),
        });
        if self.cancel_on_failure {
            failure.cancel_action();
        }
        if self.handler_fails {
            bail!("failure handler for {} failed", self.name);
        }
        Ok(())
    }
}

/// Blocks the consumer until released, so tests control when drains happen
pub struct GateAction {
    started: Sender<()>,
    release: Receiver<()>,
}

pub struct GateControl {
    started: Receiver<()>,
    release: Sender<()>,
}

impl GateControl {
    /// Wait until the consumer is inside the gate
    pub fn wait_started(&self) {
        self.started
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("gate action never started");
    }

    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

pub fn gate() -> (GateAction, GateControl) {
    let (started_tx, started_rx) = unbounded();
    let (release_tx, release_rx) = unbounded();
    (
        GateAction {
            started: started_tx,
            release: release_rx,
        },
        GateControl {
            started: started_rx,
            release: release_tx,
        },
    )
}

impl ActionItem for GateAction {
    fn name(&self) -> &str {
        "gate"
    }

    fn description(&self) -> &str {
        "Blocks the consumer until released"
    }

    fn execute(&mut self) -> anyhow::Result<()> {
        let _ = self.started.send(());
        let _ = self.release.recv();
        Ok(())
    }
}
