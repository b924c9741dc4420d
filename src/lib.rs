#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Action Executor
//!
//! Fire-and-forget execution core: run units of work off the calling thread,
//! isolate their failures, and shut down gracefully.
//!
//! ## Overview
//!
//! Producers (log handlers, instrumentation, request logging) wrap their work
//! in an [`ActionItem`] and hand it to one of two executors:
//!
//! - [`FireAndForgetQueue`] - bounded, one-shot, FIFO within a batch; excess
//!   work is dropped instead of blocking the producer
//! - [`PollingHandler`] - recurring actions on a fixed tick, with per-action
//!   cancellation and global suspend/resume
//!
//! Many queues can share one consumer thread through a
//! [`SharedQueueExecutor`] built once by the application's composition root.
//!
//! ## Module Organization
//!
//! - [`threading`] - the executors and the unit-of-work contract
//! - [`config`] - thresholds and tick interval, layered from files and env
//! - [`logging`] - structured `tracing` setup
//! - [`error`] - producer-visible errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use action_executor::{FireAndForgetQueue, GenericActionItem, PollingHandler};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! action_executor::logging::init_structured_logging();
//!
//! let queue = FireAndForgetQueue::new()?;
//! queue.queue_action(GenericActionItem::new("log_write", "Persist one log line", || Ok(())));
//!
//! let poller = PollingHandler::with_interval(Duration::from_secs(5))?;
//! poller.add_polling_action(
//!     GenericActionItem::new("heartbeat", "Publish a heartbeat", || Ok(()))
//!         .on_failure(|failure| failure.cancel_action()),
//! )?;
//!
//! queue.flush();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod threading;

pub use config::{ConfigManager, ExecutorConfig, PollingConfig, QueueConfig};
pub use error::{ExecutorError, Result};
pub use threading::{
    ActionFailure, ActionItem, FireAndForgetQueue, GenericActionItem, PollingActionId,
    PollingHandler, PollingMetrics, QueueMetrics, SharedQueueExecutor,
};
