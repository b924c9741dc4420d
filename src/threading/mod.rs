//! # Threading Module
//!
//! Background executors for units of work:
//!
//! - [`FireAndForgetQueue`] runs each queued action once, on a dedicated or
//!   shared ([`SharedQueueExecutor`]) consumer thread
//! - [`PollingHandler`] re-runs registered actions on a fixed tick
//!
//! Both run actions synchronously on their own thread, never hold a lock while
//! an action executes, and turn every action failure (error or panic) into an
//! [`ActionFailure`] delivered to that action's `handle_failure`.

pub mod action_item;
mod consumer;
mod execution;
pub mod fire_and_forget;
pub mod generic_action_item;
pub mod metrics;
pub mod polling;
pub mod shared;

pub use action_item::{ActionFailure, ActionItem};
pub use fire_and_forget::FireAndForgetQueue;
pub use generic_action_item::GenericActionItem;
pub use metrics::{PollingMetrics, QueueMetrics};
pub use polling::{PollingActionId, PollingHandler};
pub use shared::SharedQueueExecutor;
