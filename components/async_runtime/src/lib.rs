//! Async runtime for the Corten asset loader.
//!
//! This crate provides the asynchronous building blocks the loader runs on:
//! - Single-assignment promises with aggregation
//! - A host event loop delivering fetch completions as tasks
//! - Page milestones (DOM ready, window load)
//!
//! # Overview
//!
//! - [`Promise`] - Settles once; queues callbacks until then
//! - [`Promise::when`] - Aggregates promises and ready values
//! - [`EventLoop`] - Runs host tasks and surfaces uncaught errors
//! - [`PageMilestones`] - One-shot page events
//!
//! # Examples
//!
//! ## Event Loop Usage
//!
//! ```
//! use async_runtime::{EventLoop, Task};
//!
//! let event_loop = EventLoop::new();
//! event_loop.enqueue_task(Task::new(|| Ok(())));
//! event_loop.run_until_done().unwrap();
//! ```
//!
//! ## Promise Usage
//!
//! ```
//! use async_runtime::{Promise, PromiseState};
//! use core_types::Value;
//!
//! let promise = Promise::new();
//! promise.resolve(vec![Value::Number(42.0)]);
//! assert_eq!(promise.state(), PromiseState::Fulfilled);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event_loop;
pub mod milestones;
pub mod promise;
pub mod task_queue;

// Re-export main types at crate root
pub use event_loop::EventLoop;
pub use milestones::PageMilestones;
pub use promise::{Awaited, Callback, Promise, PromiseState, Settleable, Settlement, Transform};
pub use task_queue::{Task, TaskQueue};
