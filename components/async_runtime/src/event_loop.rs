//! Host event loop.
//!
//! This module provides the single-threaded loop that delivers fetch
//! completions and page events to the loader, and collects errors raised
//! from callbacks that have no caller to return to.

use crate::task_queue::{Task, TaskQueue};
use core_types::LoaderError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Shared {
    tasks: RefCell<TaskQueue>,
    uncaught: RefCell<VecDeque<LoaderError>>,
}

/// The host event loop.
///
/// Each turn takes the oldest task and runs it. Tasks may enqueue further
/// tasks while running, so the loop is a shared handle: clones enqueue into
/// the same queue.
///
/// Errors reported with [`EventLoop::report_uncaught`] stop
/// [`EventLoop::run_until_done`] after the current task, the way an uncaught
/// exception surfaces from a browser's task loop.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Task};
///
/// let event_loop = EventLoop::new();
/// event_loop.enqueue_task(Task::new(|| Ok(())));
/// event_loop.run_until_done().unwrap();
/// assert!(event_loop.is_task_queue_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLoop {
    shared: Rc<Shared>,
}

impl EventLoop {
    /// Creates a new EventLoop with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs tasks until the queue is empty.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all tasks completed, or the first task error or uncaught
    /// error. Remaining tasks stay queued.
    pub fn run_until_done(&self) -> Result<(), LoaderError> {
        while self.process_one_cycle()? {}
        Ok(())
    }

    /// Runs one task, if any.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a task ran, `Ok(false)` if the queue was empty.
    pub fn process_one_cycle(&self) -> Result<bool, LoaderError> {
        if let Some(error) = self.take_uncaught() {
            return Err(error);
        }

        // The borrow must end before the task runs: tasks enqueue more tasks.
        let next = self.shared.tasks.borrow_mut().dequeue();
        let Some(task) = next else {
            return Ok(false);
        };
        task.run()?;

        match self.take_uncaught() {
            Some(error) => Err(error),
            None => Ok(true),
        }
    }

    /// Adds a task to the task queue.
    pub fn enqueue_task(&self, task: Task) {
        self.shared.tasks.borrow_mut().enqueue(task);
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.shared.tasks.borrow().is_empty()
    }

    /// Returns the number of queued tasks.
    pub fn pending_tasks(&self) -> usize {
        self.shared.tasks.borrow().len()
    }

    /// Raises an error that has no caller to propagate to.
    pub fn report_uncaught(&self, error: LoaderError) {
        tracing::error!(%error, "uncaught loader error");
        self.shared.uncaught.borrow_mut().push_back(error);
    }

    /// Takes the oldest uncaught error.
    pub fn take_uncaught(&self) -> Option<LoaderError> {
        self.shared.uncaught.borrow_mut().pop_front()
    }

    /// Returns true if an uncaught error is waiting.
    pub fn has_uncaught(&self) -> bool {
        !self.shared.uncaught.borrow().is_empty()
    }
}
