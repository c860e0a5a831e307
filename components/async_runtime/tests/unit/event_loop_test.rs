//! Unit tests for EventLoop

use async_runtime::{EventLoop, Task};
use core_types::LoaderError;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn new_event_loop_has_empty_task_queue() {
    let event_loop = EventLoop::new();
    assert!(event_loop.is_task_queue_empty());
    assert_eq!(event_loop.pending_tasks(), 0);
}

#[test]
fn enqueue_task_adds_to_task_queue() {
    let event_loop = EventLoop::new();
    event_loop.enqueue_task(Task::new(|| Ok(())));
    assert!(!event_loop.is_task_queue_empty());
}

#[test]
fn process_one_cycle_runs_a_single_task() {
    let event_loop = EventLoop::new();
    event_loop.enqueue_task(Task::new(|| Ok(())));
    event_loop.enqueue_task(Task::new(|| Ok(())));

    assert!(event_loop.process_one_cycle().unwrap());
    assert_eq!(event_loop.pending_tasks(), 1);
    assert!(event_loop.process_one_cycle().unwrap());
    assert!(!event_loop.process_one_cycle().unwrap());
}

#[test]
fn clones_share_the_queue() {
    let event_loop = EventLoop::new();
    let handle = event_loop.clone();
    handle.enqueue_task(Task::new(|| Ok(())));
    assert_eq!(event_loop.pending_tasks(), 1);
}

#[test]
fn task_error_stops_the_loop() {
    let event_loop = EventLoop::new();
    let ran = Rc::new(RefCell::new(Vec::new()));

    event_loop.enqueue_task(Task::new(|| Err(LoaderError::Task("first".to_string()))));
    let r = ran.clone();
    event_loop.enqueue_task(Task::new(move || {
        r.borrow_mut().push("second");
        Ok(())
    }));

    let err = event_loop.run_until_done().unwrap_err();
    assert!(err.to_string().contains("first"));
    assert!(ran.borrow().is_empty());
}

#[test]
fn uncaught_errors_surface_in_order() {
    let event_loop = EventLoop::new();
    event_loop.report_uncaught(LoaderError::Task("a".to_string()));
    event_loop.report_uncaught(LoaderError::Task("b".to_string()));
    assert!(event_loop.has_uncaught());

    assert!(event_loop.run_until_done().unwrap_err().to_string().contains("failed: a"));
    assert!(matches!(event_loop.take_uncaught(), Some(LoaderError::Task(m)) if m == "b"));
    assert!(event_loop.run_until_done().is_ok());
}
