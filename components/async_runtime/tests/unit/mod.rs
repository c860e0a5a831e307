//! Unit test runner for async_runtime

mod event_loop_test;
mod milestones_test;
