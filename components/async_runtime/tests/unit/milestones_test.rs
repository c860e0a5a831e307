//! Unit tests for PageMilestones

use async_runtime::PageMilestones;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn callbacks_wait_for_their_milestone() {
    let page = PageMilestones::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    page.on_load(move |_| l.borrow_mut().push("load"));
    let l = log.clone();
    page.on_ready(move |_| l.borrow_mut().push("ready"));
    assert!(log.borrow().is_empty());

    page.fire_dom_ready();
    assert_eq!(*log.borrow(), vec!["ready"]);

    page.fire_window_load();
    assert_eq!(*log.borrow(), vec!["ready", "load"]);
}

#[test]
fn window_load_fires_dom_ready_first() {
    let page = PageMilestones::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let l = log.clone();
    page.on_ready(move |_| l.borrow_mut().push("ready"));
    let l = log.clone();
    page.on_load(move |_| l.borrow_mut().push("load"));

    page.fire_window_load();
    assert_eq!(*log.borrow(), vec!["ready", "load"]);
}

#[test]
fn late_registration_runs_immediately() {
    let page = PageMilestones::complete();
    let hit = Rc::new(RefCell::new(false));
    let h = hit.clone();
    page.on_load(move |_| *h.borrow_mut() = true);
    assert!(*hit.borrow());
    assert!(page.window_load().is_fulfilled());
}
