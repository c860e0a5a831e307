//! Page Lifecycle Integration Tests
//!
//! The loader against page milestones, resources already on the page,
//! reloads and progress reporting.

use async_runtime::Task;
use integration_tests::Page;
use resource_loader::{LoaderConfig, Outcome, ProgressEvent, RequireOptions};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Test: {ready} and {load} wait for the matching milestones
#[test]
fn test_milestones_gate_exports() {
    let page = Page::open(LoaderConfig::default());

    let on_ready = page
        .loader
        .require("a", RequireOptions::new().exports("|{ready}"))
        .unwrap();
    let on_load = page
        .loader
        .require("b", RequireOptions::new().exports("{load}"))
        .unwrap();
    let immediate = page.loader.require("c", RequireOptions::new()).unwrap();

    let milestones = page.milestones.clone();
    page.event_loop.enqueue_task(Task::new(move || {
        milestones.fire_dom_ready();
        Ok(())
    }));
    assert!(page.settle().is_empty());

    assert!(immediate.is_fulfilled());
    assert!(on_ready.is_fulfilled());
    assert!(on_load.is_pending());

    page.milestones.fire_window_load();
    assert!(on_load.is_fulfilled());
}

/// Test: scripts already on the page satisfy requests without fetching
#[test]
fn test_page_resources_are_adopted() {
    let page = Page::open(LoaderConfig::default());
    page.milestones.fire_window_load();
    page.transport
        .add_page_resource(Page::js("libs/jquery"))
        .add_page_resource("http://localhost/styles/site.css");

    let request = page
        .loader
        .require("!libs/jquery; /styles/site.css; app", RequireOptions::new())
        .unwrap();
    assert!(page.settle().is_empty());

    assert!(request.is_fulfilled());
    assert_eq!(page.transport.fetched(), vec![Page::js("app")]);
    assert_eq!(page.loader.registry().len(), 3);
}

/// Test: {reload} fetches a loaded script again and reruns it
#[test]
fn test_reload_reruns_scripts() {
    let page = Page::open(LoaderConfig::default());
    page.milestones.fire_window_load();

    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    page.transport.on_execute(Page::js("config"), move || {
        counter.set(counter.get() + 1);
        Ok(())
    });

    page.loader.require("config", RequireOptions::new()).unwrap();
    page.settle();
    page.loader
        .require("config", RequireOptions::new().exports("{reload}"))
        .unwrap();
    page.settle();
    page.loader.require("config", RequireOptions::new()).unwrap();
    page.settle();

    assert_eq!(runs.get(), 2);
    assert_eq!(page.transport.discarded(), vec![Page::js("config")]);
}

/// Test: progress spans overlapping requests as one batch
#[test]
fn test_progress_across_requests() {
    let page = Page::open(LoaderConfig::default());
    page.milestones.fire_window_load();
    page.transport.script(Page::js("slow"), Outcome::Hold);

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    page.loader.on_progress(move |e| sink.borrow_mut().push(*e));

    page.loader.require("slow", RequireOptions::new()).unwrap();
    page.loader.require("fast", RequireOptions::new()).unwrap();
    page.settle();
    assert_eq!(page.loader.progress().total(), 2);
    assert_eq!(page.loader.progress().loaded(), 1);

    page.transport.release(&Page::js("slow"));
    page.settle();

    assert_eq!(events.borrow().last(), Some(&ProgressEvent::Finish { total: 2 }));
    assert_eq!(page.loader.progress().total(), 0);
}

/// Test: the all-settled hook fires once, after the last request
#[test]
fn test_all_settled_hook() {
    let page = Page::open(LoaderConfig::default());
    page.milestones.fire_window_load();
    page.transport.set_default_outcome(Outcome::Hold);

    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    page.loader.on_all_settled(move || counter.set(counter.get() + 1));

    page.loader.require("a; b", RequireOptions::new()).unwrap();
    page.loader.require("!b; c", RequireOptions::new()).unwrap();
    assert_eq!(page.loader.pending_requests(), 2);

    for name in ["a", "b"] {
        page.transport.release(&Page::js(name));
    }
    page.settle();
    assert_eq!(fired.get(), 0);

    page.transport.release(&Page::js("c"));
    page.settle();
    assert_eq!(fired.get(), 1);

    page.transport.set_default_outcome(Outcome::Succeed);
    page.loader.require("d", RequireOptions::new()).unwrap();
    page.settle();
    assert_eq!(fired.get(), 1);
    assert_eq!(page.loader.pending_requests(), 0);
}
