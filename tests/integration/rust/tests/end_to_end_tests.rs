//! End-to-End Loader Tests
//!
//! Requests flow through alias expansion, parsing, the registry, tier
//! handlers and the in-memory transport:
//! - Nested module requests completing before later tiers
//! - Shared resources across concurrent requests
//! - Export resolution and piping of results
//! - Failure isolation between requests

use async_runtime::Promise;
use core_types::{LoadFailure, Value};
use integration_tests::Page;
use resource_loader::{LoaderConfig, Outcome, RequireOptions, ResourceState};
use std::cell::RefCell;
use std::rc::Rc;

fn page() -> Page {
    let page = Page::open(LoaderConfig::default());
    page.milestones.fire_window_load();
    page
}

/// Test: a module's nested request finishes before the next tier starts
#[test]
fn test_e2e_nested_module_request() {
    let page = page();
    let log = Rc::new(RefCell::new(Vec::new()));

    let (loader, entries) = (page.loader.clone(), log.clone());
    page.transport.on_execute(Page::js("a"), move || {
        entries.borrow_mut().push("a runs");
        let done = entries.clone();
        loader.require(
            "c",
            RequireOptions::new()
                .module("a")
                .callback(move |_| done.borrow_mut().push("c loaded")),
        )?;
        Ok(())
    });
    let entries = log.clone();
    page.transport.on_execute(Page::js("b"), move || {
        entries.borrow_mut().push("b runs");
        Ok(())
    });

    let entries = log.clone();
    let request = page
        .loader
        .require(
            "{1}a; {2}b",
            RequireOptions::new().callback(move |_| entries.borrow_mut().push("all loaded")),
        )
        .unwrap();

    assert!(page.settle().is_empty());
    assert!(request.is_fulfilled());
    assert_eq!(
        *log.borrow(),
        vec!["a runs", "c loaded", "b runs", "all loaded"]
    );
    for name in ["a", "b", "c"] {
        let resource = page.loader.resource(&Page::js(name)).unwrap();
        assert_eq!(resource.load_state(), ResourceState::Loaded, "{}", name);
    }
}

/// Test: a library required by two widgets is fetched once
#[test]
fn test_e2e_shared_dependency() {
    let page = page();
    page.loader
        .add_query_shortcuts([("lib", "libs/jquery"), ("ui", "app/widgets")]);

    let first = page
        .loader
        .require("!lib; ui: grid", RequireOptions::new())
        .unwrap();
    let second = page
        .loader
        .require("!lib; ui: form", RequireOptions::new())
        .unwrap();

    assert!(page.settle().is_empty());
    assert!(first.is_fulfilled() && second.is_fulfilled());
    assert_eq!(page.transport.fetch_count(&Page::js("libs/jquery")), 1);
    assert_eq!(
        page.transport.fetched(),
        vec![
            Page::js("libs/jquery"),
            Page::js("app/widgets/grid"),
            Page::js("app/widgets/form"),
        ]
    );
}

/// Test: exports defined by the loaded scripts, transformed with pipe
#[test]
fn test_e2e_exports_and_pipe() {
    let page = page();
    page.loader.add_export_shortcuts([("w", "app.widgets")]);

    let ns = page.loader.namespace().clone();
    page.transport.on_execute(Page::js("app/widgets"), move || {
        ns.set("app.widgets.Grid", Value::from("Grid"));
        ns.set("app.widgets.Form", Value::from("Form"));
        Ok(())
    });

    let request = page
        .loader
        .require("app/widgets", RequireOptions::new().exports("w: Form, Grid"))
        .unwrap();
    let names = request.pipe(
        Some(Box::new(|args: &[Value]| {
            let joined: Vec<String> = args.iter().map(ToString::to_string).collect();
            vec![Value::from(joined.join("+"))]
        })),
        None,
    );

    assert!(page.settle().is_empty());
    assert_eq!(names.args(), Some(vec![Value::from("Form+Grid")]));
}

/// Test: one failing request leaves a concurrent one alone
#[test]
fn test_e2e_failure_isolation() {
    let page = page();
    page.transport.script(
        Page::js("broken"),
        Outcome::Fail(LoadFailure::new("Unexpected token").at("broken.js", 3)),
    );

    let failing = page.loader.require("broken; x", RequireOptions::new()).unwrap();
    let healthy = page.loader.require("y", RequireOptions::new()).unwrap();
    let both = Promise::when([&failing, &healthy]);

    let errors = page.settle();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Error in line 3: \"Unexpected token\""));

    assert!(failing.is_rejected());
    assert!(healthy.is_fulfilled());
    assert!(both.is_rejected());
    assert!(page.loader.all_settled().is_fulfilled());
}

/// Test: a shortcut cycle is reported without touching the network
#[test]
fn test_e2e_shortcut_cycle() {
    let page = Page::open(
        LoaderConfig::default()
            .with_query_shortcut("front", "{back}")
            .with_query_shortcut("back", "{front}"),
    );

    let err = page.loader.require("front", RequireOptions::new()).unwrap_err();
    let message = err.to_string();

    assert!(message.contains("front => {back}"));
    assert!(message.contains("back => {front}"));
    assert!(page.transport.fetched().is_empty());
}
