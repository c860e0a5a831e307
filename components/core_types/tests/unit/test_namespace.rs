//! Unit tests for Namespace

use core_types::{Namespace, Value};

#[test]
fn test_resolve_missing_path() {
    let root = Namespace::new();
    assert!(root.resolve("qb.cookie").is_none());
    assert!(root.is_empty());
}

#[test]
fn test_set_then_resolve() {
    let root = Namespace::new();
    root.set("qb.cookie", Value::from("cookie module"));
    assert_eq!(
        root.resolve("qb.cookie"),
        Some(Value::from("cookie module"))
    );
    assert_eq!(root.keys(), vec!["qb".to_string()]);
}

#[test]
fn test_ensure_is_stable() {
    let root = Namespace::new();
    let first = root.ensure("widgets.grid");
    let second = root.ensure("widgets.grid");
    assert_eq!(first, second);
}

#[test]
fn test_handles_share_state() {
    let root = Namespace::new();
    let alias = root.clone();
    alias.insert("document", Value::Boolean(true));
    assert_eq!(root.get("document"), Some(Value::Boolean(true)));
}

#[test]
fn test_resolve_through_non_object_fails() {
    let root = Namespace::new();
    root.set("a", Value::Number(1.0));
    assert!(root.resolve("a.b").is_none());
}

#[test]
fn test_ensure_does_not_overwrite_string_member() {
    let root = Namespace::new();
    root.set("app.version", Value::from("1.0"));

    assert_eq!(root.ensure("app.version.major"), Value::Undefined);
    assert_eq!(root.resolve("app.version"), Some(Value::from("1.0")));
}

#[test]
fn test_ensure_fills_null_member() {
    let root = Namespace::new();
    root.set("app.widgets", Value::Null);

    let grid = root.ensure("app.widgets.grid");
    assert!(grid.as_object().is_some());
    assert_eq!(root.resolve("app.widgets.grid"), Some(grid));
}
