//! Namespace tree addressed by dotted paths.
//!
//! Export strings name values such as `app.widgets.Grid`; after a tier has
//! loaded, each path is looked up here. Scripts (or the host standing in for
//! them) publish their values into the same tree.

use crate::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A shared, mutable object of named values.
///
/// Cloning a `Namespace` yields another handle to the same object.
///
/// # Examples
///
/// ```
/// use core_types::{Namespace, Value};
///
/// let global = Namespace::new();
/// global.set("app.version", Value::from("1.2"));
///
/// assert_eq!(global.resolve("app.version"), Some(Value::from("1.2")));
/// assert!(global.resolve("app.missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Namespace {
    entries: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the direct member `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    /// Sets the direct member `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.borrow_mut().insert(key.into(), value)
    }

    /// Returns the member names in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Returns true if the namespace has no members.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Looks up a dotted path without creating anything.
    ///
    /// Empty path segments are skipped, so `"a..b"` is the same as `"a.b"`.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let mut current = Value::Object(self.clone());
        for part in path.split('.').filter(|p| !p.is_empty()) {
            let next = current.as_object()?.get(part)?;
            current = next;
        }
        Some(current)
    }

    /// Looks up a dotted path, creating empty objects for missing segments.
    ///
    /// Only missing, undefined or null members are created. Anything else
    /// already stored is left untouched: an existing final member is returned
    /// as is, and a non-object member in the middle of the path makes the
    /// lookup yield [`Value::Undefined`].
    pub fn ensure(&self, path: &str) -> Value {
        let parts: Vec<&str> = path.split('.').filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return Value::Object(self.clone());
        };
        let mut current = self.clone();
        for part in parents {
            let next = match current.get_or_create(part) {
                Value::Object(ns) => ns,
                _ => return Value::Undefined,
            };
            current = next;
        }
        current.get_or_create(last)
    }

    fn get_or_create(&self, key: &str) -> Value {
        match self.get(key) {
            Some(Value::Undefined) | Some(Value::Null) | None => {
                let created = Value::Object(Namespace::new());
                self.insert(key, created.clone());
                created
            }
            Some(existing) => existing,
        }
    }

    /// Stores `value` at a dotted path, creating intermediate objects.
    pub fn set(&self, path: &str, value: Value) -> Value {
        let parts: Vec<&str> = path.split('.').filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return Value::Object(self.clone());
        };
        self.ensure_parents(parents).insert(*last, value.clone());
        value
    }

    /// Walks `parents`, replacing missing or non-object members with objects.
    fn ensure_parents(&self, parents: &[&str]) -> Namespace {
        let mut current = self.clone();
        for part in parents {
            let next = match current.get(part) {
                Some(Value::Object(ns)) => ns,
                _ => {
                    let ns = Namespace::new();
                    current.insert(*part, Value::Object(ns.clone()));
                    ns
                }
            };
            current = next;
        }
        current
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.borrow().keys()).finish()
    }
}
