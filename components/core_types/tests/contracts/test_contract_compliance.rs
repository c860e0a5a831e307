//! Contract compliance tests for core_types
//!
//! These tests verify the surface the runtime and the loader rely on.

use core_types::{LoadFailure, LoaderError, LoaderResult, Namespace, Value};

mod value_contract_tests {
    use super::*;

    /// Contract: values carry arbitrary host objects
    #[test]
    fn test_value_carries_native_objects() {
        let value = Value::native(LoadFailure::new("404"));
        assert_eq!(
            value.downcast_ref::<LoadFailure>(),
            Some(&LoadFailure::new("404"))
        );
        assert!(value.downcast_ref::<String>().is_none());
    }

    /// Contract: values are cheap to clone and share native objects
    #[test]
    fn test_native_clone_shares_object() {
        let value = Value::native(vec![1u8, 2, 3]);
        let copy = value.clone();
        assert_eq!(value, copy);
    }

    /// Contract: objects compare by identity
    #[test]
    fn test_objects_compare_by_identity() {
        let ns = Namespace::new();
        assert_eq!(Value::Object(ns.clone()), Value::Object(ns));
        assert_ne!(
            Value::Object(Namespace::new()),
            Value::Object(Namespace::new())
        );
    }
}

mod namespace_contract_tests {
    use super::*;

    /// Contract: ensure is get-or-create and never overwrites
    #[test]
    fn test_ensure_is_get_or_create() {
        let window = Namespace::new();
        window.set("lib.version", Value::from("1.2"));

        assert_eq!(window.ensure("lib.version"), Value::from("1.2"));
        let created = window.ensure("lib.plugins");
        assert!(created.as_object().unwrap().is_empty());
        assert_eq!(window.resolve("lib.plugins"), Some(created));
    }

    /// Contract: clones share one tree
    #[test]
    fn test_clones_share_tree() {
        let window = Namespace::new();
        let alias = window.clone();
        alias.set("a", Value::Null);
        assert_eq!(window.get("a"), Some(Value::Null));
    }
}

mod error_contract_tests {
    use super::*;

    fn fails() -> LoaderResult<()> {
        Err(LoaderError::UnknownModule("widgets".to_string()))
    }

    /// Contract: LoaderResult works with ?
    #[test]
    fn test_result_alias_propagates() {
        fn outer() -> LoaderResult<u8> {
            fails()?;
            Ok(1)
        }
        assert!(matches!(outer(), Err(LoaderError::UnknownModule(_))));
    }

    /// Contract: errors are Clone and implement std::error::Error
    #[test]
    fn test_error_traits() {
        fn assert_error<E: std::error::Error + Clone>(_: &E) {}
        let error = LoaderError::Config("bad".to_string());
        assert_error(&error);
        assert_eq!(error.clone().to_string(), error.to_string());
    }

    /// Contract: failures serialize to plain fields
    #[test]
    fn test_failure_fields() {
        let failure = LoadFailure::new("boom").at("a.js", 4);
        assert_eq!(failure.message.as_deref(), Some("boom"));
        assert_eq!(failure.file.as_deref(), Some("a.js"));
        assert_eq!(failure.line, Some(4));
    }
}
