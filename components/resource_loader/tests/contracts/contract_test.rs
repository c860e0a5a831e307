//! Contract tests for resource_loader component
//!
//! These tests pin the public surface hosts and the command-line tool use.

use async_runtime::EventLoop;
use core_types::{LoadFailure, LoaderError, Value};
use resource_loader::{
    Completion, FetchRequest, Loader, LoaderConfig, MemoryTransport, ProgressEvent, Query,
    RequireOptions, ResourceKind, Transport,
};
use std::cell::RefCell;
use std::rc::Rc;

mod config_contract {
    use super::*;

    #[test]
    fn config_reads_partial_json() {
        let config = LoaderConfig::from_json(
            r#"{ "root_url": "/assets/", "query_shortcuts": { "core": "libs/core-3" } }"#,
        )
        .unwrap();
        assert_eq!(config.root_url, "/assets/");
        assert_eq!(config.segment_delimiter, "; ");
        assert_eq!(config.query_shortcuts["core"], "libs/core-3");
    }

    #[test]
    fn config_rejects_malformed_json() {
        let err = LoaderConfig::from_json("{ root_url: ").unwrap_err();
        assert!(matches!(err, LoaderError::Config(_)));
    }

    #[test]
    fn configured_aliases_apply_to_requests() {
        let config = LoaderConfig::from_json(r#"{ "query_shortcuts": { "core": "libs/core-3" } }"#)
            .unwrap();
        let loader = Loader::builder(config)
            .transport(Rc::new(MemoryTransport::new(EventLoop::new())))
            .build()
            .unwrap();
        let plan = loader.plan("core").unwrap();
        assert_eq!(
            plan.tiers[0].urls(),
            vec!["http://localhost/static/js/libs/core-3.js"]
        );
    }
}

mod plan_contract {
    use super::*;

    #[test]
    fn plan_serializes_to_json() {
        let loader = Loader::builder(LoaderConfig::default())
            .transport(Rc::new(MemoryTransport::new(EventLoop::new())))
            .build()
            .unwrap();
        let plan = loader.plan(Query::from(vec!["!a", "b.css"])).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["tiers"][0]["priority"], 1);
        assert_eq!(json["tiers"][0]["resources"][0]["kind"], "script");
        assert_eq!(json["tiers"][1]["priority"], serde_json::Value::Null);
        assert_eq!(json["tiers"][1]["resources"][0]["kind"], "stylesheet");
    }

    #[test]
    fn progress_events_are_tagged() {
        let json = serde_json::to_value(ProgressEvent::Step { loaded: 1, total: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "step", "loaded": 1, "total": 3 }));
    }
}

mod transport_contract {
    use super::*;

    /// Answers every fetch synchronously, failing stylesheets.
    #[derive(Default)]
    struct Immediate {
        seen: RefCell<Vec<FetchRequest>>,
    }

    impl Transport for Immediate {
        fn fetch(&self, request: FetchRequest, completion: Completion) {
            let kind = request.kind;
            self.seen.borrow_mut().push(request);
            match kind {
                ResourceKind::Script => completion.succeed(),
                ResourceKind::Stylesheet => completion.fail(LoadFailure::new("blocked")),
            }
        }
    }

    #[test]
    fn custom_transport_drives_the_loader() {
        let transport = Rc::new(Immediate::default());
        let event_loop = EventLoop::new();
        let loader = Loader::builder(LoaderConfig::default())
            .transport(transport.clone())
            .event_loop(event_loop.clone())
            .build()
            .unwrap();

        let ok = loader.require("a", RequireOptions::new()).unwrap();
        assert!(ok.is_fulfilled());

        let blocked = loader.require("/theme.css", RequireOptions::new()).unwrap();
        assert!(blocked.is_rejected());
        assert!(matches!(
            event_loop.run_until_done(),
            Err(LoaderError::ResourceLoad { .. })
        ));

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].kind, ResourceKind::Stylesheet);
    }
}

mod require_contract {
    use super::*;

    #[test]
    fn require_accepts_text_and_parts() {
        let event_loop = EventLoop::new();
        let transport = MemoryTransport::new(event_loop.clone());
        let loader = Loader::builder(LoaderConfig::default())
            .transport(Rc::new(transport.clone()))
            .event_loop(event_loop.clone())
            .build()
            .unwrap();

        loader.require("a; b", RequireOptions::new()).unwrap();
        loader
            .require(vec!["c".to_string()], RequireOptions::new())
            .unwrap();
        event_loop.run_until_done().unwrap();
        assert_eq!(transport.fetched().len(), 3);
    }

    #[test]
    fn callback_receives_export_values_in_order() {
        let event_loop = EventLoop::new();
        let loader = Loader::builder(LoaderConfig::default())
            .transport(Rc::new(MemoryTransport::new(event_loop.clone())))
            .event_loop(event_loop.clone())
            .build()
            .unwrap();
        loader.namespace().set("a.x", Value::Number(1.0));
        loader.namespace().set("a.y", Value::Number(2.0));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        loader
            .require(
                "",
                RequireOptions::new()
                    .exports("a: y,x")
                    .callback(move |values| sink.borrow_mut().extend_from_slice(values)),
            )
            .unwrap();
        assert_eq!(*seen.borrow(), vec![Value::Number(2.0), Value::Number(1.0)]);
    }
}
