//! Script and stylesheet loader for the Corten asset loader.
//!
//! This crate turns request strings into ordered fetches:
//! - Alias expansion ([`ShortcutTable`])
//! - Request and export parsing ([`RequestParser`])
//! - Deduplicated per-URL load state ([`ResourceRegistry`], [`LoadingResource`])
//! - Tier aggregation and export resolution ([`Handler`])
//! - Sequencing of tiers and settlement tracking ([`Loader`])
//!
//! Fetching itself is delegated to a [`Transport`]. [`MemoryTransport`] is an
//! in-memory host driven by an [`async_runtime::EventLoop`].
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use core_types::Value;
//! use resource_loader::{Loader, LoaderConfig, MemoryTransport, RequireOptions};
//! use std::rc::Rc;
//!
//! let event_loop = EventLoop::new();
//! let transport = MemoryTransport::new(event_loop.clone());
//! let loader = Loader::builder(LoaderConfig::default().with_query_shortcut("ui", "app/widgets"))
//!     .transport(Rc::new(transport.clone()))
//!     .event_loop(event_loop.clone())
//!     .build()
//!     .unwrap();
//!
//! let namespace = loader.namespace().clone();
//! transport.on_execute("http://localhost/static/js/app/widgets/grid.js", move || {
//!     namespace.set("app.Grid", Value::from("grid"));
//!     Ok(())
//! });
//!
//! let request = loader
//!     .require("ui: grid", RequireOptions::new().exports("app.Grid"))
//!     .unwrap();
//! event_loop.run_until_done().unwrap();
//!
//! assert_eq!(request.args(), Some(vec![Value::from("grid")]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handler;
pub mod loader;
pub mod progress;
pub mod registry;
pub mod request;
pub mod resource;
pub mod shortcuts;
pub mod transport;

pub use config::{LoaderConfig, DEFAULT_EXPORT_SHORTCUTS, DEFAULT_QUERY_SHORTCUTS};
pub use handler::Handler;
pub use loader::{Loader, LoaderBuilder, RequireCallback, RequireOptions};
pub use progress::{Progress, ProgressEvent};
pub use registry::ResourceRegistry;
pub use request::{
    ExportFlags, ExportSpec, PlannedResource, Query, RequestParser, RequestPlan, ResourceKind, Tier,
};
pub use resource::{Completion, LoadingResource, ResourceState};
pub use shortcuts::{ShortcutTable, EXPORT_BOUNDARIES, MAX_DEPTH, QUERY_BOUNDARIES};
pub use transport::{FetchRequest, MemoryTransport, Outcome, ScriptBody, Transport};
