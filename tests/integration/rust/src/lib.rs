//! Integration test suite for the Corten asset loader
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

use async_runtime::{EventLoop, PageMilestones};
use resource_loader::{Loader, LoaderConfig, MemoryTransport};
use std::rc::Rc;

/// Re-export components for test convenience
pub mod components {
    pub use async_runtime;
    pub use core_types;
    pub use loader_cli;
    pub use resource_loader;
}

/// A page: one loader on an in-memory transport and its event loop.
pub struct Page {
    /// The loader under test
    pub loader: Loader,
    /// Fetch log and scripted outcomes
    pub transport: MemoryTransport,
    /// Host event loop
    pub event_loop: EventLoop,
    /// Page milestones, not yet fired
    pub milestones: PageMilestones,
}

impl Page {
    /// Opens a page with `config` whose milestones have not fired yet.
    pub fn open(config: LoaderConfig) -> Self {
        let event_loop = EventLoop::new();
        let transport = MemoryTransport::new(event_loop.clone());
        let milestones = PageMilestones::new();
        let loader = Loader::builder(config)
            .transport(Rc::new(transport.clone()))
            .event_loop(event_loop.clone())
            .milestones(milestones.clone())
            .build()
            .expect("valid loader configuration");
        Self {
            loader,
            transport,
            event_loop,
            milestones,
        }
    }

    /// Absolute URL of script `name` under the default root.
    pub fn js(name: &str) -> String {
        format!("http://localhost/static/js/{}.js", name)
    }

    /// Runs the event loop until idle, collecting every error raised.
    pub fn settle(&self) -> Vec<String> {
        let mut errors = Vec::new();
        while let Err(error) = self.event_loop.run_until_done() {
            errors.push(error.to_string());
        }
        errors
    }
}
