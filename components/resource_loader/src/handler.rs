//! Tier handler.
//!
//! A [`Handler`] waits for every resource of one tier, then resolves with
//! the values named by the tier's export string.

use crate::loader::LoaderState;
use crate::request::{ExportFlags, ExportSpec};
use crate::resource::LoadingResource;
use async_runtime::{Promise, Settleable, Settlement};
use core_types::{LoadFailure, LoaderError, Value};
use std::rc::{Rc, Weak};

struct Inner {
    resources: Vec<LoadingResource>,
    exports: Option<ExportSpec>,
    promise: Promise,
}

/// Aggregates one tier.
///
/// Resolves with one value per export path once all resources loaded and
/// the requested page milestone passed. Rejects with
/// `(failing resource, failure)` as soon as one resource fails; the failure
/// is also raised on the host event loop.
#[derive(Clone)]
pub struct Handler {
    inner: Rc<Inner>,
}

impl Handler {
    pub(crate) fn new(
        state: &Rc<LoaderState>,
        resources: Vec<LoadingResource>,
        exports: Option<ExportSpec>,
    ) -> Self {
        let handler = Self {
            inner: Rc::new(Inner {
                resources,
                exports,
                promise: Promise::new(),
            }),
        };

        let all = Promise::when(handler.inner.resources.iter().map(Settleable::awaited));

        let (this, env) = (handler.clone(), Rc::downgrade(state));
        all.done(move |_| this.handle_load(&env));
        let (this, env) = (handler.clone(), Rc::downgrade(state));
        all.fail(move |s| this.handle_load_error(&env, &s.args));

        handler
    }

    /// Starts fetching every resource of the tier.
    pub fn load(&self) {
        for resource in &self.inner.resources {
            resource.load();
        }
    }

    /// Resources of the tier.
    pub fn resources(&self) -> &[LoadingResource] {
        &self.inner.resources
    }

    /// Export flags, all unset when the tier has no export string.
    pub fn flags(&self) -> ExportFlags {
        self.inner
            .exports
            .as_ref()
            .map(|spec| spec.flags)
            .unwrap_or_default()
    }

    fn handle_load(&self, env: &Weak<LoaderState>) {
        let flags = self.flags();
        if !flags.load && !flags.ready {
            self.resolve_exports(env);
            return;
        }
        let Some(state) = env.upgrade() else {
            return;
        };

        let (this, env) = (self.clone(), env.clone());
        let proceed = move |_: &Settlement| this.resolve_exports(&env);
        if flags.load {
            state.milestones.on_load(proceed);
        } else {
            state.milestones.on_ready(proceed);
        }
    }

    fn resolve_exports(&self, env: &Weak<LoaderState>) {
        let Some(state) = env.upgrade() else {
            return;
        };
        let paths = match &self.inner.exports {
            Some(spec) => state.parser.borrow().export_paths(spec),
            None => Ok(Vec::new()),
        };

        match paths {
            Ok(paths) => {
                let values = paths.iter().map(|p| state.namespace.ensure(p)).collect();
                self.inner.promise.resolve(values);
            }
            Err(error) => {
                self.inner.promise.reject(vec![Value::native(error.clone())]);
                state.event_loop.report_uncaught(error);
            }
        }
    }

    fn handle_load_error(&self, env: &Weak<LoaderState>, args: &[Value]) {
        self.inner.promise.reject(args.to_vec());

        let url = args
            .first()
            .and_then(|v| v.downcast_ref::<LoadingResource>())
            .map(|r| r.url().to_string())
            .unwrap_or_default();
        let failure = args
            .get(1)
            .and_then(|v| v.downcast_ref::<LoadFailure>())
            .cloned()
            .unwrap_or_default();

        let error = LoaderError::ResourceLoad { url, failure };
        if let Some(state) = env.upgrade() {
            state.event_loop.report_uncaught(error);
        }
    }
}

impl Settleable for Handler {
    fn promise(&self) -> &Promise {
        &self.inner.promise
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("resources", &self.inner.resources)
            .field("exports", &self.inner.exports)
            .field("state", &self.inner.promise.state())
            .finish()
    }
}
