//! Per-resource load state machine.
//!
//! A [`LoadingResource`] is created `Unloaded`, moves to `Loading` when its
//! fetch starts and to `Loaded` or `LoadError` when the transport reports
//! back. Its promise settles at the same moment.

use crate::progress::Progress;
use crate::request::ResourceKind;
use crate::transport::{FetchRequest, Transport};
use async_runtime::{Promise, Settleable};
use core_types::{LoadFailure, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Where a resource is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Not fetched yet
    Unloaded,
    /// Fetch in flight
    Loading,
    /// Fetched successfully
    Loaded,
    /// Fetch failed
    LoadError,
}

struct Inner {
    url: String,
    kind: ResourceKind,
    state: Cell<ResourceState>,
    deferred: Cell<bool>,
    failure: RefCell<Option<LoadFailure>>,
    promise: Promise,
    transport: Rc<dyn Transport>,
    progress: Progress,
}

/// One script or stylesheet, shared by every request that names its URL.
///
/// On success the promise resolves with the resource itself as context and
/// sole argument; on failure it rejects with the [`LoadFailure`], wrapped as
/// a native value, with the resource as context.
#[derive(Clone)]
pub struct LoadingResource {
    inner: Rc<Inner>,
}

impl LoadingResource {
    /// Creates an unloaded resource.
    pub fn new(
        url: impl Into<String>,
        kind: ResourceKind,
        transport: Rc<dyn Transport>,
        progress: Progress,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                url: url.into(),
                kind,
                state: Cell::new(ResourceState::Unloaded),
                deferred: Cell::new(false),
                failure: RefCell::new(None),
                promise: Promise::new(),
                transport,
                progress,
            }),
        }
    }

    /// Absolute URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Script or stylesheet.
    pub fn kind(&self) -> ResourceKind {
        self.inner.kind
    }

    /// Current lifecycle state.
    pub fn load_state(&self) -> ResourceState {
        self.inner.state.get()
    }

    /// The diagnostic of a failed fetch.
    pub fn failure(&self) -> Option<LoadFailure> {
        self.inner.failure.borrow().clone()
    }

    /// Returns true if both handles refer to the same resource.
    pub fn ptr_eq(&self, other: &LoadingResource) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Starts the fetch. Does nothing unless the resource is unloaded.
    pub fn load(&self) {
        if self.load_state() != ResourceState::Unloaded {
            return;
        }
        self.inner.state.set(ResourceState::Loading);
        self.inner.progress.started();
        tracing::debug!(url = %self.url(), kind = %self.kind(), "fetch started");

        let request = FetchRequest {
            url: self.inner.url.clone(),
            kind: self.inner.kind,
        };
        self.inner
            .transport
            .fetch(request, Completion { resource: self.clone() });
    }

    /// Marks a resource found on the page as loaded, without fetching.
    pub fn adopt(&self) {
        if self.load_state() == ResourceState::Unloaded {
            self.inner.state.set(ResourceState::Loaded);
            self.settle_loaded();
        }
    }

    /// Ignores the transport's success signal from now on.
    ///
    /// A script that declares itself as a module completes through its own
    /// request chain instead; see [`LoadingResource::complete`]. Failures are
    /// still reported.
    pub fn defer_completion(&self) {
        self.inner.deferred.set(true);
    }

    /// Returns true if the success signal is being ignored.
    pub fn is_deferred(&self) -> bool {
        self.inner.deferred.get()
    }

    /// Marks the resource loaded and resolves its promise.
    pub fn complete(&self) {
        match self.load_state() {
            ResourceState::Loaded | ResourceState::LoadError => {}
            ResourceState::Loading => {
                self.inner.progress.finished();
                self.inner.state.set(ResourceState::Loaded);
                self.settle_loaded();
            }
            ResourceState::Unloaded => {
                self.inner.state.set(ResourceState::Loaded);
                self.settle_loaded();
            }
        }
    }

    /// Marks the fetch failed and rejects the promise with `failure`.
    pub fn fail(&self, failure: LoadFailure) {
        if matches!(
            self.load_state(),
            ResourceState::Loaded | ResourceState::LoadError
        ) {
            return;
        }
        let was_loading = self.load_state() == ResourceState::Loading;
        self.inner.state.set(ResourceState::LoadError);
        *self.inner.failure.borrow_mut() = Some(failure.clone());
        if was_loading {
            self.inner.progress.finished();
        }
        tracing::error!(url = %self.url(), %failure, "resource failed to load");
        self.inner
            .promise
            .reject_with(Value::native(self.clone()), vec![Value::native(failure)]);
    }

    /// Detaches the fetched artifact from the host.
    pub fn destroy(&self) {
        self.inner.transport.discard(&self.inner.url);
    }

    fn succeed(&self) {
        if self.is_deferred() {
            tracing::debug!(url = %self.url(), "success deferred to module");
            return;
        }
        self.complete();
    }

    fn settle_loaded(&self) {
        let this = Value::native(self.clone());
        self.inner.promise.resolve_with(this.clone(), vec![this]);
    }
}

impl Settleable for LoadingResource {
    fn promise(&self) -> &Promise {
        &self.inner.promise
    }

    fn resolve(&self, _args: Vec<Value>) {
        self.complete();
    }

    fn reject(&self, args: Vec<Value>) {
        let failure = args
            .first()
            .and_then(|v| v.downcast_ref::<LoadFailure>())
            .cloned()
            .unwrap_or_default();
        self.fail(failure);
    }
}

impl fmt::Debug for LoadingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingResource")
            .field("url", &self.inner.url)
            .field("kind", &self.inner.kind)
            .field("state", &self.inner.state.get())
            .finish()
    }
}

impl fmt::Display for LoadingResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            ResourceKind::Script => write!(f, "Script [{}]", self.inner.url),
            ResourceKind::Stylesheet => write!(f, "Stylesheet [{}]", self.inner.url),
        }
    }
}

/// The transport's one-shot answer to a fetch.
///
/// Consuming the token is the only way to report, so a resource hears back
/// at most once per fetch.
#[must_use = "a fetch never settles unless its completion is used"]
pub struct Completion {
    resource: LoadingResource,
}

impl Completion {
    /// URL being fetched.
    pub fn url(&self) -> &str {
        self.resource.url()
    }

    /// Reports a successful fetch.
    pub fn succeed(self) {
        self.resource.succeed();
    }

    /// Reports a failed fetch.
    pub fn fail(self, failure: LoadFailure) {
        self.resource.fail(failure);
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("url", &self.resource.url())
            .finish()
    }
}
