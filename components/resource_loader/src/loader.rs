//! The loader: public entry point.
//!
//! [`Loader::require`] parses a request into tiers and loads them one after
//! another. Tier `i + 1` is not even built until tier `i` has loaded, so a
//! script in an early tier may extend the registry (or issue requests of its
//! own) before later tiers are resolved.

use crate::config::LoaderConfig;
use crate::handler::Handler;
use crate::progress::{Progress, ProgressEvent};
use crate::request::{ExportSpec, Query, RequestParser, RequestPlan, Tier};
use crate::registry::ResourceRegistry;
use crate::resource::LoadingResource;
use crate::transport::Transport;
use async_runtime::{EventLoop, PageMilestones, Promise, Settleable};
use core_types::{LoaderError, LoaderResult, Namespace, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Callback run with the export values once a request loaded.
pub type RequireCallback = Box<dyn FnOnce(&[Value])>;

/// Options of one [`Loader::require`] call.
///
/// # Examples
///
/// ```
/// use resource_loader::RequireOptions;
///
/// let options = RequireOptions::new()
///     .exports("app.grid|{ready}")
///     .callback(|values| assert_eq!(values.len(), 1));
/// assert!(options.module.is_none());
/// ```
#[derive(Default)]
pub struct RequireOptions {
    /// Export string resolved after the last tier
    pub exports: Option<String>,
    /// Run with the export values on success
    pub callback: Option<RequireCallback>,
    /// Name of the module issuing the request; its own script completes
    /// when this request does
    pub module: Option<String>,
}

impl RequireOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the export string.
    pub fn exports(mut self, exports: impl Into<String>) -> Self {
        self.exports = Some(exports.into());
        self
    }

    /// Sets the callback.
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&[Value]) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Declares the request as coming from module `name`.
    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.module = Some(name.into());
        self
    }
}

impl fmt::Debug for RequireOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequireOptions")
            .field("exports", &self.exports)
            .field("callback", &self.callback.is_some())
            .field("module", &self.module)
            .finish()
    }
}

/// Everything one loader owns.
pub(crate) struct LoaderState {
    pub(crate) config: LoaderConfig,
    pub(crate) parser: RefCell<RequestParser>,
    pub(crate) registry: ResourceRegistry,
    pub(crate) namespace: Namespace,
    pub(crate) milestones: PageMilestones,
    pub(crate) event_loop: EventLoop,
    pub(crate) progress: Progress,
    pending: Cell<usize>,
    all_settled: Promise,
}

impl LoaderState {
    fn request_settled(&self) {
        let remaining = self.pending.get().saturating_sub(1);
        self.pending.set(remaining);
        if remaining == 0 {
            tracing::debug!("all requests settled");
            self.all_settled.resolve(Vec::new());
        }
    }
}

/// Builds a [`Loader`] from its host collaborators.
#[must_use]
pub struct LoaderBuilder {
    config: LoaderConfig,
    transport: Option<Rc<dyn Transport>>,
    event_loop: Option<EventLoop>,
    milestones: Option<PageMilestones>,
    namespace: Option<Namespace>,
}

impl LoaderBuilder {
    /// Sets the fetch transport. Required.
    pub fn transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the event loop uncaught load failures are raised on.
    pub fn event_loop(mut self, event_loop: EventLoop) -> Self {
        self.event_loop = Some(event_loop);
        self
    }

    /// Sets the page milestones. Defaults to a page that finished loading.
    pub fn milestones(mut self, milestones: PageMilestones) -> Self {
        self.milestones = Some(milestones);
        self
    }

    /// Sets the namespace export paths resolve in.
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Builds the loader.
    ///
    /// # Errors
    ///
    /// Fails if no transport was given or the configuration is invalid.
    pub fn build(self) -> LoaderResult<Loader> {
        let transport = self
            .transport
            .ok_or_else(|| LoaderError::Config("a transport is required".to_string()))?;
        let parser = RequestParser::new(&self.config)?;
        let progress = Progress::new();

        tracing::debug!(root = %parser.root_url(), "loader created");
        Ok(Loader {
            state: Rc::new(LoaderState {
                registry: ResourceRegistry::new(transport, progress.clone()),
                parser: RefCell::new(parser),
                config: self.config,
                namespace: self.namespace.unwrap_or_default(),
                milestones: self.milestones.unwrap_or_else(PageMilestones::complete),
                event_loop: self.event_loop.unwrap_or_default(),
                progress,
                pending: Cell::new(0),
                all_settled: Promise::new(),
            }),
        })
    }
}

/// Loads scripts and stylesheets described by request strings.
///
/// Cloning a `Loader` yields another handle to the same loader. Independent
/// loaders share nothing.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use resource_loader::{Loader, LoaderConfig, MemoryTransport, RequireOptions};
/// use std::rc::Rc;
///
/// let event_loop = EventLoop::new();
/// let transport = MemoryTransport::new(event_loop.clone());
/// let loader = Loader::builder(LoaderConfig::default())
///     .transport(Rc::new(transport.clone()))
///     .event_loop(event_loop.clone())
///     .build()
///     .unwrap();
///
/// let request = loader.require("!libs/jquery; app", RequireOptions::new()).unwrap();
/// event_loop.run_until_done().unwrap();
///
/// assert!(request.is_fulfilled());
/// assert_eq!(
///     transport.fetched(),
///     vec![
///         "http://localhost/static/js/libs/jquery.js",
///         "http://localhost/static/js/app.js",
///     ]
/// );
/// ```
#[derive(Clone)]
pub struct Loader {
    state: Rc<LoaderState>,
}

impl Loader {
    /// Starts building a loader.
    pub fn builder(config: LoaderConfig) -> LoaderBuilder {
        LoaderBuilder {
            config,
            transport: None,
            event_loop: None,
            milestones: None,
            namespace: None,
        }
    }

    /// Loads the resources of `query`.
    ///
    /// The returned promise resolves with the export values once every tier
    /// loaded, or rejects with `(failing resource, failure)`. The callback in
    /// `options` runs only on success.
    ///
    /// # Errors
    ///
    /// Fails before anything is fetched if the request cannot be parsed or
    /// `options.module` names a script the loader has not registered.
    pub fn require(&self, query: impl Into<Query>, options: RequireOptions) -> LoaderResult<Promise> {
        let state = &self.state;
        let query = query.into();
        state.registry.adopt_page_resources();

        let (plan, exports, module) = {
            let parser = state.parser.borrow();
            let plan = parser.parse(&query)?;
            let exports = options
                .exports
                .as_deref()
                .map(|text| parser.parse_exports(text));
            let module = match &options.module {
                Some(name) => Some(self.module_resource(&parser, name)?),
                None => None,
            };
            (plan, exports, module)
        };

        let request = Promise::new();
        if let Some(callback) = options.callback {
            request.done(move |s| callback(s.args.as_slice()));
        }
        if let Some(module) = module {
            module.defer_completion();
            request.done(move |_| module.complete());
        }
        if state.all_settled.is_pending() {
            state.pending.set(state.pending.get() + 1);
            let env = Rc::downgrade(state);
            request.always(move |_| {
                if let Some(state) = env.upgrade() {
                    state.request_settled();
                }
            });
        }

        tracing::debug!(?query, tiers = plan.len(), "require");
        let mut tiers = plan.tiers;
        if tiers.is_empty() {
            tiers.push(Tier {
                priority: None,
                resources: Vec::new(),
            });
        }
        run_tier(state, Rc::new(tiers), 0, exports, request.clone());

        Ok(request)
    }

    /// Parses `query` without loading anything.
    pub fn plan(&self, query: impl Into<Query>) -> LoaderResult<RequestPlan> {
        self.state.parser.borrow().parse(&query.into())
    }

    /// Parses an export string without resolving it.
    pub fn parse_exports(&self, exports: &str) -> ExportSpec {
        self.state.parser.borrow().parse_exports(exports)
    }

    /// Export paths an export string names, after alias expansion.
    pub fn export_paths(&self, exports: &str) -> LoaderResult<Vec<String>> {
        let parser = self.state.parser.borrow();
        parser.export_paths(&parser.parse_exports(exports))
    }

    /// URL a module name maps to.
    pub fn script_url(&self, module: &str) -> LoaderResult<String> {
        self.state.parser.borrow().script_url(module)
    }

    /// Adds request aliases.
    pub fn add_query_shortcuts<I, K, V>(&self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state
            .parser
            .borrow_mut()
            .query_shortcuts_mut()
            .add(mapping);
    }

    /// Adds export aliases.
    pub fn add_export_shortcuts<I, K, V>(&self, mapping: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state
            .parser
            .borrow_mut()
            .export_shortcuts_mut()
            .add(mapping);
    }

    /// The configuration the loader was built with.
    pub fn config(&self) -> &LoaderConfig {
        &self.state.config
    }

    /// The namespace export paths resolve in.
    pub fn namespace(&self) -> &Namespace {
        &self.state.namespace
    }

    /// The page milestones.
    pub fn milestones(&self) -> &PageMilestones {
        &self.state.milestones
    }

    /// The event loop failures are raised on.
    pub fn event_loop(&self) -> &EventLoop {
        &self.state.event_loop
    }

    /// Fetch progress counters.
    pub fn progress(&self) -> &Progress {
        &self.state.progress
    }

    /// Registers a progress listener.
    pub fn on_progress<F>(&self, listener: F)
    where
        F: Fn(&ProgressEvent) + 'static,
    {
        self.state.progress.on_event(listener);
    }

    /// The resource registry.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.state.registry
    }

    /// The resource registered for `url`.
    pub fn resource(&self, url: &str) -> Option<LoadingResource> {
        self.state.registry.get(url)
    }

    /// Requests counted towards [`Loader::all_settled`] that have not settled.
    pub fn pending_requests(&self) -> usize {
        self.state.pending.get()
    }

    /// Resolves once every request made so far has settled.
    ///
    /// The count only runs until this first resolves; later requests do not
    /// re-arm it.
    pub fn all_settled(&self) -> &Promise {
        &self.state.all_settled
    }

    /// Runs `callback` once every request made so far has settled.
    pub fn on_all_settled<F>(&self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.state.all_settled.done(move |_| callback());
    }

    fn module_resource(&self, parser: &RequestParser, name: &str) -> LoaderResult<LoadingResource> {
        let url = parser.script_url(name)?;
        self.state
            .registry
            .get(&url)
            .ok_or_else(|| LoaderError::UnknownModule(name.to_string()))
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("registry", &self.state.registry)
            .field("pending", &self.state.pending.get())
            .finish()
    }
}

/// Builds and starts tier `index`; the next tier starts once it resolves.
fn run_tier(
    state: &Rc<LoaderState>,
    tiers: Rc<Vec<Tier>>,
    index: usize,
    exports: Option<ExportSpec>,
    request: Promise,
) {
    let Some(tier) = tiers.get(index) else {
        return;
    };
    let last = index + 1 == tiers.len();
    let tier_exports = if last { exports.clone() } else { None };
    let reload = tier_exports.as_ref().is_some_and(|spec| spec.flags.reload);

    let resources: Vec<LoadingResource> = tier
        .resources
        .iter()
        .map(|r| state.registry.acquire(&r.url, r.kind, reload))
        .collect();
    tracing::debug!(index, priority = ?tier.priority, size = resources.len(), "starting tier");

    let handler = Handler::new(state, resources, tier_exports);
    if last {
        let target = request.clone();
        handler.promise().done(move |s| {
            target.resolve(s.args.clone());
        });
    } else {
        let (env, target) = (Rc::downgrade(state), request.clone());
        handler.promise().done(move |_| {
            if let Some(state) = env.upgrade() {
                run_tier(&state, tiers, index + 1, exports, target);
            }
        });
    }
    handler.promise().fail(move |s| {
        request.reject(s.args.clone());
    });
    handler.load();
}
