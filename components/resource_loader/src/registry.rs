//! Deduplicating resource registry.

use crate::progress::Progress;
use crate::request::ResourceKind;
use crate::resource::{LoadingResource, ResourceState};
use crate::transport::Transport;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Maps each absolute URL to the one [`LoadingResource`] for it.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use resource_loader::{MemoryTransport, Progress, ResourceKind, ResourceRegistry};
/// use std::rc::Rc;
///
/// let transport = Rc::new(MemoryTransport::new(EventLoop::new()));
/// let registry = ResourceRegistry::new(transport, Progress::new());
///
/// let url = "http://localhost/static/js/app.js";
/// let first = registry.acquire(url, ResourceKind::Script, false);
/// let second = registry.acquire(url, ResourceKind::Script, false);
/// assert!(first.ptr_eq(&second));
/// assert_eq!(registry.len(), 1);
/// ```
pub struct ResourceRegistry {
    resources: RefCell<HashMap<String, LoadingResource>>,
    transport: Rc<dyn Transport>,
    progress: Progress,
}

impl ResourceRegistry {
    /// Creates an empty registry whose resources fetch through `transport`.
    pub fn new(transport: Rc<dyn Transport>, progress: Progress) -> Self {
        Self {
            resources: RefCell::new(HashMap::new()),
            transport,
            progress,
        }
    }

    /// Returns the resource for `url`, creating it if needed.
    ///
    /// With `reload`, a script that already loaded is discarded and replaced
    /// by a fresh, unloaded instance. Stylesheets are never reloaded, and a
    /// resource still in flight is returned as is.
    pub fn acquire(&self, url: &str, kind: ResourceKind, reload: bool) -> LoadingResource {
        let mut resources = self.resources.borrow_mut();

        if reload && kind != ResourceKind::Stylesheet {
            let stale = resources
                .get(url)
                .is_some_and(|r| r.load_state() == ResourceState::Loaded);
            if stale {
                if let Some(old) = resources.remove(url) {
                    tracing::debug!(url, "reloading resource");
                    old.destroy();
                }
            }
        }

        resources
            .entry(url.to_string())
            .or_insert_with(|| {
                tracing::debug!(url, %kind, "registering resource");
                LoadingResource::new(url, kind, self.transport.clone(), self.progress.clone())
            })
            .clone()
    }

    /// Returns the resource for `url`, if registered.
    pub fn get(&self, url: &str) -> Option<LoadingResource> {
        self.resources.borrow().get(url).cloned()
    }

    /// Registers the transport's page resources as loaded.
    ///
    /// URLs already registered are left alone. Returns how many were added.
    pub fn adopt_page_resources(&self) -> usize {
        let mut adopted = 0;
        for request in self.transport.page_resources() {
            if self.resources.borrow().contains_key(&request.url) {
                continue;
            }
            let resource = LoadingResource::new(
                request.url.clone(),
                request.kind,
                self.transport.clone(),
                self.progress.clone(),
            );
            resource.adopt();
            self.resources.borrow_mut().insert(request.url, resource);
            adopted += 1;
        }
        if adopted > 0 {
            tracing::debug!(adopted, "adopted page resources");
        }
        adopted
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.borrow().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.resources.borrow().is_empty()
    }

    /// Registered URLs, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.resources.borrow().keys().cloned().collect();
        urls.sort();
        urls
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.urls())
            .finish()
    }
}
