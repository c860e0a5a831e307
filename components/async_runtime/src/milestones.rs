//! Page milestones.
//!
//! Two one-shot events a loader can defer callbacks to: the document becoming
//! ready (DOM parsed) and the window finishing its load. Window load implies
//! the document is ready.

use crate::promise::{Promise, Settlement};

/// DOM-ready and window-load events, as promises.
///
/// # Examples
///
/// ```
/// use async_runtime::PageMilestones;
///
/// let page = PageMilestones::new();
/// assert!(!page.is_dom_ready());
///
/// page.fire_window_load();
/// assert!(page.is_dom_ready());
/// assert!(page.is_loaded());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageMilestones {
    dom_ready: Promise,
    window_load: Promise,
}

impl PageMilestones {
    /// Creates milestones that have not fired yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates milestones for a page that has already finished loading.
    pub fn complete() -> Self {
        let page = Self::new();
        page.fire_window_load();
        page
    }

    /// The DOM-ready event.
    pub fn dom_ready(&self) -> &Promise {
        &self.dom_ready
    }

    /// The window-load event.
    pub fn window_load(&self) -> &Promise {
        &self.window_load
    }

    /// Signals that the document is ready. Repeated calls are ignored.
    pub fn fire_dom_ready(&self) {
        if self.dom_ready.is_pending() {
            tracing::debug!("document ready");
            self.dom_ready.resolve(Vec::new());
        }
    }

    /// Signals that the window has loaded, firing DOM-ready first if needed.
    pub fn fire_window_load(&self) {
        self.fire_dom_ready();
        if self.window_load.is_pending() {
            tracing::debug!("window loaded");
            self.window_load.resolve(Vec::new());
        }
    }

    /// Returns true once the document is ready.
    pub fn is_dom_ready(&self) -> bool {
        self.dom_ready.is_fulfilled()
    }

    /// Returns true once the window has loaded.
    pub fn is_loaded(&self) -> bool {
        self.window_load.is_fulfilled()
    }

    /// Runs `callback` when the document is ready (immediately if it is).
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&Settlement) + 'static,
    {
        self.dom_ready.done(callback);
    }

    /// Runs `callback` when the window has loaded (immediately if it has).
    pub fn on_load<F>(&self, callback: F)
    where
        F: FnOnce(&Settlement) + 'static,
    {
        self.window_load.done(callback);
    }
}
