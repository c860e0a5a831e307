//! Aggregate fetch progress.
//!
//! Counts fetches from the first start until every started fetch has
//! finished, then resets for the next batch.

use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// The first fetch of a batch started
    Start,
    /// A fetch finished
    Step {
        /// Fetches finished so far in this batch
        loaded: usize,
        /// Fetches started so far in this batch
        total: usize,
    },
    /// Every started fetch finished
    Finish {
        /// Fetches in the batch
        total: usize,
    },
}

type Listener = Rc<dyn Fn(&ProgressEvent)>;

#[derive(Default)]
struct Counters {
    loaded: Cell<usize>,
    total: Cell<usize>,
    listeners: RefCell<Vec<Listener>>,
}

/// Shared progress counters. Clones observe the same batch.
///
/// # Examples
///
/// ```
/// use resource_loader::{Progress, ProgressEvent};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let events = Rc::new(RefCell::new(Vec::new()));
/// let progress = Progress::new();
/// let sink = events.clone();
/// progress.on_event(move |e| sink.borrow_mut().push(*e));
///
/// progress.started();
/// progress.finished();
///
/// assert_eq!(
///     *events.borrow(),
///     vec![
///         ProgressEvent::Start,
///         ProgressEvent::Step { loaded: 1, total: 1 },
///         ProgressEvent::Finish { total: 1 },
///     ]
/// );
/// ```
#[derive(Clone, Default)]
pub struct Progress {
    counters: Rc<Counters>,
}

impl Progress {
    /// Creates idle counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every subsequent event.
    pub fn on_event<F>(&self, listener: F)
    where
        F: Fn(&ProgressEvent) + 'static,
    {
        self.counters.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Records a fetch start.
    pub fn started(&self) {
        let total = self.counters.total.get();
        self.counters.total.set(total + 1);
        if total == 0 {
            self.emit(ProgressEvent::Start);
        }
    }

    /// Records a finished fetch (success or failure).
    pub fn finished(&self) {
        let loaded = self.counters.loaded.get() + 1;
        let total = self.counters.total.get();
        self.counters.loaded.set(loaded);
        self.emit(ProgressEvent::Step { loaded, total });

        if loaded >= total {
            self.counters.loaded.set(0);
            self.counters.total.set(0);
            self.emit(ProgressEvent::Finish { total });
        }
    }

    /// Fetches finished in the current batch.
    pub fn loaded(&self) -> usize {
        self.counters.loaded.get()
    }

    /// Fetches started in the current batch.
    pub fn total(&self) -> usize {
        self.counters.total.get()
    }

    fn emit(&self, event: ProgressEvent) {
        tracing::debug!(?event, "loader progress");
        // Listeners may register further listeners.
        let listeners = self.counters.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("loaded", &self.loaded())
            .field("total", &self.total())
            .finish()
    }
}
