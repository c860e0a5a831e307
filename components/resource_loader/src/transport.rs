//! Fetch transports.
//!
//! The loader never fetches anything itself. A [`Transport`] starts fetches
//! and reports each outcome through the [`Completion`] it was handed.
//! [`MemoryTransport`] is an in-memory host driven by an [`EventLoop`], used
//! by the command-line tool and the tests.

use crate::request::ResourceKind;
use crate::resource::Completion;
use async_runtime::{EventLoop, Task};
use core_types::{LoadFailure, LoaderResult};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    /// Absolute URL
    pub url: String,
    /// Script or stylesheet
    pub kind: ResourceKind,
}

/// A host capable of fetching resources.
pub trait Transport {
    /// Starts fetching. The outcome must be reported through `completion`,
    /// at most once.
    fn fetch(&self, request: FetchRequest, completion: Completion);

    /// Detaches a fetched resource from the host.
    fn discard(&self, _url: &str) {}

    /// Resources already present on the page when the loader starts.
    fn page_resources(&self) -> Vec<FetchRequest> {
        Vec::new()
    }
}

/// Code run when a script arrives, before its success is reported.
pub type ScriptBody = Rc<dyn Fn() -> LoaderResult<()>>;

/// How [`MemoryTransport`] answers a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Report success on the next event loop turn
    Succeed,
    /// Report this failure on the next event loop turn
    Fail(LoadFailure),
    /// Keep the fetch in flight until released or rejected
    Hold,
}

#[derive(Default)]
struct State {
    default_outcome: Option<Outcome>,
    outcomes: HashMap<String, Outcome>,
    bodies: HashMap<String, ScriptBody>,
    held: Vec<Completion>,
    fetched: Vec<String>,
    discarded: Vec<String>,
    page: Vec<FetchRequest>,
}

/// An in-memory transport.
///
/// Each fetch is logged and answered according to the outcome scripted for
/// its URL (success by default). Answers are delivered as event loop tasks,
/// so nothing settles until the loop runs.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use core_types::LoadFailure;
/// use resource_loader::{MemoryTransport, Outcome};
///
/// let event_loop = EventLoop::new();
/// let transport = MemoryTransport::new(event_loop.clone());
/// transport.script("http://localhost/static/js/broken.js", Outcome::Fail(LoadFailure::new("404")));
///
/// assert!(transport.fetched().is_empty());
/// ```
#[derive(Clone)]
pub struct MemoryTransport {
    event_loop: EventLoop,
    state: Rc<RefCell<State>>,
}

impl MemoryTransport {
    /// Creates a transport delivering answers on `event_loop`.
    pub fn new(event_loop: EventLoop) -> Self {
        Self {
            event_loop,
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Sets the answer for fetches of `url`.
    pub fn script(&self, url: impl Into<String>, outcome: Outcome) -> &Self {
        self.state.borrow_mut().outcomes.insert(url.into(), outcome);
        self
    }

    /// Sets the answer for URLs without a scripted outcome.
    pub fn set_default_outcome(&self, outcome: Outcome) -> &Self {
        self.state.borrow_mut().default_outcome = Some(outcome);
        self
    }

    /// Runs `body` each time `url` arrives, before reporting success.
    ///
    /// An error from the body fails the fetch with the error's message and
    /// then fails the event loop turn.
    pub fn on_execute<F>(&self, url: impl Into<String>, body: F) -> &Self
    where
        F: Fn() -> LoaderResult<()> + 'static,
    {
        self.state
            .borrow_mut()
            .bodies
            .insert(url.into(), Rc::new(body));
        self
    }

    /// Declares a resource as already present on the page.
    pub fn add_page_resource(&self, url: impl Into<String>) -> &Self {
        let url = url.into();
        let kind = ResourceKind::of(&url);
        self.state
            .borrow_mut()
            .page
            .push(FetchRequest { url, kind });
        self
    }

    /// URLs fetched so far, in fetch order.
    pub fn fetched(&self) -> Vec<String> {
        self.state.borrow().fetched.clone()
    }

    /// Number of fetches of `url`.
    pub fn fetch_count(&self, url: &str) -> usize {
        self.state
            .borrow()
            .fetched
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    /// URLs discarded so far.
    pub fn discarded(&self) -> Vec<String> {
        self.state.borrow().discarded.clone()
    }

    /// URLs of fetches being held.
    pub fn held(&self) -> Vec<String> {
        self.state
            .borrow()
            .held
            .iter()
            .map(|c| c.url().to_string())
            .collect()
    }

    /// Lets a held fetch succeed. Returns false if `url` is not held.
    pub fn release(&self, url: &str) -> bool {
        match self.take_held(url) {
            Some(completion) => {
                self.deliver(completion, Outcome::Succeed);
                true
            }
            None => false,
        }
    }

    /// Fails a held fetch. Returns false if `url` is not held.
    pub fn reject(&self, url: &str, failure: LoadFailure) -> bool {
        match self.take_held(url) {
            Some(completion) => {
                self.deliver(completion, Outcome::Fail(failure));
                true
            }
            None => false,
        }
    }

    fn take_held(&self, url: &str) -> Option<Completion> {
        let mut state = self.state.borrow_mut();
        let index = state.held.iter().position(|c| c.url() == url)?;
        Some(state.held.remove(index))
    }

    fn deliver(&self, completion: Completion, outcome: Outcome) {
        let body = self.state.borrow().bodies.get(completion.url()).cloned();
        self.event_loop.enqueue_task(Task::new(move || {
            match outcome {
                Outcome::Succeed => {
                    if let Some(Err(error)) = body.map(|body| body()) {
                        completion.fail(LoadFailure::new(error.to_string()));
                        return Err(error);
                    }
                    completion.succeed();
                }
                Outcome::Fail(failure) => completion.fail(failure),
                Outcome::Hold => {}
            }
            Ok(())
        }));
    }
}

impl Transport for MemoryTransport {
    fn fetch(&self, request: FetchRequest, completion: Completion) {
        let outcome = {
            let mut state = self.state.borrow_mut();
            state.fetched.push(request.url.clone());
            state
                .outcomes
                .get(&request.url)
                .or(state.default_outcome.as_ref())
                .cloned()
                .unwrap_or(Outcome::Succeed)
        };

        match outcome {
            Outcome::Hold => self.state.borrow_mut().held.push(completion),
            outcome => self.deliver(completion, outcome),
        }
    }

    fn discard(&self, url: &str) {
        self.state.borrow_mut().discarded.push(url.to_string());
    }

    fn page_resources(&self) -> Vec<FetchRequest> {
        self.state.borrow().page.clone()
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryTransport")
            .field("fetched", &state.fetched)
            .field("held", &state.held.len())
            .finish()
    }
}
