//! Single-assignment promise with callback queues and aggregation.
//!
//! A [`Promise`] settles exactly once, either fulfilled or rejected, with a
//! list of argument values. Callbacks registered before settlement are queued
//! and run in registration order; callbacks registered afterwards run
//! immediately if their status matches.

use core_types::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been resolved.
    Fulfilled,
    /// The promise has been rejected.
    Rejected,
}

/// The outcome handed to every callback.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Fulfilled or Rejected
    pub state: PromiseState,
    /// The object callbacks run against; the promise itself unless
    /// [`Promise::resolve_with`] or [`Promise::reject_with`] installed another
    pub context: Value,
    /// Arguments the promise settled with
    pub args: Vec<Value>,
}

/// A callback queued on a promise.
pub type Callback = Box<dyn FnOnce(&Settlement)>;

/// Maps the arguments of one promise to the arguments of a piped one.
pub type Transform = Box<dyn FnOnce(&[Value]) -> Vec<Value>>;

#[derive(Default)]
struct Reactions {
    done: Vec<Callback>,
    fail: Vec<Callback>,
    always: Vec<Callback>,
}

impl Reactions {
    fn len(&self) -> usize {
        self.done.len() + self.fail.len() + self.always.len()
    }
}

struct Inner {
    state: PromiseState,
    reactions: Reactions,
    context: Option<Value>,
    args: Vec<Value>,
}

/// A single-assignment asynchronous result.
///
/// Cloning a `Promise` yields another handle to the same result.
///
/// # Examples
///
/// ```
/// use async_runtime::{Promise, PromiseState};
/// use core_types::Value;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let promise = Promise::new();
///
/// let sink = seen.clone();
/// promise.done(move |s| sink.borrow_mut().extend(s.args.clone()));
///
/// promise.resolve(vec![Value::Number(42.0)]);
/// promise.resolve(vec![Value::Number(7.0)]); // ignored
///
/// assert_eq!(promise.state(), PromiseState::Fulfilled);
/// assert_eq!(*seen.borrow(), vec![Value::Number(42.0)]);
/// ```
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<Inner>>,
}

impl Promise {
    /// Creates a new pending Promise.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: PromiseState::Pending,
                reactions: Reactions::default(),
                context: None,
                args: Vec::new(),
            })),
        }
    }

    /// Creates a promise that is already fulfilled with `args`.
    pub fn resolved(args: Vec<Value>) -> Self {
        let promise = Self::new();
        promise.resolve(args);
        promise
    }

    /// Creates a promise that is already rejected with `args`.
    pub fn rejected(args: Vec<Value>) -> Self {
        let promise = Self::new();
        promise.reject(args);
        promise
    }

    /// Returns the current state.
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state
    }

    /// Returns true while the promise has not settled.
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// Returns true if the promise was resolved.
    pub fn is_fulfilled(&self) -> bool {
        self.state() == PromiseState::Fulfilled
    }

    /// Returns true if the promise was rejected.
    pub fn is_rejected(&self) -> bool {
        self.state() == PromiseState::Rejected
    }

    /// Returns the settled arguments, or `None` while pending.
    pub fn args(&self) -> Option<Vec<Value>> {
        let inner = self.inner.borrow();
        match inner.state {
            PromiseState::Pending => None,
            _ => Some(inner.args.clone()),
        }
    }

    /// Returns the full outcome, or `None` while pending.
    pub fn settlement(&self) -> Option<Settlement> {
        let inner = self.inner.borrow();
        if inner.state == PromiseState::Pending {
            return None;
        }
        Some(Settlement {
            state: inner.state,
            context: inner
                .context
                .clone()
                .unwrap_or_else(|| Value::native(self.clone())),
            args: inner.args.clone(),
        })
    }

    /// Checks if there are queued callbacks.
    pub fn has_pending_reactions(&self) -> bool {
        self.inner.borrow().reactions.len() > 0
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers a callback for fulfillment.
    pub fn done<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Settlement) + 'static,
    {
        self.register(Some(PromiseState::Fulfilled), Box::new(callback))
    }

    /// Registers a callback for rejection.
    pub fn fail<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Settlement) + 'static,
    {
        self.register(Some(PromiseState::Rejected), Box::new(callback))
    }

    /// Registers a callback for either outcome.
    pub fn always<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&Settlement) + 'static,
    {
        self.register(None, Box::new(callback))
    }

    /// Registers a fulfillment and a rejection callback.
    pub fn then<D, F>(&self, on_done: D, on_fail: F) -> &Self
    where
        D: FnOnce(&Settlement) + 'static,
        F: FnOnce(&Settlement) + 'static,
    {
        self.done(on_done).fail(on_fail)
    }

    /// Fulfills the promise. Ignored if it has already settled.
    pub fn resolve(&self, args: Vec<Value>) -> &Self {
        self.settle(PromiseState::Fulfilled, None, args)
    }

    /// Rejects the promise. Ignored if it has already settled.
    pub fn reject(&self, args: Vec<Value>) -> &Self {
        self.settle(PromiseState::Rejected, None, args)
    }

    /// Installs `context` for the callbacks, then fulfills.
    pub fn resolve_with(&self, context: Value, args: Vec<Value>) -> &Self {
        self.settle(PromiseState::Fulfilled, Some(context), args)
    }

    /// Installs `context` for the callbacks, then rejects.
    pub fn reject_with(&self, context: Value, args: Vec<Value>) -> &Self {
        self.settle(PromiseState::Rejected, Some(context), args)
    }

    /// Returns a promise that settles like this one.
    ///
    /// A transform, when given, maps the original arguments to the new
    /// promise's arguments; a missing transform passes them through. The
    /// callback context carries over.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::Promise;
    /// use core_types::Value;
    ///
    /// let source = Promise::new();
    /// let doubled = source.pipe(
    ///     Some(Box::new(|args: &[Value]| -> Vec<Value> {
    ///         args.iter().chain(args.iter()).cloned().collect()
    ///     })),
    ///     None,
    /// );
    ///
    /// source.resolve(vec![Value::from("x")]);
    /// assert_eq!(doubled.args(), Some(vec![Value::from("x"), Value::from("x")]));
    /// ```
    pub fn pipe(&self, on_done: Option<Transform>, on_fail: Option<Transform>) -> Promise {
        let piped = Promise::new();

        let target = piped.clone();
        self.done(move |s| {
            let args = match on_done {
                Some(transform) => transform(&s.args),
                None => s.args.clone(),
            };
            target.resolve_with(s.context.clone(), args);
        });

        let target = piped.clone();
        self.fail(move |s| {
            let args = match on_fail {
                Some(transform) => transform(&s.args),
                None => s.args.clone(),
            };
            target.reject_with(s.context.clone(), args);
        });

        piped
    }

    /// Aggregates several inputs into one promise.
    ///
    /// The result resolves once every promise input has resolved, with one
    /// argument per input in input order: a promise contributes
    /// `Value::List` of its arguments, a ready value contributes itself. It
    /// rejects on the first rejection with the failing promise's context
    /// followed by that promise's arguments. With nothing left to wait for
    /// it resolves immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::{Awaited, Promise};
    /// use core_types::Value;
    ///
    /// let a = Promise::new();
    /// let all = Promise::when(vec![
    ///     Awaited::from(&a),
    ///     Awaited::from(Value::from("literal")),
    /// ]);
    /// assert!(all.is_pending());
    ///
    /// a.resolve(vec![Value::Number(1.0)]);
    /// assert_eq!(
    ///     all.args(),
    ///     Some(vec![Value::List(vec![Value::Number(1.0)]), Value::from("literal")])
    /// );
    /// ```
    pub fn when<I>(inputs: I) -> Promise
    where
        I: IntoIterator,
        I::Item: Into<Awaited>,
    {
        let result = Promise::new();
        let inputs: Vec<Awaited> = inputs.into_iter().map(Into::into).collect();
        let slots = Rc::new(RefCell::new(vec![Value::Undefined; inputs.len()]));
        let unresolved = Rc::new(Cell::new(inputs.len()));

        let mut awaiting = Vec::new();
        for (index, input) in inputs.into_iter().enumerate() {
            match input {
                Awaited::Ready(value) => {
                    slots.borrow_mut()[index] = value;
                    unresolved.set(unresolved.get() - 1);
                }
                Awaited::Promise(promise) => awaiting.push((index, promise)),
            }
        }

        if awaiting.is_empty() {
            let args = slots.borrow().clone();
            result.resolve(args);
            return result;
        }

        for (index, promise) in awaiting {
            let (target, slots, unresolved) = (result.clone(), slots.clone(), unresolved.clone());
            promise.done(move |s| {
                slots.borrow_mut()[index] = Value::List(s.args.clone());
                unresolved.set(unresolved.get() - 1);
                if unresolved.get() == 0 {
                    let args = slots.borrow().clone();
                    target.resolve(args);
                }
            });

            let target = result.clone();
            promise.fail(move |s| {
                let mut args = Vec::with_capacity(s.args.len() + 1);
                args.push(s.context.clone());
                args.extend(s.args.iter().cloned());
                target.reject(args);
            });
        }

        result
    }

    fn register(&self, on: Option<PromiseState>, callback: Callback) -> &Self {
        let settled = {
            let mut inner = self.inner.borrow_mut();
            match (inner.state, on) {
                (PromiseState::Pending, Some(PromiseState::Fulfilled)) => {
                    inner.reactions.done.push(callback);
                    return self;
                }
                (PromiseState::Pending, Some(_)) => {
                    inner.reactions.fail.push(callback);
                    return self;
                }
                (PromiseState::Pending, None) => {
                    inner.reactions.always.push(callback);
                    return self;
                }
                (state, _) => state,
            }
        };

        if on.map_or(true, |wanted| wanted == settled) {
            if let Some(settlement) = self.settlement() {
                callback(&settlement);
            }
        }
        self
    }

    fn settle(&self, state: PromiseState, context: Option<Value>, args: Vec<Value>) -> &Self {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != PromiseState::Pending {
                return self;
            }
            inner.state = state;
            if context.is_some() {
                inner.context = context;
            }
            inner.args = args;

            let reactions = std::mem::take(&mut inner.reactions);
            let mut callbacks = match state {
                PromiseState::Fulfilled => reactions.done,
                _ => reactions.fail,
            };
            callbacks.extend(reactions.always);
            callbacks
        };

        tracing::trace!(?state, callbacks = callbacks.len(), "promise settled");
        if let Some(settlement) = self.settlement() {
            for callback in callbacks {
                callback(&settlement);
            }
        }
        self
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("state", &inner.state)
            .field("args", &inner.args)
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}

/// One input of [`Promise::when`].
#[derive(Debug, Clone)]
pub enum Awaited {
    /// Wait for this promise
    Promise(Promise),
    /// Already available
    Ready(Value),
}

impl From<Promise> for Awaited {
    fn from(promise: Promise) -> Self {
        Awaited::Promise(promise)
    }
}

impl From<&Promise> for Awaited {
    fn from(promise: &Promise) -> Self {
        Awaited::Promise(promise.clone())
    }
}

impl From<Value> for Awaited {
    fn from(value: Value) -> Self {
        Awaited::Ready(value)
    }
}

/// Something that settles through a promise.
///
/// Loading resources and tier handlers share the promise behaviour through
/// this trait rather than by extending `Promise`. Implementors may override
/// `resolve`/`reject` to update their own state before settling.
pub trait Settleable {
    /// The promise backing this object.
    fn promise(&self) -> &Promise;

    /// Settles successfully.
    fn resolve(&self, args: Vec<Value>) {
        self.promise().resolve(args);
    }

    /// Settles with a failure.
    fn reject(&self, args: Vec<Value>) {
        self.promise().reject(args);
    }

    /// Current state of the backing promise.
    fn state(&self) -> PromiseState {
        self.promise().state()
    }

    /// This object as an input of [`Promise::when`].
    fn awaited(&self) -> Awaited {
        Awaited::Promise(self.promise().clone())
    }
}

impl Settleable for Promise {
    fn promise(&self) -> &Promise {
        self
    }
}
