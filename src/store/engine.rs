//! The store: single source of truth and the only writer of the state tree.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde_json::Value;
use tokio::sync::mpsc;

use super::action::Action;
use super::error::StoreError;
use super::observable::{ActionStream, Observable};
use super::reducer::{Reducer, ReducerMap};
use super::state::{Slice, SliceRef, StateTree};
use crate::selector::SelectorRef;

/// Dispatched once when a store is built.
pub const INIT: &str = "@statehouse/init";

/// Dispatched after a slice reducer is added at runtime; payload is the key.
pub const UPDATE_REDUCERS: &str = "@statehouse/update-reducers";

/// An action together with the state it produced.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub action: Action,
    pub state: Arc<StateTree>,
}

type Callback = dyn Fn(&Arc<StateTree>) + Send + Sync;

pub(crate) struct Listener {
    id: u64,
    active: AtomicBool,
    callback: Box<Callback>,
}

/// Dispatch bookkeeping, only touched while the re-entrant lock is held.
#[derive(Default)]
struct DispatchQueue {
    draining: Cell<bool>,
    pending: RefCell<VecDeque<Action>>,
}

pub(crate) struct StoreInner {
    reducers: RwLock<ReducerMap>,
    state: RwLock<Arc<StateTree>>,
    queue: ReentrantMutex<DispatchQueue>,
    listeners: Mutex<Vec<Arc<Listener>>>,
    action_streams: Mutex<Vec<mpsc::UnboundedSender<Dispatched>>>,
    next_listener: AtomicU64,
}

/// Handle to one store. Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

/// Builds a [`Store`] from a reducer map and optional initial-state overrides.
pub struct StoreBuilder {
    reducers: ReducerMap,
    overrides: BTreeMap<String, SliceRef>,
    snapshot: Option<Value>,
}

impl StoreBuilder {
    /// Override the initial value of one slice.
    pub fn with_state<S: Slice>(mut self, key: impl Into<String>, value: S) -> Self {
        self.overrides.insert(key.into(), Arc::new(value));
        self
    }

    /// Seed state from a JSON snapshot such as one produced by
    /// [`StateTree::to_json`]. Keys without a reducer are kept as raw JSON.
    pub fn hydrate(mut self, snapshot: Value) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn build(self) -> Result<Store, StoreError> {
        let mut slices: BTreeMap<String, SliceRef> = BTreeMap::new();

        if let Some(snapshot) = self.snapshot {
            let Value::Object(entries) = snapshot else {
                return Err(StoreError::InvalidSnapshot);
            };
            for (key, value) in entries {
                let slice: SliceRef = match self.reducers.get(&key) {
                    Some(registration) => {
                        registration
                            .hydrate_json(value)
                            .map_err(|source| StoreError::Hydrate {
                                slice: key.clone(),
                                source,
                            })?
                    }
                    None => Arc::new(value),
                };
                slices.insert(key, slice);
            }
        }

        for (key, slice) in self.overrides {
            if let Some(registration) = self.reducers.get(&key) {
                if !registration.accepts(&slice) {
                    return Err(StoreError::SliceType {
                        slice: key,
                        expected: registration.state_type(),
                        actual: slice.type_name(),
                    });
                }
            }
            slices.insert(key, slice);
        }

        for registration in self.reducers.registrations() {
            slices
                .entry(registration.key().to_string())
                .or_insert_with(|| registration.initial());
        }

        tracing::debug!(
            slices = ?slices.keys().collect::<Vec<_>>(),
            "Store created"
        );

        let store = Store {
            inner: Arc::new(StoreInner {
                reducers: RwLock::new(self.reducers),
                state: RwLock::new(Arc::new(StateTree::from_slices(slices))),
                queue: ReentrantMutex::new(DispatchQueue::default()),
                listeners: Mutex::new(Vec::new()),
                action_streams: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
            }),
        };
        store.dispatch(Action::new(INIT))?;
        Ok(store)
    }
}

/// Create a store with every slice at its reducer's initial state.
pub fn create_store(reducers: ReducerMap) -> Result<Store, StoreError> {
    Store::builder(reducers).build()
}

impl Store {
    pub fn builder(reducers: ReducerMap) -> StoreBuilder {
        StoreBuilder {
            reducers,
            overrides: BTreeMap::new(),
            snapshot: None,
        }
    }

    /// Current state tree.
    pub fn state(&self) -> Arc<StateTree> {
        Arc::clone(&self.inner.state.read())
    }

    /// Run `action` through the root reducer.
    ///
    /// Called from inside a subscriber callback, the action is queued and
    /// applied after the current transition has notified every subscriber.
    /// A reducer error leaves state untouched and is returned to the caller.
    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        let queue = self.inner.queue.lock();
        if queue.draining.get() {
            tracing::trace!(action = %action.kind(), "Queueing re-entrant dispatch");
            queue.pending.borrow_mut().push_back(action);
            return Ok(());
        }
        self.exclusive(|| self.apply(action))
    }

    /// Register a raw state listener, called after every state change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<StateTree>) + Send + Sync + 'static,
    {
        let listener = self.register(Box::new(callback));
        Subscription::new(listener, &self.inner)
    }

    /// Register a listener and call it once with the current state before
    /// any later transition can reach it.
    pub(crate) fn subscribe_with_current<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<StateTree>) + Send + Sync + 'static,
    {
        self.exclusive(|| {
            let listener = self.register(Box::new(callback));
            (listener.callback)(&self.state());
            Subscription::new(listener, &self.inner)
        })
    }

    /// Live view of a selector's value.
    pub fn select<T>(&self, selector: SelectorRef<T>) -> Observable<T>
    where
        T: PartialEq + Send + Sync + 'static,
    {
        Observable::new(self.clone(), selector)
    }

    /// Stream of every successfully reduced action, starting now.
    pub fn actions(&self) -> ActionStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner.action_streams.lock().push(sender);
        ActionStream::new(receiver)
    }

    /// Register a slice reducer after startup.
    ///
    /// A raw value already stored under `key` is decoded into the slice;
    /// otherwise the reducer's initial state is used. Sibling slices are
    /// untouched.
    pub fn add_slice<R: Reducer>(&self, key: impl Into<String>) -> Result<(), StoreError> {
        let key = key.into();
        let registration = ReducerMap::registration::<R>(key.clone());
        {
            let mut reducers = self.inner.reducers.write();
            if reducers.contains(&key) {
                return Err(StoreError::DuplicateSlice(key));
            }
            if let Some(existing) = self.state().raw(&key) {
                registration
                    .adopt(existing)
                    .map_err(|source| StoreError::Hydrate {
                        slice: key.clone(),
                        source,
                    })?;
            }
            reducers.insert(registration);
        }
        tracing::info!(slice = %key, "Slice reducer added");
        self.dispatch(Action::with_payload(UPDATE_REDUCERS, &key)?)
    }

    /// Keys that currently have a reducer.
    pub fn slice_keys(&self) -> Vec<String> {
        self.inner.reducers.read().keys().map(str::to_string).collect()
    }

    /// Run `work` while holding the dispatch lock, then drain actions that
    /// were queued by re-entrant dispatches. Nested calls run inline and
    /// leave draining to the outermost call.
    fn exclusive<T>(&self, work: impl FnOnce() -> T) -> T {
        let queue = self.inner.queue.lock();
        if queue.draining.get() {
            return work();
        }
        queue.draining.set(true);
        let queue = scopeguard::guard(queue, |queue| queue.draining.set(false));

        let result = work();
        loop {
            let next = queue.pending.borrow_mut().pop_front();
            let Some(action) = next else {
                break;
            };
            let kind = action.kind().to_string();
            if let Err(error) = self.apply(action) {
                tracing::error!(action = %kind, error = %error, "Queued dispatch failed");
            }
        }
        result
    }

    fn apply(&self, action: Action) -> Result<(), StoreError> {
        let current = self.state();
        let next = self
            .inner
            .reducers
            .read()
            .reduce(&current, &action)
            .map_err(|failure| StoreError::Reducer {
                slice: failure.slice,
                action: action.kind().to_string(),
                source: failure.source,
            })?;

        let changed = !Arc::ptr_eq(&current, &next);
        tracing::debug!(action = %action.kind(), changed, "Action reduced");

        if changed {
            *self.inner.state.write() = Arc::clone(&next);
            self.notify(&next);
        }
        self.publish(Dispatched {
            action,
            state: next,
        });
        Ok(())
    }

    fn notify(&self, state: &Arc<StateTree>) {
        let listeners: Vec<Arc<Listener>> = self.inner.listeners.lock().clone();
        for listener in listeners {
            if listener.active.load(Ordering::Acquire) {
                (listener.callback)(state);
            }
        }
    }

    fn publish(&self, dispatched: Dispatched) {
        let mut streams = self.inner.action_streams.lock();
        streams.retain(|sender| sender.send(dispatched.clone()).is_ok());
    }

    fn register(&self, callback: Box<Callback>) -> Arc<Listener> {
        let listener = Arc::new(Listener {
            id: self.inner.next_listener.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            callback,
        });
        self.inner.listeners.lock().push(Arc::clone(&listener));
        listener
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Keeps a listener registered. Dropping or calling
/// [`Subscription::unsubscribe`] removes it; no callback starts afterwards.
#[must_use = "dropping a Subscription unsubscribes it"]
pub struct Subscription {
    listener: Arc<Listener>,
    store: Weak<StoreInner>,
}

impl Subscription {
    fn new(listener: Arc<Listener>, store: &Arc<StoreInner>) -> Self {
        Self {
            listener,
            store: Arc::downgrade(store),
        }
    }

    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        self.listener.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.listener.active.store(false, Ordering::Release);
        if let Some(store) = self.store.upgrade() {
            let id = self.listener.id;
            store.listeners.lock().retain(|listener| listener.id != id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.listener.id)
            .field("active", &self.is_active())
            .finish()
    }
}
