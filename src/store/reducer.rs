//! Slice reducers and their composition into the root reducer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::action::{Action, ActionError};
use super::state::{Slice, SliceRef, StateTree};

/// Errors a reducer may raise. A reducer error aborts the whole dispatch.
#[derive(Debug, Error)]
pub enum ReducerError {
    #[error(transparent)]
    Payload(#[from] ActionError),

    #[error("Existing slice value does not fit the reducer: {0}")]
    Hydrate(#[from] serde_json::Error),

    #[error("Index {index} is out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0}")]
    Invariant(String),
}

/// Reducer transforms slice state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> State. Actions it does not
/// recognize return the input `Arc` unchanged.
pub trait Reducer: Send + Sync + 'static {
    /// The slice this reducer owns.
    type State: Slice;

    /// Initial value of the slice when nothing overrides it.
    fn initial_state() -> Self::State {
        Self::State::default()
    }

    /// Process an action and return the next slice value.
    fn reduce(state: &Arc<Self::State>, action: &Action) -> Result<Arc<Self::State>, ReducerError>;
}

type ReduceFn = dyn Fn(&SliceRef, &Action) -> Result<SliceRef, ReducerError> + Send + Sync;
type HydrateFn = dyn Fn(&SliceRef) -> Result<SliceRef, serde_json::Error> + Send + Sync;

/// One registered slice: key, erased reducer, initial value and the
/// conversion from a raw JSON slice into the typed one.
pub(crate) struct SliceRegistration {
    key: String,
    state_type: &'static str,
    initial: fn() -> SliceRef,
    reduce: Box<ReduceFn>,
    hydrate: Box<HydrateFn>,
}

impl SliceRegistration {
    fn new<R: Reducer>(key: String) -> Self {
        let reduce = move |state: &SliceRef, action: &Action| -> Result<SliceRef, ReducerError> {
            let typed = Arc::clone(state)
                .into_any()
                .downcast::<R::State>()
                .map_err(|_| {
                    ReducerError::Invariant(format!(
                        "slice holds {}, reducer expects {}",
                        state.type_name(),
                        std::any::type_name::<R::State>()
                    ))
                })?;
            let next = R::reduce(&typed, action)?;
            if Arc::ptr_eq(&next, &typed) || *next == *typed {
                // Equal value keeps the previous allocation.
                return Ok(Arc::clone(state));
            }
            let next: SliceRef = next;
            Ok(next)
        };

        let hydrate = |raw: &SliceRef| -> Result<SliceRef, serde_json::Error> {
            if raw.as_any().is::<R::State>() {
                return Ok(Arc::clone(raw));
            }
            let typed: SliceRef = Arc::new(serde_json::from_value::<R::State>(raw.to_json()?)?);
            Ok(typed)
        };

        Self {
            key,
            state_type: std::any::type_name::<R::State>(),
            initial: || -> SliceRef { Arc::new(R::initial_state()) },
            reduce: Box::new(reduce),
            hydrate: Box::new(hydrate),
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn state_type(&self) -> &'static str {
        self.state_type
    }

    pub(crate) fn initial(&self) -> SliceRef {
        (self.initial)()
    }

    /// Decode a JSON value into this registration's slice type.
    pub(crate) fn hydrate_json(&self, value: Value) -> Result<SliceRef, serde_json::Error> {
        let raw: SliceRef = Arc::new(value);
        (self.hydrate)(&raw)
    }

    /// Convert whatever currently sits under the key (typed or raw JSON).
    pub(crate) fn adopt(&self, existing: &SliceRef) -> Result<SliceRef, serde_json::Error> {
        (self.hydrate)(existing)
    }

    pub(crate) fn accepts(&self, slice: &SliceRef) -> bool {
        slice.type_name() == self.state_type
    }
}

/// Error returned by `ReducerMap::reduce`, naming the failing slice.
#[derive(Debug)]
pub(crate) struct SliceFailure {
    pub(crate) slice: String,
    pub(crate) source: ReducerError,
}

/// Mapping from slice key to reducer.
///
/// Composes slice reducers into one root reducer over the [`StateTree`].
#[derive(Default)]
pub struct ReducerMap {
    slices: Vec<SliceRegistration>,
}

impl ReducerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register reducer `R` under `key`. A later registration for the same
    /// key replaces the earlier one.
    pub fn slice<R: Reducer>(mut self, key: impl Into<String>) -> Self {
        self.insert(SliceRegistration::new::<R>(key.into()));
        self
    }

    pub(crate) fn registration<R: Reducer>(key: impl Into<String>) -> SliceRegistration {
        SliceRegistration::new::<R>(key.into())
    }

    pub(crate) fn insert(&mut self, registration: SliceRegistration) {
        if let Some(existing) = self
            .slices
            .iter_mut()
            .find(|existing| existing.key == registration.key)
        {
            tracing::warn!(slice = %registration.key, "Replacing reducer for slice");
            *existing = registration;
        } else {
            self.slices.push(registration);
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&SliceRegistration> {
        self.slices.iter().find(|registration| registration.key == key)
    }

    pub(crate) fn registrations(&self) -> impl Iterator<Item = &SliceRegistration> {
        self.slices.iter()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|registration| registration.key())
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Run every slice reducer against `tree`.
    ///
    /// Nothing is committed until all slices succeed. Keys without a
    /// reducer pass through. Returns the input `Arc` when no slice changed.
    pub(crate) fn reduce(
        &self,
        tree: &Arc<StateTree>,
        action: &Action,
    ) -> Result<Arc<StateTree>, SliceFailure> {
        let mut next: Option<BTreeMap<String, SliceRef>> = None;

        for registration in &self.slices {
            let fail = |source: ReducerError| SliceFailure {
                slice: registration.key.clone(),
                source,
            };
            // A slice registered after startup is seeded from the raw value
            // already under its key, or from its initial state.
            let (current, seeded) = match tree.raw(&registration.key) {
                Some(existing) if registration.accepts(existing) => (Arc::clone(existing), false),
                Some(existing) => (
                    registration
                        .adopt(existing)
                        .map_err(|err| fail(ReducerError::Hydrate(err)))?,
                    true,
                ),
                None => (registration.initial(), true),
            };
            let updated = (registration.reduce)(&current, action).map_err(fail)?;
            if seeded || !Arc::ptr_eq(&updated, &current) {
                next.get_or_insert_with(|| tree.slices().clone())
                    .insert(registration.key.clone(), updated);
            }
        }

        Ok(match next {
            Some(slices) => Arc::new(StateTree::from_slices(slices)),
            None => Arc::clone(tree),
        })
    }
}

impl std::fmt::Debug for ReducerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.slices.iter().map(|r| (&r.key, r.state_type)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Counter {
        count: i64,
    }

    impl Slice for Counter {}

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;

        fn reduce(state: &Arc<Counter>, action: &Action) -> Result<Arc<Counter>, ReducerError> {
            match action.kind() {
                "increment" => Ok(Arc::new(Counter {
                    count: state.count + 1,
                })),
                "touch" => Ok(Arc::new(Counter { count: state.count })),
                "explode" => Err(ReducerError::Invariant("boom".into())),
                _ => Ok(Arc::clone(state)),
            }
        }
    }

    fn initial_tree(map: &ReducerMap) -> Arc<StateTree> {
        let slices = map
            .registrations()
            .map(|r| (r.key().to_string(), r.initial()))
            .collect();
        Arc::new(StateTree::from_slices(slices))
    }

    #[test]
    fn unknown_action_keeps_tree_reference() {
        let map = ReducerMap::new().slice::<CounterReducer>("a");
        let tree = initial_tree(&map);
        let next = map.reduce(&tree, &Action::new("UNKNOWN")).unwrap();
        assert!(Arc::ptr_eq(&tree, &next));
    }

    #[test]
    fn equal_value_keeps_slice_reference() {
        let map = ReducerMap::new().slice::<CounterReducer>("a");
        let tree = initial_tree(&map);
        let next = map.reduce(&tree, &Action::new("touch")).unwrap();
        assert!(Arc::ptr_eq(&tree, &next));
    }

    #[test]
    fn changed_slice_shares_siblings() {
        let map = ReducerMap::new()
            .slice::<CounterReducer>("a")
            .slice::<CounterReducer>("b");
        let tree = initial_tree(&map);
        let next = map.reduce(&tree, &Action::new("increment")).unwrap();
        assert_eq!(next.get::<Counter>("a").unwrap().count, 1);
        assert_eq!(next.get::<Counter>("b").unwrap().count, 1);
        assert!(!tree.shares_slice(&next, "a"));
    }

    #[test]
    fn failure_names_the_slice() {
        let map = ReducerMap::new().slice::<CounterReducer>("a");
        let tree = initial_tree(&map);
        let failure = map.reduce(&tree, &Action::new("explode")).unwrap_err();
        assert_eq!(failure.slice, "a");
    }

    #[test]
    fn hydrate_decodes_raw_json() {
        let registration = ReducerMap::registration::<CounterReducer>("a");
        let slice = registration
            .hydrate_json(serde_json::json!({ "count": 7 }))
            .unwrap();
        assert!(registration.accepts(&slice));
        assert_eq!(slice.to_json().unwrap(), serde_json::json!({ "count": 7 }));
    }
}
