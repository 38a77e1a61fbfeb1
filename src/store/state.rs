//! The immutable state tree and the slice marker trait.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Marker trait for slice state objects.
///
/// Slices should be:
/// - Immutable (Clone to create new states)
/// - Comparable (PartialEq for detecting changes)
/// - Serializable (snapshots are plain JSON)
pub trait Slice:
    Clone + PartialEq + fmt::Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Raw JSON slices hold state for keys that have no reducer (yet).
impl Slice for Value {}

/// Object-safe view of a [`Slice`] so heterogeneous slices share one map.
pub(crate) trait ErasedSlice: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn same_value(&self, other: &dyn ErasedSlice) -> bool;
    fn to_json(&self) -> Result<Value, serde_json::Error>;
    fn type_name(&self) -> &'static str;
}

impl<S: Slice> ErasedSlice for S {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn same_value(&self, other: &dyn ErasedSlice) -> bool {
        other
            .as_any()
            .downcast_ref::<S>()
            .is_some_and(|other| self == other)
    }

    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<S>()
    }
}

pub(crate) type SliceRef = Arc<dyn ErasedSlice>;

/// One immutable application state tree keyed by slice name.
///
/// A transition never edits a tree; it builds a new one that shares the
/// `Arc` of every slice that did not change.
#[derive(Clone, Default)]
pub struct StateTree {
    slices: BTreeMap<String, SliceRef>,
}

impl StateTree {
    pub(crate) fn from_slices(slices: BTreeMap<String, SliceRef>) -> Self {
        Self { slices }
    }

    pub(crate) fn raw(&self, key: &str) -> Option<&SliceRef> {
        self.slices.get(key)
    }

    pub(crate) fn slices(&self) -> &BTreeMap<String, SliceRef> {
        &self.slices
    }

    /// Typed access to a slice. `None` if the key is absent or holds
    /// another type.
    pub fn get<S: Slice>(&self, key: &str) -> Option<Arc<S>> {
        let slice = Arc::clone(self.slices.get(key)?);
        slice.into_any().downcast::<S>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Whether the slice under `key` is the same allocation in both trees.
    pub fn shares_slice(&self, other: &StateTree, key: &str) -> bool {
        match (self.slices.get(key), other.slices.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Snapshot the whole tree as a JSON object.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut object = serde_json::Map::with_capacity(self.slices.len());
        for (key, slice) in &self.slices {
            object.insert(key.clone(), slice.to_json()?);
        }
        Ok(Value::Object(object))
    }
}

impl PartialEq for StateTree {
    fn eq(&self, other: &Self) -> bool {
        self.slices.len() == other.slices.len()
            && self.slices.iter().all(|(key, slice)| {
                other
                    .slices
                    .get(key)
                    .is_some_and(|theirs| Arc::ptr_eq(slice, theirs) || slice.same_value(theirs.as_ref()))
            })
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.slices.iter()).finish()
    }
}
