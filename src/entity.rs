//! Normalized collections: ids plus an id-keyed map.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::selector::{create_selector, SelectorRef};
use crate::store::Slice;

/// Ordered ids and the entities they name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct EntityState<T> {
    pub ids: Vec<String>,
    pub entities: BTreeMap<String, T>,
}

impl<T> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            entities: BTreeMap::new(),
        }
    }
}

impl<T> Slice for EntityState<T> where
    T: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Pure operations over an [`EntityState`].
///
/// Without a sort comparer, `ids` keep insertion order.
pub struct EntityAdapter<T> {
    select_id: fn(&T) -> String,
    sort_comparer: Option<fn(&T, &T) -> Ordering>,
}

impl<T> Clone for EntityAdapter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntityAdapter<T> {}

impl<T: Clone> EntityAdapter<T> {
    pub const fn new(select_id: fn(&T) -> String) -> Self {
        Self {
            select_id,
            sort_comparer: None,
        }
    }

    pub const fn sorted(select_id: fn(&T) -> String, compare: fn(&T, &T) -> Ordering) -> Self {
        Self {
            select_id,
            sort_comparer: Some(compare),
        }
    }

    pub fn id_of(&self, entity: &T) -> String {
        (self.select_id)(entity)
    }

    /// Add an entity unless its id is already present.
    pub fn add_one(&self, entity: T, state: &EntityState<T>) -> EntityState<T> {
        self.add_many([entity], state)
    }

    pub fn add_many(
        &self,
        entities: impl IntoIterator<Item = T>,
        state: &EntityState<T>,
    ) -> EntityState<T> {
        let mut next = state.clone();
        for entity in entities {
            let id = self.id_of(&entity);
            if next.entities.contains_key(&id) {
                continue;
            }
            next.ids.push(id.clone());
            next.entities.insert(id, entity);
        }
        self.sort(next)
    }

    /// Replace the whole collection.
    pub fn set_all(&self, entities: impl IntoIterator<Item = T>) -> EntityState<T> {
        self.add_many(entities, &EntityState::default())
    }

    /// Add, or replace an existing entity with the same id.
    pub fn upsert_one(&self, entity: T, state: &EntityState<T>) -> EntityState<T> {
        let mut next = state.clone();
        let id = self.id_of(&entity);
        if !next.entities.contains_key(&id) {
            next.ids.push(id.clone());
        }
        next.entities.insert(id, entity);
        self.sort(next)
    }

    /// Apply `update` to the entity with `id`. Unknown ids leave the state
    /// as is; an update that changes the id re-keys the entity.
    pub fn update_one(
        &self,
        id: &str,
        update: impl FnOnce(&T) -> T,
        state: &EntityState<T>,
    ) -> EntityState<T> {
        let Some(current) = state.entities.get(id) else {
            return state.clone();
        };
        let updated = update(current);
        let new_id = self.id_of(&updated);

        let mut next = state.clone();
        if new_id != id {
            next.entities.remove(id);
            for existing in next.ids.iter_mut() {
                if existing == id {
                    *existing = new_id.clone();
                }
            }
        }
        next.entities.insert(new_id, updated);
        self.sort(next)
    }

    pub fn remove_one(&self, id: &str, state: &EntityState<T>) -> EntityState<T> {
        self.remove_many([id], state)
    }

    pub fn remove_many<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a str>,
        state: &EntityState<T>,
    ) -> EntityState<T> {
        let mut next = state.clone();
        for id in ids {
            if next.entities.remove(id).is_some() {
                next.ids.retain(|existing| existing != id);
            }
        }
        next
    }

    pub fn remove_all(&self) -> EntityState<T> {
        EntityState::default()
    }

    fn sort(&self, mut state: EntityState<T>) -> EntityState<T> {
        if let Some(compare) = self.sort_comparer {
            let entities = &state.entities;
            state.ids.sort_by(|a, b| match (entities.get(a), entities.get(b)) {
                (Some(a), Some(b)) => compare(a, b),
                _ => Ordering::Equal,
            });
        }
        state
    }
}

/// Entities in `ids` order.
pub fn select_all<T: Clone>(state: &EntityState<T>) -> Vec<T> {
    state
        .ids
        .iter()
        .filter_map(|id| state.entities.get(id).cloned())
        .collect()
}

pub fn select_ids<T>(state: &EntityState<T>) -> Vec<String> {
    state.ids.clone()
}

pub fn select_total<T>(state: &EntityState<T>) -> usize {
    state.ids.len()
}

/// Memoized selectors over one entity slice.
pub struct EntitySelectors<T> {
    pub select_ids: SelectorRef<Vec<String>>,
    pub select_entities: SelectorRef<BTreeMap<String, T>>,
    pub select_all: SelectorRef<Vec<T>>,
    pub select_total: SelectorRef<usize>,
}

/// Build [`EntitySelectors`] on top of the selector for the entity slice.
pub fn selectors<T>(feature: SelectorRef<EntityState<T>>) -> EntitySelectors<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    EntitySelectors {
        select_ids: create_selector((Arc::clone(&feature),), |state: &EntityState<T>| {
            select_ids(state)
        }),
        select_entities: create_selector((Arc::clone(&feature),), |state: &EntityState<T>| {
            state.entities.clone()
        }),
        select_all: create_selector((Arc::clone(&feature),), |state: &EntityState<T>| {
            select_all(state)
        }),
        select_total: create_selector((feature,), |state: &EntityState<T>| select_total(state)),
    }
}
