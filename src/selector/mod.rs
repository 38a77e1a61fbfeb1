//! Memoized, composable projections of the state tree.
//!
//! Selectors form a DAG: leaves read slices ([`feature_selector`]) or the
//! whole tree ([`root_selector`]); [`create_selector`] combines up to four
//! inputs through a projector. A selector recomputes only when one of its
//! inputs produced a different value since the last call.

mod error;
mod memo;
mod slot;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::StateTree;

pub use error::SelectorError;
pub use memo::{
    create_selector, create_selector_with, feature_selector, root_selector, Equality, Project,
    SelectorInputs,
};
pub use slot::SelectorSlot;

/// A derivation from the state tree.
pub trait Selector: Send + Sync {
    type Output: PartialEq + Send + Sync + 'static;

    fn select(&self, state: &Arc<StateTree>) -> Result<Arc<Self::Output>, SelectorError>;

    /// Position of this selector in the dependency graph.
    fn node(&self) -> &Arc<SelectorNode>;

    /// How many times the projector has run.
    fn recomputations(&self) -> u64 {
        0
    }

    /// Drop the memoized value.
    fn release(&self) {}
}

pub type SelectorRef<T> = Arc<dyn Selector<Output = T>>;

static NEXT_NODE: AtomicU64 = AtomicU64::new(1);

/// Identity and input edges of one selector.
#[derive(Debug)]
pub struct SelectorNode {
    id: u64,
    name: String,
    inputs: RwLock<Vec<Arc<SelectorNode>>>,
}

impl SelectorNode {
    pub(crate) fn new(name: Option<String>, inputs: Vec<Arc<SelectorNode>>) -> Arc<Self> {
        let id = NEXT_NODE.fetch_add(1, Ordering::Relaxed);
        Arc::new(Self {
            id,
            name: name.unwrap_or_else(|| format!("selector#{id}")),
            inputs: RwLock::new(inputs),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> Vec<Arc<SelectorNode>> {
        self.inputs.read().clone()
    }

    pub(crate) fn set_inputs(&self, inputs: Vec<Arc<SelectorNode>>) {
        *self.inputs.write() = inputs;
    }

    /// Names along a dependency path from this node to `target`, both ends
    /// included. `None` if `target` is not reachable.
    pub(crate) fn path_to(&self, target: u64) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        self.search(target, &mut visited)
    }

    fn search(&self, target: u64, visited: &mut HashSet<u64>) -> Option<Vec<String>> {
        if self.id == target {
            return Some(vec![self.name.clone()]);
        }
        if !visited.insert(self.id) {
            return None;
        }
        for input in self.inputs.read().iter() {
            if let Some(mut path) = input.search(target, visited) {
                path.insert(0, self.name.clone());
                return Some(path);
            }
        }
        None
    }
}
