//! Memoized selector implementations.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Selector, SelectorError, SelectorNode, SelectorRef};
use crate::store::{Slice, StateTree};

/// How a memoized selector decides its inputs are unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Equality {
    /// Same `Arc` allocation.
    #[default]
    Reference,
    /// Equal by `PartialEq`. An output equal to the previous one also keeps
    /// the previous `Arc`.
    Value,
}

impl Equality {
    fn same<T: PartialEq>(self, a: &Arc<T>, b: &Arc<T>) -> bool {
        match self {
            Equality::Reference => Arc::ptr_eq(a, b),
            Equality::Value => Arc::ptr_eq(a, b) || **a == **b,
        }
    }
}

/// Selects one slice out of the tree.
struct FeatureSelector<S> {
    key: String,
    node: Arc<SelectorNode>,
    memo: Mutex<Option<(Arc<StateTree>, Arc<S>)>>,
    recomputations: AtomicU64,
}

/// Selector for the slice stored under `key`.
pub fn feature_selector<S: Slice>(key: impl Into<String>) -> SelectorRef<S> {
    let key = key.into();
    Arc::new(FeatureSelector {
        node: SelectorNode::new(Some(key.clone()), Vec::new()),
        key,
        memo: Mutex::new(None),
        recomputations: AtomicU64::new(0),
    })
}

impl<S: Slice> Selector for FeatureSelector<S> {
    type Output = S;

    fn select(&self, state: &Arc<StateTree>) -> Result<Arc<S>, SelectorError> {
        let mut memo = self.memo.lock();
        if let Some((tree, slice)) = memo.as_ref() {
            if Arc::ptr_eq(tree, state) {
                return Ok(Arc::clone(slice));
            }
        }
        let slice = state.get::<S>(&self.key).ok_or_else(|| {
            if state.contains(&self.key) {
                SelectorError::SliceType {
                    key: self.key.clone(),
                    expected: std::any::type_name::<S>(),
                }
            } else {
                SelectorError::MissingSlice {
                    key: self.key.clone(),
                }
            }
        })?;
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *memo = Some((Arc::clone(state), Arc::clone(&slice)));
        Ok(slice)
    }

    fn node(&self) -> &Arc<SelectorNode> {
        &self.node
    }

    fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    fn release(&self) {
        *self.memo.lock() = None;
    }
}

/// Projects directly from the whole tree.
struct RootSelector<T, F> {
    projector: F,
    node: Arc<SelectorNode>,
    memo: Mutex<Option<(Arc<StateTree>, Arc<T>)>>,
    recomputations: AtomicU64,
}

/// Selector computing `projector(tree)`, memoized on the tree reference.
pub fn root_selector<T, F>(name: impl Into<String>, projector: F) -> SelectorRef<T>
where
    T: PartialEq + Send + Sync + 'static,
    F: Fn(&StateTree) -> T + Send + Sync + 'static,
{
    Arc::new(RootSelector {
        projector,
        node: SelectorNode::new(Some(name.into()), Vec::new()),
        memo: Mutex::new(None),
        recomputations: AtomicU64::new(0),
    })
}

impl<T, F> Selector for RootSelector<T, F>
where
    T: PartialEq + Send + Sync + 'static,
    F: Fn(&StateTree) -> T + Send + Sync + 'static,
{
    type Output = T;

    fn select(&self, state: &Arc<StateTree>) -> Result<Arc<T>, SelectorError> {
        let mut memo = self.memo.lock();
        if let Some((tree, output)) = memo.as_ref() {
            if Arc::ptr_eq(tree, state) {
                return Ok(Arc::clone(output));
            }
        }
        let output = Arc::new((self.projector)(state));
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *memo = Some((Arc::clone(state), Arc::clone(&output)));
        Ok(output)
    }

    fn node(&self) -> &Arc<SelectorNode> {
        &self.node
    }

    fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    fn release(&self) {
        *self.memo.lock() = None;
    }
}

/// A tuple of one to four input selectors.
pub trait SelectorInputs: Send + Sync + 'static {
    /// The tuple of input values, one `Arc` per input.
    type Values: Send;

    fn select_all(&self, state: &Arc<StateTree>) -> Result<Self::Values, SelectorError>;

    fn unchanged(previous: &Self::Values, current: &Self::Values, equality: Equality) -> bool;

    fn nodes(&self) -> Vec<Arc<SelectorNode>>;
}

/// A projector over the values of [`SelectorInputs`]. Implemented for
/// closures taking one reference per input.
pub trait Project<V, T>: Send + Sync + 'static {
    fn project(&self, values: &V) -> T;
}

macro_rules! impl_selector_inputs {
    ($($input:ident : $idx:tt),+) => {
        impl<$($input),+> SelectorInputs for ($(SelectorRef<$input>,)+)
        where
            $($input: PartialEq + Send + Sync + 'static),+
        {
            type Values = ($(Arc<$input>,)+);

            fn select_all(&self, state: &Arc<StateTree>) -> Result<Self::Values, SelectorError> {
                Ok(($(self.$idx.select(state)?,)+))
            }

            fn unchanged(previous: &Self::Values, current: &Self::Values, equality: Equality) -> bool {
                $(equality.same(&previous.$idx, &current.$idx))&&+
            }

            fn nodes(&self) -> Vec<Arc<SelectorNode>> {
                vec![$(Arc::clone(self.$idx.node())),+]
            }
        }

        impl<$($input,)+ T, F> Project<($(Arc<$input>,)+), T> for F
        where
            F: Fn($(&$input),+) -> T + Send + Sync + 'static,
        {
            fn project(&self, values: &($(Arc<$input>,)+)) -> T {
                (self)($(&*values.$idx),+)
            }
        }
    };
}

impl_selector_inputs!(A: 0);
impl_selector_inputs!(A: 0, B: 1);
impl_selector_inputs!(A: 0, B: 1, C: 2);
impl_selector_inputs!(A: 0, B: 1, C: 2, D: 3);

struct Memoized<I: SelectorInputs, T, P> {
    inputs: I,
    projector: P,
    equality: Equality,
    node: Arc<SelectorNode>,
    memo: Mutex<Option<(I::Values, Arc<T>)>>,
    recomputations: AtomicU64,
    _output: PhantomData<fn() -> T>,
}

/// Combine input selectors through `projector`, comparing inputs by reference.
///
/// ```ignore
/// let total = create_selector((select_list(),), |list: &ShoppingListState| list.ingredients.len());
/// ```
pub fn create_selector<I, T, P>(inputs: I, projector: P) -> SelectorRef<T>
where
    I: SelectorInputs,
    T: PartialEq + Send + Sync + 'static,
    P: Project<I::Values, T>,
{
    create_selector_with(inputs, Equality::Reference, projector)
}

pub fn create_selector_with<I, T, P>(inputs: I, equality: Equality, projector: P) -> SelectorRef<T>
where
    I: SelectorInputs,
    T: PartialEq + Send + Sync + 'static,
    P: Project<I::Values, T>,
{
    let node = SelectorNode::new(None, inputs.nodes());
    Arc::new(Memoized {
        inputs,
        projector,
        equality,
        node,
        memo: Mutex::new(None),
        recomputations: AtomicU64::new(0),
        _output: PhantomData,
    })
}

impl<I, T, P> Selector for Memoized<I, T, P>
where
    I: SelectorInputs,
    T: PartialEq + Send + Sync + 'static,
    P: Project<I::Values, T>,
{
    type Output = T;

    fn select(&self, state: &Arc<StateTree>) -> Result<Arc<T>, SelectorError> {
        let values = self.inputs.select_all(state)?;
        let mut memo = self.memo.lock();
        if let Some((previous, output)) = memo.as_ref() {
            if I::unchanged(previous, &values, self.equality) {
                return Ok(Arc::clone(output));
            }
        }

        let projected = self.projector.project(&values);
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        let output = match memo.as_ref() {
            Some((_, previous)) if self.equality == Equality::Value && **previous == projected => {
                Arc::clone(previous)
            }
            _ => Arc::new(projected),
        };
        *memo = Some((values, Arc::clone(&output)));
        Ok(output)
    }

    fn node(&self) -> &Arc<SelectorNode> {
        &self.node
    }

    fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    fn release(&self) {
        *self.memo.lock() = None;
    }
}
