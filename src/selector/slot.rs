//! Forward-declared selectors.

use std::sync::{Arc, OnceLock};

use super::{Selector, SelectorError, SelectorNode, SelectorRef};
use crate::store::StateTree;

/// A selector declared before its definition exists.
///
/// Other selectors may take the slot as an input right away; [`bind`]
/// supplies the real selector later and refuses any binding that would
/// make the slot depend on itself.
///
/// [`bind`]: SelectorSlot::bind
pub struct SelectorSlot<T> {
    node: Arc<SelectorNode>,
    target: OnceLock<SelectorRef<T>>,
}

impl<T> SelectorSlot<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    pub fn declare(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            node: SelectorNode::new(Some(name.into()), Vec::new()),
            target: OnceLock::new(),
        })
    }

    /// The slot as a selector input.
    pub fn selector(self: &Arc<Self>) -> SelectorRef<T> {
        Arc::clone(self) as SelectorRef<T>
    }

    pub fn bind(&self, selector: SelectorRef<T>) -> Result<(), SelectorError> {
        if self.target.get().is_some() {
            return Err(self.already_bound());
        }
        if let Some(path) = selector.node().path_to(self.node.id()) {
            let mut cycle = Vec::with_capacity(path.len() + 1);
            cycle.push(self.node.name().to_string());
            cycle.extend(path);
            return Err(SelectorError::Cycle { path: cycle });
        }

        let input = Arc::clone(selector.node());
        self.target
            .set(selector)
            .map_err(|_| self.already_bound())?;
        self.node.set_inputs(vec![input]);
        tracing::debug!(selector = %self.node.name(), "Selector slot bound");
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    fn already_bound(&self) -> SelectorError {
        SelectorError::AlreadyBound {
            name: self.node.name().to_string(),
        }
    }
}

impl<T> Selector for SelectorSlot<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    type Output = T;

    fn select(&self, state: &Arc<StateTree>) -> Result<Arc<T>, SelectorError> {
        match self.target.get() {
            Some(target) => target.select(state),
            None => Err(SelectorError::Unbound {
                name: self.node.name().to_string(),
            }),
        }
    }

    fn node(&self) -> &Arc<SelectorNode> {
        &self.node
    }

    fn recomputations(&self) -> u64 {
        self.target.get().map_or(0, |target| target.recomputations())
    }

    fn release(&self) {
        if let Some(target) = self.target.get() {
            target.release();
        }
    }
}
