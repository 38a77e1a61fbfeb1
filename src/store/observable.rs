//! Push-based views over the store: selected values and dispatched actions.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::engine::{Dispatched, Store, Subscription};
use crate::selector::{SelectorError, SelectorRef};

/// A selector bound to a store.
pub struct Observable<T> {
    store: Store,
    selector: SelectorRef<T>,
}

impl<T> Observable<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    pub(crate) fn new(store: Store, selector: SelectorRef<T>) -> Self {
        Self { store, selector }
    }

    /// Select from the current state.
    pub fn get(&self) -> Result<Arc<T>, SelectorError> {
        self.selector.select(&self.store.state())
    }

    /// Call `callback` with the current value now, then after every state
    /// change that yields a different value.
    ///
    /// Selector errors are logged and skipped; the subscription stays live.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Arc<T>) + Send + 'static,
    {
        let selector = Arc::clone(&self.selector);
        let emitter = Mutex::new(Emitter {
            last: None,
            callback,
        });
        self.store.subscribe_with_current(move |state| {
            match selector.select(state) {
                Ok(value) => emitter.lock().emit(value),
                Err(error) => {
                    tracing::warn!(
                        selector = %selector.node().name(),
                        error = %error,
                        "Selector failed"
                    );
                }
            }
        })
    }

    /// The same emissions as [`Observable::subscribe`], as an async stream.
    pub fn stream(&self) -> SelectStream<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |value| {
            let _ = sender.send(value);
        });
        SelectStream {
            receiver,
            _subscription: subscription,
        }
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            selector: Arc::clone(&self.selector),
        }
    }
}

struct Emitter<T, F> {
    last: Option<Arc<T>>,
    callback: F,
}

impl<T: PartialEq, F: FnMut(Arc<T>)> Emitter<T, F> {
    fn emit(&mut self, value: Arc<T>) {
        let unchanged = self
            .last
            .as_ref()
            .is_some_and(|last| Arc::ptr_eq(last, &value) || **last == *value);
        if unchanged {
            return;
        }
        self.last = Some(Arc::clone(&value));
        (self.callback)(value);
    }
}

/// Stream of selected values. Dropping it unsubscribes.
pub struct SelectStream<T> {
    receiver: mpsc::UnboundedReceiver<Arc<T>>,
    _subscription: Subscription,
}

impl<T> SelectStream<T> {
    pub async fn next(&mut self) -> Option<Arc<T>> {
        self.receiver.recv().await
    }
}

impl<T> Stream for SelectStream<T> {
    type Item = Arc<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Every action the store reduced, paired with the resulting state.
pub struct ActionStream {
    receiver: mpsc::UnboundedReceiver<Dispatched>,
}

impl ActionStream {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<Dispatched>) -> Self {
        Self { receiver }
    }

    /// Wait for the next dispatched action. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<Dispatched> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Dispatched> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for ActionStream {
    type Item = Dispatched;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
