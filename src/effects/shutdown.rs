//! Stop flag shared by the effect tasks of one runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    wake: Notify,
}

/// Cloneable one-shot stop flag. Every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake all waiters. Returns `false` if it was
    /// already raised.
    pub fn stop(&self) -> bool {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        tracing::debug!("Effects stop requested");
        self.inner.wake.notify_waiters();
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once [`stop`](Self::stop) has been called on any clone.
    pub async fn stopped(&self) {
        // Register before reading the flag; a stop between the two would
        // otherwise find no waiter.
        let woken = self.inner.wake.notified();
        tokio::pin!(woken);
        woken.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        woken.await;
    }
}
