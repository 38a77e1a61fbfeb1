//! Effect tasks: one per registered effect, fed by the store's action stream.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle, JoinSet};

use super::effect::{Concurrency, Effect, EffectError};
use super::shutdown::StopSignal;
use crate::store::{Action, ActionStream, Dispatched, Store};

/// Dispatched once after effects are registered.
pub const EFFECTS_INIT: &str = "@statehouse/effects/init";

/// Running effect tasks. Dropping the runtime signals every task to stop.
pub struct EffectsRuntime {
    signal: StopSignal,
    tasks: Vec<JoinHandle<()>>,
}

/// Start one task per effect, then dispatch [`EFFECTS_INIT`].
///
/// Must be called from within a tokio runtime.
pub fn register_effects(store: &Store, effects: Vec<Arc<dyn Effect>>) -> EffectsRuntime {
    let signal = StopSignal::new();
    let mut tasks = Vec::with_capacity(effects.len());

    for effect in effects {
        tracing::debug!(
            effect = %effect.name(),
            triggers = ?effect.triggers(),
            concurrency = ?effect.concurrency(),
            "Registering effect"
        );
        let worker = EffectWorker {
            actions: store.actions(),
            store: store.clone(),
            stop: signal.clone(),
            effect,
            running: JoinSet::new(),
            queued: VecDeque::new(),
            generation: 0,
        };
        tasks.push(tokio::spawn(worker.run()));
    }

    if let Err(error) = store.dispatch(Action::new(EFFECTS_INIT)) {
        tracing::error!(error = %error, "Effects init dispatch failed");
    }

    EffectsRuntime { signal, tasks }
}

impl EffectsRuntime {
    /// Number of effect tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stop every effect task and wait for them to exit. In-flight runs are
    /// aborted and their results discarded.
    pub async fn shutdown(mut self) {
        self.signal.stop();
        for task in self.tasks.drain(..) {
            if let Err(error) = task.await {
                tracing::warn!(error = %error, "Effect task ended abnormally");
            }
        }
        tracing::debug!("Effects stopped");
    }
}

impl Drop for EffectsRuntime {
    fn drop(&mut self) {
        self.signal.stop();
    }
}

/// Result of one effect run.
struct Outcome {
    generation: u64,
    trigger: Action,
    result: Result<Vec<Action>, EffectError>,
}

struct EffectWorker {
    effect: Arc<dyn Effect>,
    store: Store,
    actions: ActionStream,
    stop: StopSignal,
    running: JoinSet<Outcome>,
    /// Serial mode: triggers waiting for the current run.
    queued: VecDeque<Dispatched>,
    generation: u64,
}

impl EffectWorker {
    async fn run(mut self) {
        let stop = self.stop.clone();
        loop {
            tokio::select! {
                _ = stop.stopped() => break,
                received = self.actions.recv() => match received {
                    Some(dispatched) => {
                        if self.effect.triggers().contains(&dispatched.action.kind()) {
                            self.trigger(dispatched);
                        }
                    }
                    None => break,
                },
                Some(joined) = self.running.join_next(), if !self.running.is_empty() => {
                    self.complete(joined);
                }
            }
        }
        self.running.abort_all();
        tracing::trace!(effect = %self.effect.name(), "Effect task exiting");
    }

    fn trigger(&mut self, dispatched: Dispatched) {
        tracing::debug!(
            effect = %self.effect.name(),
            trigger = %dispatched.action.kind(),
            "Effect triggered"
        );
        match self.effect.concurrency() {
            Concurrency::Concurrent => self.start(dispatched),
            Concurrency::LatestOnly => {
                self.running.abort_all();
                self.start(dispatched);
            }
            Concurrency::Serial => {
                if self.running.is_empty() {
                    self.start(dispatched);
                } else {
                    self.queued.push_back(dispatched);
                }
            }
        }
    }

    fn start(&mut self, dispatched: Dispatched) {
        self.generation += 1;
        let generation = self.generation;
        let effect = Arc::clone(&self.effect);
        self.running.spawn(async move {
            let trigger = dispatched.action.clone();
            let timeout = effect.timeout();
            let result = execute(effect, dispatched, timeout).await;
            Outcome {
                generation,
                trigger,
                result,
            }
        });
    }

    fn complete(&mut self, joined: Result<Outcome, JoinError>) {
        match joined {
            Ok(outcome) => {
                let stale = self.effect.concurrency() == Concurrency::LatestOnly
                    && outcome.generation != self.generation;
                if stale {
                    tracing::debug!(
                        effect = %self.effect.name(),
                        trigger = %outcome.trigger.kind(),
                        "Discarding superseded effect result"
                    );
                } else {
                    self.deliver(outcome);
                }
            }
            Err(error) if error.is_cancelled() => {}
            Err(error) => {
                tracing::error!(effect = %self.effect.name(), error = %error, "Effect run failed to join");
            }
        }

        if self.running.is_empty() {
            if let Some(next) = self.queued.pop_front() {
                self.start(next);
            }
        }
    }

    fn deliver(&self, outcome: Outcome) {
        let name = self.effect.name();
        match outcome.result {
            Ok(actions) if !self.effect.dispatches() => {
                if !actions.is_empty() {
                    tracing::warn!(
                        effect = %name,
                        dropped = actions.len(),
                        "Non-dispatching effect returned actions"
                    );
                }
            }
            Ok(actions) => {
                for action in actions {
                    self.dispatch(action);
                }
            }
            Err(error) => {
                tracing::warn!(
                    effect = %name,
                    trigger = %outcome.trigger.kind(),
                    error = %error,
                    "Effect failed"
                );
                if self.effect.dispatches() {
                    if let Some(action) = self.effect.on_error(&outcome.trigger, &error) {
                        self.dispatch(action);
                    }
                }
            }
        }
    }

    fn dispatch(&self, action: Action) {
        let kind = action.kind().to_string();
        if let Err(error) = self.store.dispatch(action) {
            tracing::warn!(
                effect = %self.effect.name(),
                action = %kind,
                error = %error,
                "Dispatch from effect failed"
            );
        }
    }
}

/// Run the handler on its own task so a panic becomes an [`EffectError`].
async fn execute(
    effect: Arc<dyn Effect>,
    dispatched: Dispatched,
    timeout: Option<Duration>,
) -> Result<Vec<Action>, EffectError> {
    let handle = AbortOnDrop(tokio::spawn(async move {
        effect.run(dispatched.action, dispatched.state).await
    }));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => return Err(EffectError::Timeout(limit)),
        },
        None => handle.await,
    };

    match joined {
        Ok(result) => result,
        Err(error) if error.is_panic() => Err(EffectError::Panicked(panic_message(error))),
        Err(error) => Err(EffectError::failed(error.to_string())),
    }
}

fn panic_message(error: JoinError) -> String {
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Join handle that aborts its task when dropped, so aborting or timing out
/// the outer run also stops the handler.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
