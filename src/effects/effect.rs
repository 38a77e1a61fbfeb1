//! The effect trait and its closure-based builder.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{define_action, Action, ActionCreator, ActionError, StateTree};

/// Default failure action, dispatched when an effect run fails.
pub const EFFECT_FAILED: ActionCreator<EffectFailure> = define_action("[Effects] Operation Failed");

/// Payload of [`EFFECT_FAILED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectFailure {
    pub effect: String,
    pub trigger: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("{0}")]
    Failed(String),

    #[error("Effect timed out after {0:?}")]
    Timeout(Duration),

    #[error("Effect panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl EffectError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// How an effect treats a trigger that arrives while a run is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// Every trigger runs independently.
    #[default]
    Concurrent,
    /// A new trigger aborts the in-flight run; only the latest result counts.
    LatestOnly,
    /// Triggers queue and run one at a time in arrival order.
    Serial,
}

/// Asynchronous reaction to dispatched actions.
///
/// The runtime feeds every action whose type is listed in
/// [`Effect::triggers`] to [`Effect::run`], together with the state the
/// action produced. Returned actions are dispatched in order.
#[async_trait]
pub trait Effect: Send + Sync + 'static {
    /// Returns the name of this effect for logging.
    fn name(&self) -> &str;

    /// Action types this effect reacts to.
    fn triggers(&self) -> &[&'static str];

    fn concurrency(&self) -> Concurrency {
        Concurrency::Concurrent
    }

    /// Whether results are dispatched. Non-dispatching effects only run for
    /// their side effects.
    fn dispatches(&self) -> bool {
        true
    }

    /// Upper bound for one run. `None` waits forever.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    async fn run(&self, action: Action, state: Arc<StateTree>) -> Result<Vec<Action>, EffectError>;

    /// Convert a failed run into an action to dispatch.
    ///
    /// Default: [`EFFECT_FAILED`] naming the effect, trigger and error.
    fn on_error(&self, trigger: &Action, error: &EffectError) -> Option<Action> {
        failure_action(self.name(), trigger, error)
    }
}

fn failure_action(effect: &str, trigger: &Action, error: &EffectError) -> Option<Action> {
    EFFECT_FAILED
        .create(EffectFailure {
            effect: effect.to_string(),
            trigger: trigger.kind().to_string(),
            message: error.to_string(),
        })
        .ok()
}

pub type EffectFuture = Pin<Box<dyn Future<Output = Result<Vec<Action>, EffectError>> + Send>>;

type Handler = dyn Fn(Action, Arc<StateTree>) -> EffectFuture + Send + Sync;
type ErrorMapper = dyn Fn(&Action, &EffectError) -> Option<Action> + Send + Sync;

/// Effect assembled from closures.
///
/// ```ignore
/// let log = EffectDefinition::new("log-logout")
///     .triggers([LOGOUT.kind()])
///     .non_dispatching()
///     .handler(|_action, _state| async { Ok(Vec::new()) });
/// ```
pub struct EffectDefinition {
    name: String,
    triggers: Vec<&'static str>,
    concurrency: Concurrency,
    dispatches: bool,
    timeout: Option<Duration>,
    on_error: Option<Box<ErrorMapper>>,
}

impl EffectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            concurrency: Concurrency::default(),
            dispatches: true,
            timeout: None,
            on_error: None,
        }
    }

    pub fn triggers(mut self, triggers: impl IntoIterator<Item = &'static str>) -> Self {
        self.triggers.extend(triggers);
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn non_dispatching(mut self) -> Self {
        self.dispatches = false;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&Action, &EffectError) -> Option<Action> + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Finish the definition with its handler.
    pub fn handler<F, Fut>(self, handler: F) -> Arc<dyn Effect>
    where
        F: Fn(Action, Arc<StateTree>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Action>, EffectError>> + Send + 'static,
    {
        let handler: Box<Handler> = Box::new(move |action, state| Box::pin(handler(action, state)));
        Arc::new(DefinedEffect {
            definition: self,
            handler,
        })
    }
}

struct DefinedEffect {
    definition: EffectDefinition,
    handler: Box<Handler>,
}

#[async_trait]
impl Effect for DefinedEffect {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn triggers(&self) -> &[&'static str] {
        &self.definition.triggers
    }

    fn concurrency(&self) -> Concurrency {
        self.definition.concurrency
    }

    fn dispatches(&self) -> bool {
        self.definition.dispatches
    }

    fn timeout(&self) -> Option<Duration> {
        self.definition.timeout
    }

    async fn run(&self, action: Action, state: Arc<StateTree>) -> Result<Vec<Action>, EffectError> {
        (self.handler)(action, state).await
    }

    fn on_error(&self, trigger: &Action, error: &EffectError) -> Option<Action> {
        match &self.definition.on_error {
            Some(on_error) => on_error(trigger, error),
            None => failure_action(&self.definition.name, trigger, error),
        }
    }
}
