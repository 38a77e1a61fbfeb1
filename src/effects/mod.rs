//! Asynchronous side effects driven by dispatched actions.
//!
//! Each registered [`Effect`] gets its own tokio task reading the store's
//! action stream. Matching actions start a run; the run's result actions
//! are dispatched back into the store.

mod effect;
mod runtime;
pub mod shutdown;

pub use effect::{
    Concurrency, Effect, EffectDefinition, EffectError, EffectFailure, EffectFuture,
    EFFECT_FAILED,
};
pub use runtime::{register_effects, EffectsRuntime, EFFECTS_INIT};
