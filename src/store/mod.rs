//! Unidirectional state store.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ dispatch ──→ ReducerMap ──→ StateTree ──→ subscribers / observables
//!   ↑                                        │
//!   └──────────── effects ←── ActionStream ←─┘
//! ```
//!
//! - **Action**: a type string plus an optional JSON payload
//! - **Reducer**: pure function that produces the next slice value
//! - **StateTree**: immutable map of slices; unchanged slices keep their `Arc`
//! - **Store**: the only writer of the tree

mod action;
mod engine;
mod error;
mod observable;
mod reducer;
mod state;

pub use action::{define_action, Action, ActionCreator, ActionError};
pub use engine::{
    create_store, Dispatched, Store, StoreBuilder, Subscription, INIT, UPDATE_REDUCERS,
};
pub use error::StoreError;
pub use observable::{ActionStream, Observable, SelectStream};
pub use reducer::{Reducer, ReducerError, ReducerMap};
pub use state::{Slice, StateTree};
