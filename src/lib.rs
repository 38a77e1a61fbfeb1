//! Statehouse: a predictable state container.
//!
//! A [`store::Store`] holds an immutable tree of feature slices. Actions are
//! dispatched synchronously through pure reducers; memoized
//! [`selector`]s derive views of the tree; [`effects`] react to actions on
//! tokio tasks and dispatch their results back into the store.

pub mod cli;
pub mod config;
pub mod effects;
pub mod entity;
pub mod features;
pub mod logging;
pub mod selector;
pub mod store;
