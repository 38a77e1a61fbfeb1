//! Store-level errors.

use thiserror::Error;

use super::action::ActionError;
use super::reducer::ReducerError;

/// Errors that can occur while building a store or dispatching into it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A slice reducer failed; the dispatch was aborted and state is unchanged.
    #[error("Reducer for slice '{slice}' failed on '{action}': {source}")]
    Reducer {
        slice: String,
        action: String,
        #[source]
        source: ReducerError,
    },

    /// A typed override or lookup does not match the registered slice type.
    #[error("Slice '{slice}' holds {expected}, got {actual}")]
    SliceType {
        slice: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A JSON snapshot could not be decoded into a registered slice.
    #[error("Failed to hydrate slice '{slice}': {source}")]
    Hydrate {
        slice: String,
        #[source]
        source: serde_json::Error,
    },

    /// A snapshot passed to hydrate was not a JSON object.
    #[error("State snapshot must be a JSON object")]
    InvalidSnapshot,

    /// `add_slice` for a key that already has a reducer.
    #[error("Slice '{0}' already has a reducer")]
    DuplicateSlice(String),

    #[error(transparent)]
    Action(#[from] ActionError),
}
