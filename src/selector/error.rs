use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Binding would make a selector depend on itself.
    #[error("Selector dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Selector '{name}' was declared but never bound")]
    Unbound { name: String },

    #[error("Selector '{name}' is already bound")]
    AlreadyBound { name: String },

    #[error("State has no slice '{key}'")]
    MissingSlice { key: String },

    #[error("Slice '{key}' is not a {expected}")]
    SliceType { key: String, expected: &'static str },
}
