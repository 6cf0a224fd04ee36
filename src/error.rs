use thiserror::Error;

/// Errors that abort flattening of the current document.
///
/// Schema growth caused by events seen before the failure is not rolled
/// back: columns registered by a document that later fails stay in the
/// registry.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The event source produced an event name outside the known vocabulary
    #[error("unrecognized event `{kind}` at path `{path}`")]
    UnrecognizedEvent { path: String, kind: String },

    /// An array was closed (or its index queried) with no array open
    #[error("array index stack underflow at path `{path}`")]
    StackUnderflow { path: String },

    /// Another thread panicked while holding the shared registry lock
    #[error("schema registry lock poisoned")]
    RegistryPoisoned,

    #[error("invalid type hints: {0}")]
    InvalidHints(String),

    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlattenError>;
