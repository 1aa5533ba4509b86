//! Error types for the report model

/// Returned when a task kind name received at a string boundary does not
/// match any known kind. Interior dispatch is enum-based and cannot fail;
/// only external input (CLI arguments, config) goes through parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task kind: {0}")]
pub struct UnknownTaskError(pub String);
