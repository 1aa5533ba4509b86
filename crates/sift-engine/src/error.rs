//! Engine error types

use thiserror::Error;

/// Analyzer initialization failure.
///
/// Cloneable so the gateway can hand the same sticky failure to every
/// caller after a failed load.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The analyzer backend failed to initialize.
    #[error("engine initialization failed: {0}")]
    InitFailed(String),
}

/// Failure of one analysis step inside a running pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AnalysisError {
    /// Human-readable failure description
    pub message: String,
}

impl AnalysisError {
    /// Create a step failure from any displayable source.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Session manager operation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No session with the given id.
    #[error("session not found")]
    NotFound,
    /// The structured report has no member at the given path.
    #[error("no member at path: {0}")]
    MemberNotFound(String),
    /// The member is a directory, not a scannable file.
    #[error("member is not a file: {0}")]
    NotAFile(String),
    /// The member is still encrypted; retry the parent with a secret first.
    #[error("member is encrypted: {0}")]
    MemberEncrypted(String),
    /// The member's bytes never read out of the container.
    #[error("member bytes unavailable: {0}")]
    MemberDataUnavailable(String),
    /// Nesting is deeper than the configured re-scan bound.
    #[error("scan depth exceeded (max {max})")]
    ScanDepthExceeded { max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_is_cloneable_and_displays() {
        let err = GatewayError::InitFailed("backend missing".to_string());
        let copy = err.clone();
        assert_eq!(err, copy);
        assert_eq!(
            copy.to_string(),
            "engine initialization failed: backend missing"
        );
    }

    #[test]
    fn depth_error_names_the_bound() {
        let err = SessionError::ScanDepthExceeded { max: 16 };
        assert_eq!(err.to_string(), "scan depth exceeded (max 16)");
    }
}
