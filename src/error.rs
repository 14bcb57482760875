//! Error types for the matchmaking engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Callers that need to tell a rejected run apart from
//! other failures downcast to [`MatchmakingError`].

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking scenarios
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("Input malformed: {reason}")]
    InputMalformed { reason: String },

    #[error("Configuration invalid: {message}")]
    ConfigurationInvalid { message: String },

    #[error("Manifest write failed: {message}")]
    ManifestWriteFailed { message: String },

    #[error("Dispatch failed for match {match_id}: {message}")]
    DispatchFailed { match_id: u32, message: String },

    #[error("Result report failed: {message}")]
    ReportFailed { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl MatchmakingError {
    /// Shorthand for an input rejection
    pub fn input(reason: impl Into<String>) -> Self {
        Self::InputMalformed {
            reason: reason.into(),
        }
    }

    /// Shorthand for a configuration rejection
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            message: message.into(),
        }
    }
}

/// Returns the typed matchmaking error behind an `anyhow::Error`, if any
pub fn classify(err: &anyhow::Error) -> Option<&MatchmakingError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<MatchmakingError>())
}
