//! Error types for scoring and for the remote scoring service.
//!
//! `RemoteError` lives here rather than in `examscore-remote` so the cascade
//! engine can downcast a backend failure and log its class without string
//! matching.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that reach the caller of the scoring engine.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The request was not shaped like a scoring request.
    #[error("{0}")]
    InvalidInput(String),

    /// A pair violated the `max_score > 0` invariant.
    #[error("question '{question_id}' has invalid max_score {max_score}: must be a positive number")]
    InvalidMaxScore { question_id: String, max_score: f64 },

    /// Anything unexpected. The message is for logs, not for end users.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScoringError {
    /// Returns `true` if the caller sent something we cannot score.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScoringError::InvalidInput(_) | ScoringError::InvalidMaxScore { .. }
        )
    }
}

/// Errors talking to the external scoring service.
///
/// None of these reach the end user: the engine answers every one of them
/// with local fallback scoring.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request did not complete within the configured timeout.
    #[error("remote scorer timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, DNS failure, reset, and the like.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("remote scorer returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The body was not a valid scoring response.
    #[error("malformed response from remote scorer: {0}")]
    Malformed(String),

    /// The response did not score every submitted answer.
    #[error("remote scorer returned {returned} results for {expected} answers")]
    CountMismatch { expected: usize, returned: usize },

    /// A result does not belong to the answer at the same position.
    #[error("remote scorer returned question '{returned}' at position {position}, expected '{expected}'")]
    IdMismatch {
        position: usize,
        expected: String,
        returned: String,
    },

    /// The service was reachable but reported `status: "error"`.
    #[error("remote scorer reported an error: {0}")]
    Logic(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Coarse classification of a remote failure, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailureKind {
    /// Transport-level failure: the service could not give us an answer.
    Unavailable,
    /// The service answered but said it could not score.
    LogicError,
}

impl fmt::Display for RemoteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteFailureKind::Unavailable => write!(f, "remote_unavailable"),
            RemoteFailureKind::LogicError => write!(f, "remote_logic_error"),
        }
    }
}

impl RemoteError {
    pub fn kind(&self) -> RemoteFailureKind {
        match self {
            RemoteError::Logic(_) => RemoteFailureKind::LogicError,
            _ => RemoteFailureKind::Unavailable,
        }
    }
}
