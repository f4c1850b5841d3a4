//! JSON request/response envelopes for the scoring endpoint.
//!
//! A missing or mistyped `answers` field is reported as
//! [`ANSWERS_REQUIRED`], not as a serde error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScoringError;
use crate::model::{BatchStatus, QuestionAnswerPair};

/// Error message for a request without an `answers` array.
pub const ANSWERS_REQUIRED: &str = "answers array is required";

/// Error message returned for any unexpected fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Body of a scoring request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub answers: Vec<QuestionAnswerPair>,
}

impl ScoringRequest {
    pub fn new(answers: Vec<QuestionAnswerPair>) -> Self {
        Self { answers }
    }
}

/// Body of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: BatchStatus,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: BatchStatus::Error,
        }
    }

    /// The body sent for unexpected faults. Carries no internal detail.
    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }
}

/// Parse a raw request body into question/answer pairs.
pub fn parse_request(body: &[u8]) -> Result<Vec<QuestionAnswerPair>, ScoringError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ScoringError::InvalidInput(format!("request body is not valid JSON: {e}")))?;
    parse_request_value(value)
}

/// Extract question/answer pairs from an already-parsed request body.
///
/// Fails with [`ScoringError::InvalidInput`] when `answers` is absent, is not
/// an array, or contains an element that is not a well-formed answer.
pub fn parse_request_value(value: Value) -> Result<Vec<QuestionAnswerPair>, ScoringError> {
    let answers = match value {
        Value::Object(mut fields) => fields.remove("answers"),
        _ => None,
    };
    let Some(Value::Array(items)) = answers else {
        return Err(ScoringError::InvalidInput(ANSWERS_REQUIRED.to_string()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| {
                ScoringError::InvalidInput(format!("answers[{i}] is not a valid answer: {e}"))
            })
        })
        .collect()
}
