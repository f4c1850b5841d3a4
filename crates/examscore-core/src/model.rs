//! Core data model types for examscore.
//!
//! Field names follow the JSON wire format shared with the external scoring
//! service, so these types serialize directly into scoring requests and
//! responses.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One question of an exam submission, paired with the user's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswerPair {
    /// Opaque identifier correlating request and response.
    pub question_id: String,
    /// Prompt shown to the user. Context only: never scored, never sent.
    #[serde(skip)]
    pub question_text: String,
    /// The key answer the candidate is compared against.
    #[serde(rename = "key_answer")]
    pub reference_answer: String,
    /// What the user submitted. Missing on the wire means empty.
    #[serde(rename = "student_answer", default)]
    pub candidate_answer: String,
    /// Ceiling for this question's points. Must be positive.
    pub max_score: f64,
}

impl QuestionAnswerPair {
    pub fn new(
        question_id: impl Into<String>,
        reference_answer: impl Into<String>,
        candidate_answer: impl Into<String>,
        max_score: f64,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            question_text: String::new(),
            reference_answer: reference_answer.into(),
            candidate_answer: candidate_answer.into(),
            max_score,
        }
    }

    /// Attach the question prompt.
    pub fn with_question(mut self, question_text: impl Into<String>) -> Self {
        self.question_text = question_text.into();
        self
    }
}

/// Score for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub question_id: String,
    /// Similarity in `[0, 1]`, rounded to 4 decimal places.
    pub similarity_score: f64,
    /// `round(similarity * max_score)`, never above `max_score`.
    #[serde(deserialize_with = "whole_number")]
    pub final_score: u32,
    pub max_score: f64,
}

/// Whether a batch was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Error,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Success => write!(f, "success"),
            BatchStatus::Error => write!(f, "error"),
        }
    }
}

/// Scores for a whole exam submission.
///
/// The same shape is produced by the local orchestrator and returned by the
/// external scoring service, so callers cannot tell which path served it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// One outcome per input pair, in input order.
    #[serde(rename = "results", default)]
    pub outcomes: Vec<ScoringOutcome>,
    #[serde(default, deserialize_with = "whole_number")]
    pub total_score: u64,
    #[serde(default)]
    pub total_max_score: f64,
    pub status: BatchStatus,
    /// Present only when `status` is `error`.
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl BatchResult {
    /// Build a successful result, aggregating totals from the outcomes.
    pub fn from_outcomes(outcomes: Vec<ScoringOutcome>) -> Self {
        let total_score = outcomes.iter().map(|o| u64::from(o.final_score)).sum();
        let total_max_score = outcomes.iter().map(|o| o.max_score).sum();
        Self {
            outcomes,
            total_score,
            total_max_score,
            status: BatchStatus::Success,
            error_detail: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Success
    }

    /// Look up the outcome for a question.
    pub fn outcome(&self, question_id: &str) -> Option<&ScoringOutcome> {
        self.outcomes.iter().find(|o| o.question_id == question_id)
    }
}

/// Accept any non-negative whole JSON number, so `10` and `10.0` both read
/// as 10. Fractional, negative, or out-of-range values are rejected.
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let value = match number.as_u64() {
        Some(v) => v,
        None => match number.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => f as u64,
            _ => {
                return Err(de::Error::custom(format!(
                    "expected a non-negative whole number, got {number}"
                )))
            }
        },
    };
    T::try_from(value).map_err(|_| de::Error::custom(format!("score {value} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, final_score: u32, max_score: f64) -> ScoringOutcome {
        ScoringOutcome {
            question_id: id.into(),
            similarity_score: 0.5,
            final_score,
            max_score,
        }
    }

    #[test]
    fn from_outcomes_aggregates_totals() {
        let result =
            BatchResult::from_outcomes(vec![outcome("q1", 7, 10.0), outcome("q2", 3, 5.0)]);
        assert_eq!(result.total_score, 10);
        assert_eq!(result.total_max_score, 15.0);
        assert!(result.is_success());
        assert!(result.error_detail.is_none());
    }

    #[test]
    fn scores_written_as_floats_are_read() {
        let result: BatchResult = serde_json::from_value(serde_json::json!({
            "results": [
                {"question_id": "q1", "similarity_score": 0.95, "final_score": 10.0, "max_score": 10}
            ],
            "total_score": 10.0,
            "total_max_score": 10,
            "status": "success"
        }))
        .unwrap();
        assert_eq!(result.outcomes[0].final_score, 10);
        assert_eq!(result.total_score, 10);
    }

    #[test]
    fn fractional_or_negative_scores_are_rejected() {
        for bad in [serde_json::json!(7.5), serde_json::json!(-1)] {
            let body = serde_json::json!({
                "question_id": "q1",
                "similarity_score": 0.5,
                "final_score": bad,
                "max_score": 10
            });
            assert!(serde_json::from_value::<ScoringOutcome>(body).is_err());
        }
    }

    #[test]
    fn pair_uses_wire_field_names() {
        let pair = QuestionAnswerPair::new("q1", "The sky is blue", "sky is blue", 10.0)
            .with_question("What colour is the sky?");
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["key_answer"], "The sky is blue");
        assert_eq!(json["student_answer"], "sky is blue");
        assert_eq!(json["max_score"], 10.0);
        assert!(json.get("question_text").is_none());
    }

    #[test]
    fn missing_student_answer_is_empty() {
        let pair: QuestionAnswerPair = serde_json::from_str(
            r#"{"question_id":"q1","key_answer":"photosynthesis","max_score":5}"#,
        )
        .unwrap();
        assert_eq!(pair.candidate_answer, "");
        assert_eq!(pair.max_score, 5.0);
    }

    #[test]
    fn batch_result_uses_wire_field_names() {
        let result = BatchResult::from_outcomes(vec![outcome("q1", 7, 10.0)]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["results"][0]["question_id"], "q1");
        assert_eq!(json["total_score"], 7);
        assert_eq!(json["status"], "success");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_response_without_results_parses() {
        let result: BatchResult =
            serde_json::from_str(r#"{"status":"error","error":"model not loaded"}"#).unwrap();
        assert!(!result.is_success());
        assert!(result.outcomes.is_empty());
        assert_eq!(result.error_detail.as_deref(), Some("model not loaded"));
    }
}
