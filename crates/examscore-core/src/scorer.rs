//! Local scoring: one question at a time, and whole submissions.

use crate::error::ScoringError;
use crate::model::{BatchResult, QuestionAnswerPair, ScoringOutcome};
use crate::similarity::{similarity, SimilarityPolicy};

/// Scores a single question/answer pair against its reference answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer {
    policy: SimilarityPolicy,
}

impl LocalScorer {
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SimilarityPolicy {
        self.policy
    }

    /// Score one pair.
    ///
    /// An empty or nonsensical answer simply scores low. The only error is a
    /// `max_score` that is not a positive, finite number.
    pub fn score(&self, pair: &QuestionAnswerPair) -> Result<ScoringOutcome, ScoringError> {
        validate_pair(pair)?;
        let s = similarity(&pair.reference_answer, &pair.candidate_answer, self.policy);

        Ok(ScoringOutcome {
            question_id: pair.question_id.clone(),
            similarity_score: round_to_places(s, 4),
            final_score: final_score(s, pair.max_score),
            max_score: pair.max_score,
        })
    }
}

/// Check the `max_score > 0` invariant of one pair.
pub fn validate_pair(pair: &QuestionAnswerPair) -> Result<(), ScoringError> {
    if pair.max_score.is_finite() && pair.max_score > 0.0 {
        Ok(())
    } else {
        Err(ScoringError::InvalidMaxScore {
            question_id: pair.question_id.clone(),
            max_score: pair.max_score,
        })
    }
}

/// `round(similarity * max_score)`, rounding halves away from zero.
///
/// Capped at `floor(max_score)` so a fractional maximum such as 2.5 can never
/// award 3 points.
pub fn final_score(similarity: f64, max_score: f64) -> u32 {
    let points = (similarity.clamp(0.0, 1.0) * max_score).round();
    points.min(max_score.floor()).max(0.0) as u32
}

fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Scores a full submission with a [`LocalScorer`].
///
/// This is the fallback path of the cascade, so it has no I/O and cannot fail
/// except on a violated pair invariant.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchScorer {
    scorer: LocalScorer,
}

impl BatchScorer {
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self {
            scorer: LocalScorer::new(policy),
        }
    }

    pub fn policy(&self) -> SimilarityPolicy {
        self.scorer.policy()
    }

    /// Score every pair in order and aggregate the totals.
    pub fn score_batch(&self, pairs: &[QuestionAnswerPair]) -> Result<BatchResult, ScoringError> {
        let outcomes = pairs
            .iter()
            .map(|pair| self.scorer.score(pair))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BatchResult::from_outcomes(outcomes))
    }
}
