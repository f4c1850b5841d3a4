//! Trait seam for scoring backends other than the local scorer.
//!
//! Implemented by the HTTP client in `examscore-remote`.

use async_trait::async_trait;

use crate::model::{BatchResult, QuestionAnswerPair};

/// A service that can score an entire submission in one call.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Score all pairs in a single round trip.
    ///
    /// Failures should be [`crate::error::RemoteError`] values wrapped in
    /// `anyhow` so the engine can classify them.
    async fn score_batch(&self, pairs: &[QuestionAnswerPair]) -> anyhow::Result<BatchResult>;
}
