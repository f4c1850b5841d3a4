//! Mock scoring backend for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examscore_core::error::RemoteError;
use examscore_core::model::{BatchResult, QuestionAnswerPair, ScoringOutcome};
use examscore_core::scorer::final_score;
use examscore_core::traits::ScoringBackend;

enum MockBehaviour {
    /// Award a fixed similarity to every answer.
    Similarity(f64),
    /// Return this result regardless of the request.
    Fixed(BatchResult),
    /// Fail as if the service were unreachable.
    Unavailable(String),
    /// Answer with `status: "error"`.
    LogicError(String),
}

/// A scoring backend that never touches the network.
///
/// Records how often it was called and what it was last asked to score.
pub struct MockBackend {
    behaviour: MockBehaviour,
    call_count: AtomicU32,
    last_request: Mutex<Option<Vec<QuestionAnswerPair>>>,
}

impl MockBackend {
    fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A backend that scores every answer with the same similarity.
    pub fn with_similarity(similarity: f64) -> Self {
        Self::with_behaviour(MockBehaviour::Similarity(similarity.clamp(0.0, 1.0)))
    }

    /// A backend that always returns `result`.
    pub fn with_fixed_result(result: BatchResult) -> Self {
        Self::with_behaviour(MockBehaviour::Fixed(result))
    }

    /// A backend that fails as if the service were down.
    pub fn unavailable(message: &str) -> Self {
        Self::with_behaviour(MockBehaviour::Unavailable(message.to_string()))
    }

    /// A backend that answers with `status: "error"`.
    pub fn logic_error(message: &str) -> Self {
        Self::with_behaviour(MockBehaviour::LogicError(message.to_string()))
    }

    /// Get the number of calls made to this backend.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the pairs from the last call.
    pub fn last_request(&self) -> Option<Vec<QuestionAnswerPair>> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ScoringBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn score_batch(&self, pairs: &[QuestionAnswerPair]) -> anyhow::Result<BatchResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(pairs.to_vec());
        }

        match &self.behaviour {
            MockBehaviour::Similarity(similarity) => Ok(BatchResult::from_outcomes(
                pairs
                    .iter()
                    .map(|pair| ScoringOutcome {
                        question_id: pair.question_id.clone(),
                        similarity_score: *similarity,
                        final_score: final_score(*similarity, pair.max_score),
                        max_score: pair.max_score,
                    })
                    .collect(),
            )),
            MockBehaviour::Fixed(result) => Ok(result.clone()),
            MockBehaviour::Unavailable(message) => {
                Err(RemoteError::Network(message.clone()).into())
            }
            MockBehaviour::LogicError(message) => Err(RemoteError::Logic(message.clone()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<QuestionAnswerPair> {
        vec![
            QuestionAnswerPair::new("q1", "a", "b", 10.0),
            QuestionAnswerPair::new("q2", "c", "d", 4.0),
        ]
    }

    #[tokio::test]
    async fn fixed_similarity() {
        let backend = MockBackend::with_similarity(0.5);
        let result = backend.score_batch(&pairs()).await.unwrap();
        assert_eq!(result.outcomes[0].final_score, 5);
        assert_eq!(result.outcomes[1].final_score, 2);
        assert_eq!(result.total_score, 7);
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.last_request().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failures_are_remote_errors() {
        let down = MockBackend::unavailable("connection refused");
        let err = down.score_batch(&pairs()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemoteError>(),
            Some(RemoteError::Network(_))
        ));

        let broken = MockBackend::logic_error("bad model");
        let err = broken.score_batch(&pairs()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemoteError>(),
            Some(RemoteError::Logic(_))
        ));
    }
}
