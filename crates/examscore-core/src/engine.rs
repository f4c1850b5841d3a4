//! Cascade scoring engine.
//!
//! Tries the remote scoring backend once and falls back to local scoring on
//! any failure, so an exam submission always gets a score.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, ScoringError};
use crate::model::{BatchResult, QuestionAnswerPair};
use crate::scorer::{validate_pair, BatchScorer};
use crate::traits::ScoringBackend;

/// Which path produced a [`BatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServedBy {
    Remote,
    Local,
}

impl fmt::Display for ServedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServedBy::Remote => write!(f, "remote"),
            ServedBy::Local => write!(f, "local"),
        }
    }
}

/// Result of a cascade run, with provenance for logging.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub result: BatchResult,
    pub served_by: ServedBy,
    /// Why the remote result was not used. `None` when the remote served, or
    /// when no remote backend is configured.
    pub fallback_reason: Option<String>,
}

/// The central scoring engine.
pub struct ScoringEngine {
    remote: Option<Arc<dyn ScoringBackend>>,
    local: BatchScorer,
}

impl ScoringEngine {
    pub fn new(remote: Option<Arc<dyn ScoringBackend>>, local: BatchScorer) -> Self {
        Self { remote, local }
    }

    /// An engine that never leaves the process.
    pub fn local_only(local: BatchScorer) -> Self {
        Self::new(None, local)
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn local(&self) -> &BatchScorer {
        &self.local
    }

    /// Score a submission.
    ///
    /// Pairs are validated first, so an invalid submission never reaches the
    /// remote backend. The remote backend then gets exactly one attempt. A
    /// successful response that covers every pair is returned verbatim;
    /// anything else is logged and answered by the local scorer over the
    /// same pairs.
    pub async fn score(&self, pairs: &[QuestionAnswerPair]) -> Result<CascadeOutcome, ScoringError> {
        pairs.iter().try_for_each(validate_pair)?;

        let Some(remote) = &self.remote else {
            return self.score_locally(pairs, None);
        };

        let start = Instant::now();
        let attempt = match remote.score_batch(pairs).await {
            Ok(result) => accept(result, pairs).map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match attempt {
            Ok(result) => {
                tracing::info!(
                    backend = remote.name(),
                    served_by = %ServedBy::Remote,
                    questions = pairs.len(),
                    total_score = result.total_score,
                    elapsed_ms,
                    "batch scored"
                );
                Ok(CascadeOutcome {
                    result,
                    served_by: ServedBy::Remote,
                    fallback_reason: None,
                })
            }
            Err(e) => {
                let class = e
                    .downcast_ref::<RemoteError>()
                    .map(|r| r.kind().to_string())
                    .unwrap_or_else(|| "unclassified".to_string());
                tracing::warn!(
                    backend = remote.name(),
                    class = %class,
                    elapsed_ms,
                    "remote scoring failed, using local fallback: {e:#}"
                );
                self.score_locally(pairs, Some(format!("{e:#}")))
            }
        }
    }

    /// Score a submission and drop the provenance.
    pub async fn score_batch(&self, pairs: &[QuestionAnswerPair]) -> Result<BatchResult, ScoringError> {
        Ok(self.score(pairs).await?.result)
    }

    fn score_locally(
        &self,
        pairs: &[QuestionAnswerPair],
        fallback_reason: Option<String>,
    ) -> Result<CascadeOutcome, ScoringError> {
        let result = self.local.score_batch(pairs)?;
        tracing::info!(
            served_by = %ServedBy::Local,
            policy = %self.local.policy(),
            questions = pairs.len(),
            total_score = result.total_score,
            "batch scored"
        );
        Ok(CascadeOutcome {
            result,
            served_by: ServedBy::Local,
            fallback_reason,
        })
    }
}

/// Decide whether a backend response can be returned as-is.
///
/// Outcomes must line up with `pairs` one to one, in order.
fn accept(result: BatchResult, pairs: &[QuestionAnswerPair]) -> Result<BatchResult, RemoteError> {
    if !result.is_success() {
        return Err(RemoteError::Logic(
            result
                .error_detail
                .unwrap_or_else(|| "no error detail".to_string()),
        ));
    }
    if result.outcomes.len() != pairs.len() {
        return Err(RemoteError::CountMismatch {
            expected: pairs.len(),
            returned: result.outcomes.len(),
        });
    }
    let misplaced = pairs
        .iter()
        .zip(&result.outcomes)
        .position(|(pair, outcome)| pair.question_id != outcome.question_id);
    if let Some(position) = misplaced {
        return Err(RemoteError::IdMismatch {
            position,
            expected: pairs[position].question_id.clone(),
            returned: result.outcomes[position].question_id.clone(),
        });
    }
    Ok(result)
}
