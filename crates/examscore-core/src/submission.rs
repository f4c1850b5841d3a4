//! Exam submission: score a user's answers and record the result.
//!
//! Storage and identity are ports. The service is handed a [`ResultStore`]
//! and a [`UserIdentity`]; the scoring engine itself never sees either.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::engine::{ScoringEngine, ServedBy};
use crate::error::ScoringError;
use crate::model::QuestionAnswerPair;
use crate::statistics::{percentage, Grade};

/// A learning module exams belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
}

/// One free-text exam question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub module_id: String,
    pub question: String,
    pub key_answer: String,
    pub max_score: f64,
}

/// The signed-in user, as supplied by the authentication layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UserIdentity {
    /// Display name, else the local part of the e-mail, else "User".
    pub fn effective_display_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("User")
            .to_string()
    }
}

/// A scored answer inside an [`ExamResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResultAnswer {
    pub question_id: String,
    pub question: String,
    pub user_answer: String,
    pub key_answer: String,
    pub max_score: f64,
    pub similarity_score: f64,
    pub final_score: u32,
}

/// A user's scored submission for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: Uuid,
    pub user_id: String,
    pub user_display_name: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub module_id: String,
    pub module_title: String,
    pub submitted_at: DateTime<Utc>,
    pub total_score: u64,
    pub answers: Vec<ExamResultAnswer>,
}

impl ExamResult {
    pub fn total_max_score(&self) -> f64 {
        self.answers.iter().map(|a| a.max_score).sum()
    }

    pub fn percentage(&self) -> u32 {
        percentage(self.total_score, self.total_max_score())
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage())
    }
}

/// Where exam results are kept.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save(&self, result: &ExamResult) -> Result<()>;

    /// All results for a user, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExamResult>>;
}

/// Process-local [`ResultStore`].
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: RwLock<Vec<ExamResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save(&self, result: &ExamResult) -> Result<()> {
        self.results.write().await.push(result.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ExamResult>> {
        let mut results: Vec<ExamResult> = self
            .results
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }
}

/// A recorded submission together with the scoring path that served it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub result: ExamResult,
    pub served_by: ServedBy,
}

/// Scores exam submissions and stores the results.
pub struct SubmissionService {
    engine: Arc<ScoringEngine>,
    store: Arc<dyn ResultStore>,
}

impl SubmissionService {
    pub fn new(engine: Arc<ScoringEngine>, store: Arc<dyn ResultStore>) -> Self {
        Self { engine, store }
    }

    /// Score `answers` (keyed by exam id) for a module's exams and save the
    /// result. Unanswered questions are scored as empty answers.
    pub async fn submit(
        &self,
        user: &UserIdentity,
        module: &Module,
        exams: &[Exam],
        answers: &HashMap<String, String>,
    ) -> Result<Submission> {
        if exams.is_empty() {
            return Err(ScoringError::InvalidInput(format!(
                "module '{}' has no exam questions",
                module.id
            ))
            .into());
        }

        let pairs: Vec<QuestionAnswerPair> = exams
            .iter()
            .map(|exam| {
                QuestionAnswerPair::new(
                    exam.id.clone(),
                    exam.key_answer.clone(),
                    answers.get(&exam.id).cloned().unwrap_or_default(),
                    exam.max_score,
                )
                .with_question(exam.question.clone())
            })
            .collect();

        let outcome = self.engine.score(&pairs).await?;
        let batch = outcome.result;

        let scored = pairs
            .into_iter()
            .map(|pair| {
                let scored = batch.outcome(&pair.question_id).ok_or_else(|| {
                    ScoringError::Internal(format!(
                        "no score returned for question '{}'",
                        pair.question_id
                    ))
                })?;
                Ok(ExamResultAnswer {
                    question_id: pair.question_id,
                    question: pair.question_text,
                    user_answer: pair.candidate_answer,
                    key_answer: pair.reference_answer,
                    max_score: pair.max_score,
                    similarity_score: scored.similarity_score,
                    final_score: scored.final_score,
                })
            })
            .collect::<Result<Vec<_>, ScoringError>>()?;

        let result = ExamResult {
            id: Uuid::new_v4(),
            user_id: user.uid.clone(),
            user_display_name: user.effective_display_name(),
            user_email: user.email.clone().unwrap_or_default(),
            user_avatar: user.photo_url.clone(),
            module_id: module.id.clone(),
            module_title: module.title.clone(),
            submitted_at: Utc::now(),
            total_score: batch.total_score,
            answers: scored,
        };

        self.store
            .save(&result)
            .await
            .with_context(|| format!("failed to save exam result {}", result.id))?;

        tracing::info!(
            result_id = %result.id,
            user_id = %result.user_id,
            module_id = %result.module_id,
            total_score = result.total_score,
            served_by = %outcome.served_by,
            "exam submitted"
        );

        Ok(Submission {
            result,
            served_by: outcome.served_by,
        })
    }

    /// A user's history, newest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<ExamResult>> {
        self.store.list_for_user(user_id).await
    }
}
