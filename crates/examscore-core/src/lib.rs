//! examscore-core: Scoring engine for free-text exam answers.
//!
//! This crate defines the data model, the lexical similarity function, the
//! local scorer, and the cascade engine that prefers an external scoring
//! service and falls back to local scoring whenever that service fails.

pub mod engine;
pub mod error;
pub mod model;
pub mod scorer;
pub mod similarity;
pub mod statistics;
pub mod submission;
pub mod traits;
pub mod wire;

pub use engine::{CascadeOutcome, ScoringEngine, ServedBy};
pub use error::{RemoteError, RemoteFailureKind, ScoringError};
pub use model::{BatchResult, BatchStatus, QuestionAnswerPair, ScoringOutcome};
pub use scorer::{BatchScorer, LocalScorer};
pub use similarity::{similarity, SimilarityPolicy};
