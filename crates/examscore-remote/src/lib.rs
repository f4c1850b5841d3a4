//! examscore-remote: External scoring service integration.
//!
//! Implements the `ScoringBackend` trait over HTTP for the external scoring
//! service, and builds the cascade engine from configuration.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{build_engine, create_backend, load_config, ExamscoreConfig, RemoteConfig};
pub use examscore_core::error::RemoteError;
pub use http::HttpScorer;
