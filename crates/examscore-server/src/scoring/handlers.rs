use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use examscore_core::wire;

use crate::error::ApiError;
use crate::{AppState, SCORED_BY_HEADER};

/// `POST /api/score-exam`.
///
/// The body is taken as raw bytes so malformed JSON gets the same
/// `{error, status}` envelope as a missing `answers` field.
pub async fn post_score_exam(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let pairs = wire::parse_request(&body)?;
    let outcome = state.engine.score(&pairs).await?;

    if let Some(reason) = &outcome.fallback_reason {
        tracing::debug!(%reason, "served by local fallback");
    }

    Ok((
        [(SCORED_BY_HEADER, outcome.served_by.to_string())],
        Json(outcome.result),
    )
        .into_response())
}
