use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use examscore_core::error::ScoringError;
use examscore_core::wire::ErrorBody;

pub struct ApiError(pub ScoringError);

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = if self.0.is_client_error() {
            tracing::debug!(error = %self.0, "rejected scoring request");
            (StatusCode::BAD_REQUEST, ErrorBody::new(self.0.to_string()))
        } else {
            tracing::error!(error = %self.0, "scoring request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        };

        (status, Json(body)).into_response()
    }
}
