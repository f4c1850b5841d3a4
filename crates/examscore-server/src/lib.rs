//! examscore-server: HTTP front end for the cascade scoring engine.
//!
//! Exposes `POST /api/score-exam` and `GET /health`. Every successful
//! response says which path produced it in the `x-scored-by` header.

mod error;
pub mod scoring;

use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{extract::State, Json, Router};
use examscore_core::engine::ScoringEngine;
use examscore_core::error::ScoringError;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Response header naming the path that scored the batch.
pub const SCORED_BY_HEADER: &str = "x-scored-by";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScoringEngine>,
}

impl AppState {
    pub fn new(engine: ScoringEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "remote": state.engine.has_remote(),
    }))
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    ApiError(ScoringError::Internal("request handler panicked".to_string())).into_response()
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .merge(scoring::router())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().context("listener has no address")?;
    tracing::info!(addr = %local, remote = state.engine.has_remote(), "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
