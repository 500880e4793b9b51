//! Liveness plus a round trip to the session store.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    /// `ok` or `unavailable`.
    pub store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

/// GET /health. Answers 503 while the store cannot be reached.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let store_error = state.repository.ping().await.err().map(|e| {
        warn!(error = %e, "session store failed health check");
        e.to_string()
    });
    let (code, status, store) = if store_error.is_none() {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        code,
        Json(HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store,
            store_error,
        }),
    )
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
