//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use epoch_core::generator::EventGenerator;
use epoch_core::repository::SessionRepository;
use epoch_session::domain::settings::{DecisionPolicy, SessionDefaults};
use epoch_store::memory::InMemorySessionRepository;
use epoch_test_support::{FixedClock, RecordingEventGenerator};
use http_body_util::BodyExt;
use tower::ServiceExt;

use epoch_api::state::AppState;

/// Handles to the collaborators behind a test app.
pub struct TestApp {
    pub repository: Arc<InMemorySessionRepository>,
    pub generator: Arc<RecordingEventGenerator>,
    state: AppState,
}

impl TestApp {
    /// A fresh router over the shared state. Each request consumes one.
    pub fn router(&self) -> Router {
        epoch_api::app(self.state.clone())
    }
}

/// Build the full app over an in-memory store, a recording generator, and
/// a fixed clock.
pub fn build_test_app() -> TestApp {
    build_test_app_with_policy(DecisionPolicy::Overwrite)
}

/// As [`build_test_app`], with an explicit decision policy.
pub fn build_test_app_with_policy(policy: DecisionPolicy) -> TestApp {
    let repository = Arc::new(InMemorySessionRepository::new());
    let generator = Arc::new(RecordingEventGenerator::new());
    let state = AppState::new(
        Arc::clone(&repository) as Arc<dyn SessionRepository>,
        Arc::clone(&generator) as Arc<dyn EventGenerator>,
        Arc::new(FixedClock::standard()),
        policy,
        SessionDefaults::default(),
    );
    TestApp {
        repository,
        generator,
        state,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
