//! Shared test helpers for API integration tests.
//!
//! Every test builds its own app; nothing is shared between tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use casework_core::repository::EventRepository;
use casework_event_store::pg_event_repository::PgEventRepository;
use casework_test_support::{FixedClock, InMemoryEventRepository};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use casework_api::extract::USER_ID_HEADER;
use casework_api::state::AppState;

/// Build the full app router over the given event store with a fixed clock.
/// Uses the same route structure as `main.rs`.
pub fn build_app_with(event_repository: Arc<dyn EventRepository>) -> Router {
    let app_state = AppState::new(Arc::new(FixedClock::default()), event_repository);
    casework_api::router().with_state(app_state)
}

/// Build the app over a fresh in-memory event store, returning the store so
/// tests can seed or inspect it.
pub fn build_test_app() -> (Router, Arc<InMemoryEventRepository>) {
    let repo = Arc::new(InMemoryEventRepository::new());
    (build_app_with(repo.clone()), repo)
}

/// Build the app over a real `PgEventRepository`.
pub fn build_pg_test_app(pool: PgPool) -> Router {
    build_app_with(Arc::new(PgEventRepository::new(pool)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json_as(app, uri, None, body).await
}

/// Send a POST request with a JSON body on behalf of `acting_user`.
pub async fn post_json_as(
    app: Router,
    uri: &str,
    acting_user: Option<uuid::Uuid>,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = acting_user {
        builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    let request = builder
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

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
