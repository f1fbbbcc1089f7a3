//! Router tests
//!
//! Drive the application router in-process, without binding a socket.
//!
//! Run with: cargo test -p nick-integration-tests --test router_tests

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use nick_api::middleware::REQUEST_ID_HEADER;
use nick_api::{create_app, AppState};
use nick_integration_tests::{test_config, Engine, InMemoryPlatform, TEST_TOKEN};
use nick_service::ServiceContext;
use serde_json::Value;
use tower::ServiceExt;

fn app(engine: &Engine) -> Router {
    let ctx = ServiceContext::new(
        engine.platform.clone(),
        engine.store.clone(),
        engine.documents.clone(),
    );
    create_app(AppState::new(ctx, test_config(&engine.template()).unwrap()))
}

fn engine() -> Engine {
    let platform = InMemoryPlatform::new();
    platform.add_guild("42", 10).add_admin("42", "500", 20);
    Engine::new(platform).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let engine = engine();
    let response = app(&engine)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let engine = engine();
    let response = app(&engine)
        .oneshot(
            Request::get("/health")
                .header(REQUEST_ID_HEADER, "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");
}

#[tokio::test]
async fn test_unknown_route() {
    let engine = engine();
    let response = app(&engine)
        .oneshot(Request::get("/api/v1/guilds").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body() {
    let engine = engine();
    let response = app(&engine)
        .oneshot(
            Request::post("/api/v1/guilds/42/nicknames/mass")
                .header("Authorization", format!("Bot {TEST_TOKEN}"))
                .header("X-Actor-Id", "500")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_BODY");
    assert!(engine.platform.renames().is_empty());
}

#[tokio::test]
async fn test_gate_runs_before_the_command() {
    let engine = engine();
    let response = app(&engine)
        .oneshot(
            Request::post("/api/v1/guilds/42/nicknames/snapshot")
                .header("Authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "INVALID_CREDENTIALS"
    );
    assert!(!engine.active_path("42").exists());
}

#[tokio::test]
async fn test_state_is_shared_between_requests() {
    let engine = engine();
    engine.platform.add_member("42", "1", Some("Bob"), 1);
    let app = app(&engine);

    let request = || {
        Request::post("/api/v1/guilds/42/nicknames/snapshot")
            .header("Authorization", format!("Bearer {TEST_TOKEN}"))
            .header("X-Actor-Id", "500")
            .body(Body::empty())
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = app.oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);

    assert_eq!(
        std::fs::read(engine.active_path("42")).unwrap(),
        br#"{"1":"Bob"}"#
    );
}
