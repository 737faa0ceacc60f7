mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

use bastion::{
    middleware::recovery::handle_panic,
    router::init_router,
    state::AppState,
    testing::{StalledUserStore, test_config},
};
use bastion_cache::MemoryCache;
use common::{TestApp, get, login_request};

#[tokio::test]
async fn test_slow_request_hits_deadline() {
    let mut config = test_config();
    config.server.request_timeout_ms = 50;
    let state = AppState::new(config, Arc::new(StalledUserStore), Arc::new(MemoryCache::new()));
    let app = init_router(state, None);

    let response = app
        .oneshot(login_request("admin@example.com", "123456"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], 1015);
}

#[tokio::test]
async fn test_panic_becomes_internal_error() {
    async fn explode() -> &'static str {
        panic!("boom")
    }
    let app = Router::new()
        .route("/explode", axum::routing::get(explode))
        .layer(CatchPanicLayer::custom(handle_panic));

    let response = app.oneshot(get("/explode")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], 1000);
    assert!(!body.to_string().contains("boom"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/v1/hello")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.headers.get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn test_cors_exposes_refresh_header() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/v1/hello")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(
        response.headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
    let exposed = response
        .headers
        .get("access-control-expose-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("new-token"), "{exposed}");
}
