use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use somara_domain::health::ComponentStatus;
use somara_domain::testing::MockHealthService;

use super::{app_with_health, body_json};

fn health_request() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check_healthy() {
    let app = app_with_health(Arc::new(MockHealthService::new()));

    let response = app.oneshot(health_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["components"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_health_check_degraded_still_serves() {
    let app = app_with_health(Arc::new(MockHealthService::new().with_degraded_database()));

    let response = app.oneshot(health_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["database"]["status"], "degraded");
    assert!(body["components"]["database"]["message"].is_string());
}

#[tokio::test]
async fn test_health_check_unhealthy_component() {
    let health = MockHealthService::new().with_component(
        "spotify",
        ComponentStatus::Unhealthy,
        Some("Spotify unreachable".to_string()),
    );
    let app = app_with_health(Arc::new(health));

    let response = app.oneshot(health_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["components"]["spotify"]["message"], "Spotify unreachable");
}

#[tokio::test]
async fn test_health_check_needs_no_token() {
    let app = app_with_health(Arc::new(MockHealthService::new()));
    let response = app.oneshot(health_request()).await.unwrap();
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
