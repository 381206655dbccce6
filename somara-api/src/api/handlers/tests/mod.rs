mod cors_test;
mod health_test;
mod spotify_test;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use chrono::Duration;
use serde_json::Value;

use somara_domain::auth::token::generate_token;
use somara_domain::auth::{AuthConfig, DEFAULT_AUDIENCE};
use somara_domain::spotify::{SpotifyClient, SpotifyConfig};
use somara_domain::testing::{create_mock_class_service, create_mock_health_service, create_mock_profile_service};

use crate::api::routes::{create_router, AppState, HealthServiceRef};

const TEST_SECRET: &str = "handler-test-secret";
/// Nothing listens here; Spotify calls that escape a test fail fast
const UNUSED_SPOTIFY: &str = "http://127.0.0.1:9";

pub(super) fn test_auth() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(TEST_SECRET.to_string()),
        audience: DEFAULT_AUDIENCE.to_string(),
        issuer: None,
        bypass: false,
    }
}

pub(super) fn test_state(spotify_base: &str) -> AppState {
    let spotify = SpotifyClient::new(SpotifyConfig::with_base_url("test-client", spotify_base))
        .expect("spotify client should build");
    AppState {
        classes: Arc::new(create_mock_class_service()),
        profiles: Arc::new(create_mock_profile_service()),
        health: Arc::new(create_mock_health_service()),
        spotify: Arc::new(spotify),
        auth: Arc::new(test_auth()),
    }
}

pub(super) fn test_app() -> Router {
    create_router(test_state(UNUSED_SPOTIFY))
}

pub(super) fn app_with_health(health: HealthServiceRef) -> Router {
    let mut state = test_state(UNUSED_SPOTIFY);
    state.health = health;
    create_router(state)
}

pub(super) fn bearer_for(user_id: &str) -> String {
    let token = generate_token(user_id, None, Duration::hours(1), &test_auth()).expect("token should sign");
    format!("Bearer {}", token)
}

pub(super) fn authed(method: &str, uri: &str, user_id: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer_for(user_id))
}

pub(super) fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub(super) async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
