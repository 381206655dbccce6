use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{body_json, create_router, json_body, test_app, test_state};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_authorize_returns_pkce_request() {
    let app = test_app();

    let response = app
        .oneshot(get("/api/spotify/authorize?redirect_uri=http://localhost:5173/callback"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("client_id=test-client"));
    assert!(url.contains("code_challenge_method=S256"));
    assert!(!body["codeVerifier"].as_str().unwrap().is_empty());
    assert!(!body["state"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_without_code_is_bad_request() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spotify/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(json_body(json!({"code_verifier": "v"})))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing code or code_verifier");
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn test_token_exchange_passes_spotify_response_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at", "token_type": "Bearer", "expires_in": 3600,
            "refresh_token": "rt", "scope": "playlist-read-private"
        })))
        .mount(&server)
        .await;
    let app = create_router(test_state(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spotify/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(json_body(json!({"code": "c", "code_verifier": "v"})))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["access_token"], "at");
    assert_eq!(body["scope"], "playlist-read-private");
}

#[tokio::test]
async fn test_refresh_keeps_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;
    let app = create_router(test_state(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/spotify/refresh")
                .header(header::CONTENT_TYPE, "application/json")
                .body(json_body(json!({"refresh_token": "stale"})))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["details"].is_string());
}

#[tokio::test]
async fn test_callback_redirects_with_code_or_error() {
    let app = test_app();

    let response = app.clone().oneshot(get("/api/spotify/callback?code=abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?spotify_code=abc");

    let response = app.oneshot(get("/api/spotify/callback?error=access_denied")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?error=access_denied");
}

#[tokio::test]
async fn test_user_without_token_is_unauthorized() {
    let app = test_app();

    let response = app.oneshot(get("/api/spotify/user")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Missing access token");
}

#[tokio::test]
async fn test_playlists_forward_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(header_matcher("authorization", "Bearer spotify-at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "p1", "name": "Slow Breaths", "tracks": {"total": 12}}],
            "next": null
        })))
        .mount(&server)
        .await;
    let app = create_router(test_state(&server.uri()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/spotify/playlists")
                .header(header::AUTHORIZATION, "Bearer spotify-at")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["playlists"][0]["id"], "p1");
    assert_eq!(body["playlists"][0]["trackCount"], 12);
}

#[tokio::test]
async fn test_playlist_without_id_is_bad_request() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/spotify/playlist")
                .header(header::AUTHORIZATION, "Bearer spotify-at")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing playlist ID or access token");
}

#[tokio::test]
async fn test_playlist_info_rejects_foreign_links() {
    let app = test_app();

    let response = app
        .oneshot(get("/api/spotify/playlist-info?url=https%3A%2F%2Fexample.com%2Fmusic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid Spotify link");
}

#[tokio::test]
async fn test_playlist_info_falls_back_to_oembed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Deep Rest",
            "thumbnail_url": "https://i.scdn.co/image/abc"
        })))
        .mount(&server)
        .await;
    let app = create_router(test_state(&server.uri()));

    let response = app
        .oneshot(get(
            "/api/spotify/playlist-info?url=https%3A%2F%2Fopen.spotify.com%2Fplaylist%2F37i9dQZF1DX3Ogo9pFvBkY",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "37i9dQZF1DX3Ogo9pFvBkY");
    assert_eq!(body["name"], "Deep Rest");
}
