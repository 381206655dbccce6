use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;

use super::test_app;

fn preflight(uri: &str, method: &str, headers: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, headers)
        .body(Body::empty())
        .unwrap()
}

fn allowed(response: &axum::response::Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[tokio::test]
async fn test_preflight_allows_class_patch() {
    let response = test_app()
        .oneshot(preflight("/api/v1/classes/c1", "PATCH", "authorization,content-type"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(allowed(&response, header::ACCESS_CONTROL_ALLOW_METHODS).contains("patch"));
    assert!(allowed(&response, header::ACCESS_CONTROL_ALLOW_HEADERS).contains("authorization"));
}

#[tokio::test]
async fn test_preflight_allows_spotify_refresh_header() {
    let response = test_app()
        .oneshot(preflight(
            "/api/spotify/playlist?id=p1",
            "GET",
            "authorization,x-spotify-refresh-token",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(allowed(&response, header::ACCESS_CONTROL_ALLOW_HEADERS).contains("x-spotify-refresh-token"));
}
