//! Router behaviour that does not need a database.
//!
//! Requests are driven with `tower::ServiceExt::oneshot` against the full
//! middleware stack over a pool that never connects.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chequealo_integration_tests::app_without_database;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

async fn send(request: Request<Body>) -> axum::response::Response {
    app_without_database().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_is_ok_with_security_headers() {
    let response = send(get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "chq-abc-123")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "chq-abc-123");
}

#[tokio::test]
async fn test_profile_requires_login() {
    let response = send(get("/api/me")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Login required");
}

#[tokio::test]
async fn test_review_submission_requires_login() {
    let body = serde_json::json!({ "rating": 5, "comment": "Excelente servicio" });
    let response = send(post_json("/api/shops/1/reviews", &body)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_login() {
    let response = send(post_json("/api/admin/claims/1/approve", &serde_json::json!({}))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(get("/api/admin/summary")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_rejects_out_of_range_coordinates() {
    let response = send(get("/api/shops?lat=95.0&lng=-69.9")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_listing_rejects_half_given_coordinates() {
    let response = send(get("/api/shops?lat=18.5")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "lat and lng must be given together");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = send(get("/api/garages")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_peer_address_keys_the_rate_limiter() {
    // No proxy headers: the limiter must key on the connection's peer address
    // and let the request through to the handler.
    let request = Request::builder()
        .method("POST")
        .uri("/api/location")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_auth_burst_is_throttled_per_client() {
    let app = app_without_database();
    let login = || {
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("x-forwarded-for", "190.166.4.2")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..5 {
        let response = app.clone().oneshot(login()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    let response = app.clone().oneshot(login()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_client = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other_client).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}
