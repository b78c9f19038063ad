//! Token relay behaviour against a fake accounts service

mod common;

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    routing::{get, post},
};
use concertq::clients::token;
use concertq::relay::{RelayState, build_router};
use http_body_util::BodyExt;
use rspotify::Credentials;
use serde_json::{Value, json};
use tower::ServiceExt;

const EXPECTED_AUTH: &str = "Basic dGVzdC1pZDp0ZXN0LXNlY3JldA==";

fn token_payload() -> Value {
    json!({
        "access_token": "BQC4YqJg",
        "token_type": "Bearer",
        "expires_in": 3600
    })
}

// Fake accounts service that only hands out a token for the test credentials
fn accounts() -> Router {
    Router::new().route(
        "/api/token",
        post(|headers: HeaderMap, body: String| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if auth == EXPECTED_AUTH
                && content_type == "application/x-www-form-urlencoded"
                && body == "grant_type=client_credentials"
            {
                (StatusCode::OK, Json(token_payload()))
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_client" })),
                )
            }
        }),
    )
}

fn relay_state(token_url: &str, secret: &str) -> RelayState {
    RelayState::new(
        reqwest::Client::new(),
        Credentials::new("test-id", secret),
        token_url,
    )
}

async fn call_relay(state: RelayState) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri("/api/spotify-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn relays_upstream_token_unchanged() {
    let upstream = common::spawn(accounts()).await;
    let state = relay_state(&format!("{upstream}/api/token"), "test-secret");

    let (status, body) = call_relay(state).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, token_payload());
}

#[tokio::test]
async fn upstream_error_json_is_passed_through() {
    let upstream = common::spawn(accounts()).await;
    let state = relay_state(&format!("{upstream}/api/token"), "wrong-secret");

    let (status, body) = call_relay(state).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "invalid_client" }));
}

#[tokio::test]
async fn unreachable_upstream_returns_fixed_error() {
    let upstream = common::closed_url().await;
    let state = relay_state(&format!("{upstream}/api/token"), "test-secret");

    let (status, body) = call_relay(state).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch token" }));
}

#[tokio::test]
async fn non_json_upstream_returns_fixed_error() {
    let upstream = common::spawn(Router::new().route(
        "/api/token",
        post(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
    ))
    .await;
    let state = relay_state(&format!("{upstream}/api/token"), "test-secret");

    let (status, body) = call_relay(state).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch token" }));
}

#[tokio::test]
async fn token_is_loaded_through_a_running_relay() {
    let upstream = common::spawn(accounts()).await;
    let relay = common::spawn(build_router(relay_state(
        &format!("{upstream}/api/token"),
        "test-secret",
    )))
    .await;

    let loaded = token::fetch_from_relay(&reqwest::Client::new(), &relay)
        .await
        .unwrap();

    assert_eq!(loaded.access_token, "BQC4YqJg");
    assert!(!loaded.is_expired());
}

#[tokio::test]
async fn relay_without_token_is_an_error() {
    let upstream = common::spawn(accounts()).await;
    let relay = common::spawn(build_router(relay_state(
        &format!("{upstream}/api/token"),
        "wrong-secret",
    )))
    .await;

    let result = token::fetch_from_relay(&reqwest::Client::new(), &relay).await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("invalid_client"), "unexpected error: {err}");
}

#[tokio::test]
async fn oversized_token_lifetime_is_capped() {
    let relay = common::spawn(Router::new().route(
        "/api/spotify-token",
        get(|| async {
            Json(json!({ "access_token": "BQC4YqJg", "expires_in": i64::MAX }))
        }),
    ))
    .await;

    let loaded = token::fetch_from_relay(&reqwest::Client::new(), &relay)
        .await
        .unwrap();

    assert!(!loaded.is_expired());
    assert!(loaded.expires_at <= chrono::Utc::now().timestamp() + 24 * 60 * 60);
}
