//! Token relay: hands out client-credentials bearer tokens without exposing the
//! client secret to callers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use log::{debug, error, info};
use reqwest::header::CONTENT_TYPE;
use rspotify::Credentials;
use serde_json::{Value, json};

use crate::clients::errors::{Error, Result};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Shared state of the relay handlers
#[derive(Clone)]
pub struct RelayState {
    http: reqwest::Client,
    credentials: Arc<Credentials>,
    token_url: String,
}

impl RelayState {
    pub fn new(http: reqwest::Client, credentials: Credentials, token_url: &str) -> Self {
        RelayState {
            http,
            credentials: Arc::new(credentials),
            token_url: token_url.to_string(),
        }
    }

    /// Exchange the held credentials for a token and return the upstream JSON untouched.
    pub async fn exchange(&self) -> Result<Value> {
        let headers = self.credentials.auth_headers().ok_or_else(|| {
            Error::ConfigurationError("Spotify client secret is not configured".into())
        })?;

        let mut request = self
            .http
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials");
        for (name, value) in headers {
            request = request.header(name, value);
        }

        debug!("POST {}", self.token_url);
        let response = request.send().await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn spotify_token(State(state): State<RelayState>) -> (StatusCode, Json<Value>) {
    match state.exchange().await {
        Ok(payload) => (StatusCode::OK, Json(payload)),
        Err(e) => {
            error!("Error fetching Spotify token: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch token" })),
            )
        }
    }
}

pub fn build_router(state: RelayState) -> Router {
    Router::new()
        .route("/api/spotify-token", get(spotify_token))
        .with_state(state)
}

pub async fn serve(bind: &str, state: RelayState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Token relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
