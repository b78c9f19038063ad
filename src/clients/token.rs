use std::path::PathBuf;

use chrono::Utc;
use log::debug;
use rspotify::{ClientCredsSpotify, Credentials, prelude::*};
use serde::{Deserialize, Serialize};

use crate::clients::errors::{Error, Result};

// Shaved off the upstream lifetime so a token is never used in its last minute
const EXPIRY_MARGIN_SECS: i64 = 60;
// Client-credentials tokens live an hour; never trust a reported lifetime past a day
const MAX_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Token payload as returned by the relay (the upstream JSON, verbatim).
#[derive(Deserialize, Debug)]
struct RelayTokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<serde_json::Value>,
}

/// A bearer token and the unix time it stops being valid
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: i64,
}

impl CachedToken {
    pub fn new(access_token: String, expires_in: i64) -> Self {
        let lifetime = expires_in.clamp(0, MAX_LIFETIME_SECS) - EXPIRY_MARGIN_SECS;
        CachedToken {
            access_token,
            expires_at: Utc::now().timestamp().saturating_add(lifetime),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }
}

/// Fetch a token through the relay's `/api/spotify-token` endpoint.
pub async fn fetch_from_relay(http: &reqwest::Client, relay_url: &str) -> Result<CachedToken> {
    let url = format!("{}/api/spotify-token", relay_url.trim_end_matches('/'));
    debug!("Loading token from relay {url}");
    let response = http.get(&url).send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    let payload: RelayTokenResponse = serde_json::from_slice(&bytes)?;

    match payload.access_token {
        Some(token) if !token.is_empty() => {
            Ok(CachedToken::new(token, payload.expires_in.unwrap_or(3600)))
        }
        _ => Err(Error::UnexpectedResponse(format!(
            "Relay returned {status} without an access token: {}",
            payload
                .error
                .map_or_else(|| String::from_utf8_lossy(&bytes).to_string(), |e| e.to_string())
        ))),
    }
}

/// Run the client-credentials grant locally, without a relay.
pub async fn request_direct(credentials: Credentials) -> Result<CachedToken> {
    debug!("Requesting client-credentials token from Spotify ...");
    let spotify = ClientCredsSpotify::new(credentials);
    spotify.request_token().await?;

    let token = spotify.get_token();
    let guard = token
        .lock()
        .await
        .map_err(|_| Error::UnexpectedResponse("Spotify token lock poisoned".into()))?;
    let token = guard
        .as_ref()
        .ok_or_else(|| Error::UnexpectedResponse("Spotify returned no token".into()))?;

    Ok(CachedToken::new(
        token.access_token.clone(),
        token.expires_in.num_seconds(),
    ))
}

// Result of loading a cached token from local storage
pub enum CachedTokenResult {
    Cached(CachedToken),
    NotFound,
    Expired,
    Error(Error),
}

/// Keeps the last loaded token between runs in a small JSON file.
pub struct TokenCache {
    path: PathBuf,
}

impl Default for TokenCache {
    fn default() -> Self {
        let path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".concertq_token");
        TokenCache { path }
    }
}

impl TokenCache {
    pub fn new(path: PathBuf) -> Self {
        TokenCache { path }
    }

    pub async fn store(&self, token: &CachedToken) -> Result<()> {
        let contents = serde_json::to_string(token)?;
        tokio::fs::write(&self.path, contents).await?;
        debug!("Stored Spotify token in cache in {:?}", self.path);
        Ok(())
    }

    pub async fn load(&self) -> CachedTokenResult {
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("No cached Spotify token found in {:?}", self.path);
                return CachedTokenResult::NotFound;
            }
            Err(e) => return CachedTokenResult::Error(Error::from(e)),
        }

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => return CachedTokenResult::Error(Error::from(e)),
        };
        match serde_json::from_str::<CachedToken>(&contents) {
            Ok(token) if token.is_expired() => {
                debug!("Cached Spotify token expired at {}", token.expires_at);
                CachedTokenResult::Expired
            }
            Ok(token) => CachedTokenResult::Cached(token),
            Err(e) => CachedTokenResult::Error(Error::from(e)),
        }
    }

    /// The cached access token, or `TokenNotLoaded` when none is usable.
    pub async fn access_token(&self) -> Result<String> {
        match self.load().await {
            CachedTokenResult::Cached(token) => Ok(token.access_token),
            CachedTokenResult::NotFound | CachedTokenResult::Expired => Err(Error::TokenNotLoaded),
            CachedTokenResult::Error(e) => {
                debug!("Failed to read cached Spotify token: {e}");
                Err(Error::TokenNotLoaded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(name: &str) -> TokenCache {
        let path = std::env::temp_dir().join(format!(
            "concertq-test-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        TokenCache::new(path)
    }

    #[test]
    fn reported_lifetime_is_clamped() {
        let now = Utc::now().timestamp();

        let token = CachedToken::new("x".into(), i64::MAX);
        assert!(token.expires_at <= now + MAX_LIFETIME_SECS + 1);
        assert!(!token.is_expired());

        let token = CachedToken::new("x".into(), i64::MIN);
        assert!(token.is_expired());

        let token = CachedToken::new("x".into(), 3600);
        assert!(token.expires_at >= now + 3600 - EXPIRY_MARGIN_SECS);
    }

    #[tokio::test]
    async fn missing_cache_means_token_not_loaded() {
        let cache = temp_cache("missing");
        assert!(matches!(cache.load().await, CachedTokenResult::NotFound));
        assert!(matches!(
            cache.access_token().await,
            Err(Error::TokenNotLoaded)
        ));
    }

    #[tokio::test]
    async fn stored_token_is_loaded_back() {
        let cache = temp_cache("stored");
        let token = CachedToken::new("BQDxyz".into(), 3600);
        cache.store(&token).await.unwrap();

        assert_eq!(cache.access_token().await.unwrap(), "BQDxyz");
    }

    #[tokio::test]
    async fn expired_token_is_not_used() {
        let cache = temp_cache("expired");
        let token = CachedToken {
            access_token: "old".into(),
            expires_at: Utc::now().timestamp() - 5,
        };
        cache.store(&token).await.unwrap();

        assert!(matches!(cache.load().await, CachedTokenResult::Expired));
        assert!(matches!(
            cache.access_token().await,
            Err(Error::TokenNotLoaded)
        ));
    }
}
