/// Internet Archive search and item metadata client
pub mod archive;
/// View-models assembled per query
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// lyrics.ovh client
pub mod lyrics;
/// MusicBrainz client
pub mod musicbrainz;
/// Spotify Web API catalog client
pub mod spotify;
/// Bearer token loading and caching
pub mod token;

pub use archive::ArchiveClient;
pub use lyrics::LyricsClient;
pub use musicbrainz::MusicBrainzClient;
pub use spotify::SpotifyClient;
pub use token::TokenCache;

use std::time::Duration;

use log::debug;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::clients::errors::{Error, Result};

/// Builds the HTTP client shared by every upstream client.
/// MusicBrainz rejects requests without an identifying user agent.
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Sends the request and decodes a JSON body. Non-2xx statuses become
/// `UnexpectedResponse` carrying the status and the response body.
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    match get_json_or_missing(request).await? {
        Some(value) => Ok(value),
        None => Err(Error::UnexpectedResponse(
            StatusCode::NOT_FOUND.to_string(),
        )),
    }
}

/// Same as [`get_json`] but maps a 404 to `Ok(None)`.
pub(crate) async fn get_json_or_missing<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<Option<T>> {
    let response = request.send().await?;
    let status = response.status();
    debug!("{} {}", status.as_u16(), response.url());

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::UnexpectedResponse(format!("{status} from {url}: {body}")));
    }

    let bytes = response.bytes().await?;
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Appends percent-encoded path segments to a base URL.
pub(crate) fn url_with_segments(base: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| Error::ConfigurationError(format!("Invalid base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| Error::ConfigurationError(format!("Base URL {base} cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
