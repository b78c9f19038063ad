use log::debug;
use serde::Deserialize;

use crate::clients::{errors::Result, get_json_or_missing, url_with_segments};

#[derive(Deserialize, Debug)]
struct LyricsResponse {
    #[serde(default)]
    lyrics: String,
}

/// lyrics.ovh client. Unauthenticated.
pub struct LyricsClient {
    http: reqwest::Client,
    base_url: String,
}

impl LyricsClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        LyricsClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // lyrics.ovh answers 404 with {"error": "No lyrics found"}
    pub async fn lyrics(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let url = url_with_segments(&self.base_url, &[artist, title])?;
        debug!("Lyrics GET {url}");
        let response: Option<LyricsResponse> = get_json_or_missing(self.http.get(url)).await?;
        Ok(response
            .map(|r| r.lyrics.trim().to_string())
            .filter(|lyrics| !lyrics.is_empty()))
    }
}
