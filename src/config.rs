use std::time::Duration;

use crate::clients::{
    ArchiveClient, LyricsClient, MusicBrainzClient, SpotifyClient, build_http_client,
    errors::{Error, Result},
};

/// Default user agent. MusicBrainz asks for contact details, so deployments
/// should pass their own through [`ConfigBuilder::user_agent`].
pub const USER_AGENT: &str = concat!("concertq/", env!("CARGO_PKG_VERSION"));

/// Largest page size the Spotify search endpoint accepts
pub const MAX_LIMIT: usize = 50;

/// Base URLs of every upstream API. Overridable so tests can point them at a local fake.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub spotify_api: String,
    pub musicbrainz: String,
    pub archive: String,
    pub lyrics: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            spotify_api: "https://api.spotify.com/v1".into(),
            musicbrainz: "https://musicbrainz.org/ws/2".into(),
            archive: "https://archive.org".into(),
            lyrics: "https://api.lyrics.ovh/v1".into(),
        }
    }
}

// Configuration for the QueryTool struct
pub struct Config {
    pub spotify: SpotifyClient,
    pub musicbrainz: MusicBrainzClient,
    pub archive: ArchiveClient,
    pub lyrics: LyricsClient,
    pub limit: usize,
}

pub struct ConfigBuilder {
    token: Option<String>,
    endpoints: Option<Endpoints>,
    market: Option<String>,
    limit: Option<usize>,
    archive_rows: Option<usize>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            token: None,
            endpoints: None,
            market: None,       // Default is US
            limit: None,        // Tracks per result. Default is 5.
            archive_rows: None, // Live recordings per artist. Default is 5.
            timeout: None,      // Per-request timeout. Default is 30s.
            user_agent: None,
        }
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    #[must_use]
    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn archive_rows(mut self, rows: usize) -> Self {
        self.archive_rows = Some(rows);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or(Error::TokenNotLoaded)?;
        let limit = self.limit.unwrap_or(5);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(Error::ConfigurationError(format!(
                "Result limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }
        let endpoints = self.endpoints.unwrap_or_default();
        let user_agent = self
            .user_agent
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| USER_AGENT.into());
        let http = build_http_client(
            &user_agent,
            self.timeout.unwrap_or(Duration::from_secs(30)),
        )?;
        let market = self.market.unwrap_or_else(|| "US".into());

        Ok(Config {
            spotify: SpotifyClient::new(http.clone(), &endpoints.spotify_api, &token, &market),
            musicbrainz: MusicBrainzClient::new(http.clone(), &endpoints.musicbrainz),
            archive: ArchiveClient::new(
                http.clone(),
                &endpoints.archive,
                self.archive_rows.unwrap_or(5),
            ),
            lyrics: LyricsClient::new(http, &endpoints.lyrics),
            limit,
        })
    }
}
