use log::debug;
use serde::Deserialize;

use crate::clients::{
    entities::{Artist, AudioFeatures, Track, format_duration},
    errors::Result,
    get_json, get_json_or_missing, url_with_segments,
};

#[derive(Deserialize, Debug, Default)]
struct ApiImage {
    url: String,
}

#[derive(Deserialize, Debug, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ExternalIds {
    isrc: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct Followers {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ApiArtist {
    id: String,
    name: String,
    images: Vec<ApiImage>,
    genres: Vec<String>,
    followers: Followers,
    popularity: Option<u32>,
    external_urls: ExternalUrls,
}

#[derive(Deserialize, Debug, Default)]
struct ApiSimpleArtist {
    name: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ApiAlbum {
    name: String,
    images: Vec<ApiImage>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    artists: Vec<ApiSimpleArtist>,
    album: ApiAlbum,
    duration_ms: u64,
    explicit: bool,
    preview_url: Option<String>,
    external_ids: ExternalIds,
    external_urls: ExternalUrls,
}

#[derive(Deserialize, Debug)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize, Debug)]
struct ArtistSearchResponse {
    artists: Paging<ApiArtist>,
}

#[derive(Deserialize, Debug)]
struct TrackSearchResponse {
    tracks: Paging<ApiTrack>,
}

#[derive(Deserialize, Debug)]
struct TrackListResponse {
    #[serde(default)]
    tracks: Vec<ApiTrack>,
}

#[derive(Deserialize, Debug)]
struct ArtistListResponse {
    #[serde(default)]
    artists: Vec<ApiArtist>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ApiAudioFeatures {
    danceability: f64,
    energy: f64,
    valence: f64,
    tempo: f64,
    key: i32,
    mode: i32,
    acousticness: f64,
    instrumentalness: f64,
    liveness: f64,
    speechiness: f64,
    loudness: f64,
}

fn first_image(images: &[ApiImage]) -> Option<String> {
    images
        .first()
        .map(|i| i.url.clone())
        .filter(|url| !url.is_empty())
}

impl From<ApiTrack> for Track {
    fn from(t: ApiTrack) -> Track {
        Track {
            id: t.id.unwrap_or_default(),
            duration: format_duration(t.duration_ms),
            album_art: first_image(&t.album.images),
            title: t.name,
            artists: t.artists.into_iter().map(|a| a.name).collect(),
            album: t.album.name,
            duration_ms: t.duration_ms,
            explicit: t.explicit,
            preview_url: t.preview_url.filter(|url| !url.is_empty()),
            isrc: t.external_ids.isrc,
            spotify_url: t.external_urls.spotify,
        }
    }
}

impl From<ApiArtist> for Artist {
    fn from(a: ApiArtist) -> Artist {
        Artist {
            image: first_image(&a.images),
            id: a.id,
            name: a.name,
            genres: a.genres,
            followers: a.followers.total.unwrap_or(0),
            popularity: a.popularity.unwrap_or(0),
            spotify_url: a.external_urls.spotify,
        }
    }
}

impl From<ApiAudioFeatures> for AudioFeatures {
    fn from(f: ApiAudioFeatures) -> AudioFeatures {
        AudioFeatures {
            danceability: f.danceability,
            energy: f.energy,
            valence: f.valence,
            tempo: f.tempo,
            key: f.key,
            mode: f.mode,
            acousticness: f.acousticness,
            instrumentalness: f.instrumentalness,
            liveness: f.liveness,
            speechiness: f.speechiness,
            loudness: f.loudness,
        }
    }
}

/// Read-only Spotify catalog client authorised with a client-credentials bearer token.
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    market: String,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, api_base: &str, token: &str, market: &str) -> Self {
        SpotifyClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            market: market.to_string(),
        }
    }

    fn get(&self, segments: &[&str]) -> Result<reqwest::RequestBuilder> {
        let url = url_with_segments(&self.api_base, segments)?;
        debug!("Spotify GET {url}");
        Ok(self.http.get(url).bearer_auth(&self.token))
    }

    // Best match for an artist name, if any
    pub async fn search_artist(&self, name: &str) -> Result<Option<Artist>> {
        let request = self
            .get(&["search"])?
            .query(&[("q", name), ("type", "artist"), ("limit", "1")]);
        let response: ArtistSearchResponse = get_json(request).await?;
        Ok(response.artists.items.into_iter().next().map(Artist::from))
    }

    pub async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        let limit = limit.clamp(1, 50).to_string();
        let request = self.get(&["search"])?.query(&[
            ("q", query),
            ("type", "track"),
            ("limit", limit.as_str()),
        ]);
        let response: TrackSearchResponse = get_json(request).await?;
        Ok(response
            .tracks
            .items
            .into_iter()
            .map(Track::from)
            .collect())
    }

    pub async fn artist_top_tracks(&self, artist_id: &str, limit: usize) -> Result<Vec<Track>> {
        let request = self
            .get(&["artists", artist_id, "top-tracks"])?
            .query(&[("market", self.market.as_str())]);
        let response: TrackListResponse = get_json(request).await?;
        Ok(response
            .tracks
            .into_iter()
            .take(limit)
            .map(Track::from)
            .collect())
    }

    // Spotify answers 404 for tracks without analysis data
    pub async fn audio_features(&self, track_id: &str) -> Result<Option<AudioFeatures>> {
        if track_id.is_empty() {
            return Ok(None);
        }
        let request = self.get(&["audio-features", track_id])?;
        let features: Option<ApiAudioFeatures> = get_json_or_missing(request).await?;
        Ok(features.map(AudioFeatures::from))
    }

    pub async fn related_artists(&self, artist_id: &str, limit: usize) -> Result<Vec<Artist>> {
        let request = self.get(&["artists", artist_id, "related-artists"])?;
        let response: ArtistListResponse = get_json(request).await?;
        Ok(response
            .artists
            .into_iter()
            .take(limit)
            .map(Artist::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn track_without_preview_or_art_maps_to_none() {
        let raw = json!({
            "id": "3n3Ppam7vgaVa1iaRUc9Lp",
            "name": "Mr. Brightside",
            "artists": [{ "name": "The Killers" }],
            "album": { "name": "Hot Fuss", "images": [] },
            "duration_ms": 222_973,
            "explicit": false,
            "preview_url": null,
            "external_ids": { "isrc": "USIR20400274" },
            "external_urls": { "spotify": "https://open.spotify.com/track/3n3Ppam7vgaVa1iaRUc9Lp" }
        });
        let track = Track::from(serde_json::from_value::<ApiTrack>(raw).unwrap());

        assert_eq!(track.title, "Mr. Brightside");
        assert_eq!(track.duration, "3:42");
        assert_eq!(track.preview_url, None);
        assert_eq!(track.album_art, None);
        assert_eq!(track.isrc.as_deref(), Some("USIR20400274"));
        assert_eq!(track.main_artist(), "The Killers");
    }

    #[test]
    fn artist_with_missing_counts_defaults_to_zero() {
        let raw = json!({
            "id": "0C0XlULifJtAgn6ZNCW2eu",
            "name": "The Killers",
            "images": [{ "url": "https://i.scdn.co/image/a", "height": 640, "width": 640 }],
            "followers": { "href": null, "total": null },
            "external_urls": {}
        });
        let artist = Artist::from(serde_json::from_value::<ApiArtist>(raw).unwrap());

        assert_eq!(artist.image.as_deref(), Some("https://i.scdn.co/image/a"));
        assert_eq!(artist.followers, 0);
        assert_eq!(artist.popularity, 0);
        assert!(artist.genres.is_empty());
        assert_eq!(artist.spotify_url, None);
    }
}
