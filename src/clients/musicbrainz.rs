use log::{debug, warn};
use serde::Deserialize;

use crate::clients::{
    entities::{ArtistProfile, Credits, ReleaseInfo},
    errors::Result,
    get_json, get_json_or_missing, url_with_segments,
};

// Relationship types on a work that name a writer
const WRITER_RELATIONS: [&str; 4] = ["composer", "lyricist", "writer", "librettist"];
const PUBLISHER_RELATION: &str = "publishing";
// Works looked up per recording when collecting credits
const MAX_WORKS: usize = 3;

#[derive(Deserialize, Debug)]
struct RecordingSearchResponse {
    #[serde(default)]
    recordings: Vec<MbRecording>,
}

#[derive(Deserialize, Debug)]
struct IsrcResponse {
    #[serde(default)]
    recordings: Vec<MbRecording>,
}

#[derive(Deserialize, Debug)]
struct MbRecording {
    id: String,
    #[serde(default)]
    releases: Vec<MbRelease>,
    #[serde(default)]
    relations: Vec<MbRelation>,
}

#[derive(Deserialize, Debug)]
struct MbRelease {
    id: String,
    title: Option<String>,
    date: Option<String>,
    country: Option<String>,
    #[serde(rename = "label-info", default)]
    label_info: Vec<MbLabelInfo>,
}

#[derive(Deserialize, Debug)]
struct MbLabelInfo {
    label: Option<MbNamed>,
}

#[derive(Deserialize, Debug)]
struct MbNamed {
    name: String,
}

#[derive(Deserialize, Debug)]
struct MbWorkRef {
    id: String,
}

#[derive(Deserialize, Debug)]
struct MbRelation {
    #[serde(rename = "type")]
    kind: String,
    work: Option<MbWorkRef>,
    artist: Option<MbNamed>,
    label: Option<MbNamed>,
}

#[derive(Deserialize, Debug)]
struct MbWork {
    #[serde(default)]
    relations: Vec<MbRelation>,
}

#[derive(Deserialize, Debug)]
struct ArtistSearchResponse {
    #[serde(default)]
    artists: Vec<MbArtist>,
}

#[derive(Deserialize, Debug)]
struct LifeSpan {
    begin: Option<String>,
}

#[derive(Deserialize, Debug)]
struct MbArtist {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    country: Option<String>,
    #[serde(rename = "life-span")]
    life_span: Option<LifeSpan>,
    disambiguation: Option<String>,
}

/// A recording found on MusicBrainz and the first release it appears on
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingMatch {
    pub recording_id: String,
    pub release_id: Option<String>,
}

impl From<MbRecording> for RecordingMatch {
    fn from(r: MbRecording) -> Self {
        RecordingMatch {
            release_id: r.releases.into_iter().next().map(|rel| rel.id),
            recording_id: r.id,
        }
    }
}

impl From<MbArtist> for ArtistProfile {
    fn from(a: MbArtist) -> Self {
        ArtistProfile {
            mbid: a.id,
            name: a.name,
            kind: a.kind,
            country: a.country,
            begin: a.life_span.and_then(|l| l.begin),
            disambiguation: a.disambiguation.filter(|d| !d.is_empty()),
        }
    }
}

// Quotes a value for a Lucene field query
fn phrase(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn collect_credits(relations: Vec<MbRelation>, credits: &mut Credits) {
    for relation in relations {
        if WRITER_RELATIONS.contains(&relation.kind.as_str()) {
            if let Some(artist) = relation.artist {
                if !credits.writers.contains(&artist.name) {
                    credits.writers.push(artist.name);
                }
            }
        } else if relation.kind == PUBLISHER_RELATION {
            if let Some(label) = relation.label {
                if !credits.publishers.contains(&label.name) {
                    credits.publishers.push(label.name);
                }
            }
        }
    }
}

/// MusicBrainz web service client. Every request carries the user agent of the
/// shared HTTP client, which MusicBrainz requires to identify the application.
pub struct MusicBrainzClient {
    http: reqwest::Client,
    base_url: String,
}

impl MusicBrainzClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        MusicBrainzClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, segments: &[&str]) -> Result<reqwest::RequestBuilder> {
        let url = url_with_segments(&self.base_url, segments)?;
        debug!("MusicBrainz GET {url}");
        Ok(self.http.get(url).query(&[("fmt", "json")]))
    }

    pub async fn search_recording(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<RecordingMatch>> {
        let query = format!("recording:{} AND artist:{}", phrase(title), phrase(artist));
        let request = self
            .get(&["recording"])?
            .query(&[("query", query.as_str()), ("limit", "1")]);
        let response: RecordingSearchResponse = get_json(request).await?;
        Ok(response.recordings.into_iter().next().map(RecordingMatch::from))
    }

    // MusicBrainz answers 404 for an ISRC it has never seen
    pub async fn lookup_isrc(&self, isrc: &str) -> Result<Option<RecordingMatch>> {
        let request = self
            .get(&["isrc", isrc])?
            .query(&[("inc", "releases")]);
        let response: Option<IsrcResponse> = get_json_or_missing(request).await?;
        Ok(response
            .and_then(|r| r.recordings.into_iter().next())
            .map(RecordingMatch::from))
    }

    pub async fn lookup_release(&self, found: &RecordingMatch) -> Result<ReleaseInfo> {
        let Some(release_id) = found.release_id.as_deref() else {
            return Ok(ReleaseInfo {
                recording_id: found.recording_id.clone(),
                ..Default::default()
            });
        };
        let request = self
            .get(&["release", release_id])?
            .query(&[("inc", "labels")]);
        let release: MbRelease = get_json(request).await?;

        Ok(ReleaseInfo {
            recording_id: found.recording_id.clone(),
            release_id: Some(release.id),
            title: release.title,
            date: release.date.filter(|d| !d.is_empty()),
            country: release.country,
            labels: release
                .label_info
                .into_iter()
                .filter_map(|info| info.label.map(|l| l.name))
                .collect(),
        })
    }

    /// Writers and publishers of the works this recording performs.
    pub async fn credits(&self, recording_id: &str) -> Result<Credits> {
        let request = self
            .get(&["recording", recording_id])?
            .query(&[("inc", "work-rels")]);
        let recording: MbRecording = get_json(request).await?;

        let work_ids: Vec<String> = recording
            .relations
            .into_iter()
            .filter_map(|r| r.work.map(|w| w.id))
            .take(MAX_WORKS)
            .collect();
        debug!("Recording {recording_id} performs {} works", work_ids.len());

        let mut credits = Credits::default();
        for work_id in work_ids {
            let request = self
                .get(&["work", work_id.as_str()])?
                .query(&[("inc", "artist-rels+label-rels")]);
            match get_json::<MbWork>(request).await {
                Ok(work) => collect_credits(work.relations, &mut credits),
                Err(e) => warn!("Skipping credits of work {work_id}: {e}"),
            }
        }
        Ok(credits)
    }

    pub async fn search_artist(&self, name: &str) -> Result<Option<ArtistProfile>> {
        let query = format!("artist:{}", phrase(name));
        let request = self
            .get(&["artist"])?
            .query(&[("query", query.as_str()), ("limit", "1")]);
        let response: ArtistSearchResponse = get_json(request).await?;
        Ok(response.artists.into_iter().next().map(ArtistProfile::from))
    }
}
