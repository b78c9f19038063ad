use futures::future::join_all;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::clients::{
    entities::ArchivedRecording,
    errors::{Error, Result},
    get_json, url_with_segments,
};

#[derive(Deserialize, Debug)]
struct SearchResponse {
    response: SearchDocs,
}

#[derive(Deserialize, Debug)]
struct SearchDocs {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

// Archive fields are a string or a list of strings depending on the uploader
#[derive(Deserialize, Debug)]
struct SearchDoc {
    identifier: String,
    title: Option<Value>,
    date: Option<Value>,
    venue: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct ItemMetadata {
    #[serde(default)]
    files: Vec<ItemFile>,
}

#[derive(Deserialize, Debug)]
struct ItemFile {
    name: String,
    format: Option<String>,
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| text(Some(v))),
        _ => None,
    }
}

fn first_audio_file(files: &[ItemFile]) -> Option<&ItemFile> {
    files.iter().find(|f| {
        f.format
            .as_deref()
            .is_some_and(|format| format.contains("MP3"))
    })
}

/// Internet Archive client for live recordings (the `etree` collection)
pub struct ArchiveClient {
    http: reqwest::Client,
    base_url: String,
    rows: usize,
}

impl ArchiveClient {
    pub fn new(http: reqwest::Client, base_url: &str, rows: usize) -> Self {
        ArchiveClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            rows,
        }
    }

    fn details_url(&self, identifier: &str) -> Result<String> {
        Ok(url_with_segments(&self.base_url, &["details", identifier])?.to_string())
    }

    /// Live recordings credited to `artist`, each with a streamable file when the
    /// item lists one. A failed metadata lookup leaves `stream_url` empty.
    pub async fn live_recordings(&self, artist: &str) -> Result<Vec<ArchivedRecording>> {
        let query = format!(
            "creator:(\"{}\") AND mediatype:(etree)",
            artist.replace('"', "")
        );
        let rows = self.rows.to_string();
        let url = url_with_segments(&self.base_url, &["advancedsearch.php"])?;
        debug!("Archive GET {url} q={query}");
        let request = self.http.get(url).query(&[
            ("q", query.as_str()),
            ("fl[]", "identifier"),
            ("fl[]", "title"),
            ("fl[]", "date"),
            ("fl[]", "venue"),
            ("sort[]", "downloads desc"),
            ("rows", rows.as_str()),
            ("output", "json"),
        ]);
        let response: SearchResponse = get_json(request).await?;

        let lookups = response.response.docs.into_iter().map(|doc| async move {
            let stream_url = match self.stream_url(&doc.identifier).await {
                Ok(url) => url,
                Err(e) => {
                    warn!("Archive metadata lookup failed for {}: {e}", doc.identifier);
                    None
                }
            };
            Ok::<_, Error>(ArchivedRecording {
                details_url: self.details_url(&doc.identifier)?,
                title: text(doc.title.as_ref()).unwrap_or_else(|| doc.identifier.clone()),
                date: text(doc.date.as_ref()),
                venue: text(doc.venue.as_ref()),
                identifier: doc.identifier,
                stream_url,
            })
        });

        join_all(lookups).await.into_iter().collect()
    }

    /// Download URL of the first MP3 derivative of an item, if any.
    pub async fn stream_url(&self, identifier: &str) -> Result<Option<String>> {
        let url = url_with_segments(&self.base_url, &["metadata", identifier])?;
        debug!("Archive GET {url}");
        let metadata: ItemMetadata = get_json(self.http.get(url)).await?;

        match first_audio_file(&metadata.files) {
            Some(file) => {
                let url =
                    url_with_segments(&self.base_url, &["download", identifier, file.name.as_str()])?;
                Ok(Some(url.to_string()))
            }
            None => Ok(None),
        }
    }
}
