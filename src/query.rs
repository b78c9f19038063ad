use std::fmt::Display;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::clients::{
    entities::{ConcertCard, Credits, EnrichedTrack, ReleaseInfo, Track},
    errors::{Error, Result},
    musicbrainz::RecordingMatch,
};
use crate::config::Config;

// Related artists listed on a concert card
const RELATED_LIMIT: usize = 5;

// Enrichment failures never abort a search: log and carry on without the value
fn or_log<T>(what: &str, result: std::result::Result<T, impl Display>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{what} lookup failed: {e}");
            None
        }
    }
}

// The main QueryTool struct that runs a search against every upstream
pub struct QueryTool {
    config: Config,
}

impl QueryTool {
    pub fn new(config: Config) -> Self {
        QueryTool { config }
    }

    /// Artist mode: the artist's top tracks presented as a setlist, plus related
    /// artists, the MusicBrainz profile and archived live recordings.
    pub async fn search_artist(&self, name: &str) -> Result<ConcertCard> {
        info!("Searching Spotify for artist {name:?} ...");
        let spotify = &self.config.spotify;
        let artist = spotify
            .search_artist(name)
            .await?
            .ok_or_else(|| Error::NotFound("Artist not found on Spotify".into()))?;
        debug!("Matched artist {} ({})", artist.name, artist.id);

        let setlist = spotify
            .artist_top_tracks(&artist.id, self.config.limit)
            .await?;
        debug!("Fetched {} top tracks", setlist.len());

        let (related, profile, live_recordings) = tokio::join!(
            spotify.related_artists(&artist.id, RELATED_LIMIT),
            self.config.musicbrainz.search_artist(&artist.name),
            self.config.archive.live_recordings(&artist.name),
        );

        Ok(ConcertCard {
            date: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
            venue: format!("{} Top Tracks", artist.name),
            setlist,
            related: or_log("Related artists", related)
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.name)
                .collect(),
            profile: or_log("MusicBrainz artist", profile).flatten(),
            live_recordings: or_log("Archive", live_recordings).unwrap_or_default(),
            artist,
        })
    }

    /// Track mode: matching tracks, each enriched concurrently.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<EnrichedTrack>> {
        info!("Searching Spotify for tracks matching {query:?} ...");
        let tracks = self
            .config
            .spotify
            .search_tracks(query, self.config.limit)
            .await?;
        debug!("Found {} tracks, enriching ...", tracks.len());

        let enriched = join_all(tracks.into_iter().map(|t| self.enrich_track(t))).await;
        info!("Search completed. Tracks: {}", enriched.len());
        Ok(enriched)
    }

    async fn enrich_track(&self, track: Track) -> EnrichedTrack {
        let spotify = &self.config.spotify;
        let (features, lyrics, (release, credits)) = tokio::join!(
            spotify.audio_features(&track.id),
            self.config.lyrics.lyrics(track.main_artist(), &track.title),
            self.release_and_credits(&track),
        );

        EnrichedTrack {
            features: or_log("Audio features", features).flatten(),
            lyrics: or_log("Lyrics", lyrics).flatten(),
            release,
            credits,
            track,
        }
    }

    // ISRC -> recording -> release + credits. Falls back to a title/artist
    // recording search when the track carries no ISRC.
    async fn release_and_credits(&self, track: &Track) -> (Option<ReleaseInfo>, Option<Credits>) {
        let musicbrainz = &self.config.musicbrainz;
        let found = match track.isrc.as_deref() {
            Some(isrc) => musicbrainz.lookup_isrc(isrc).await,
            None => {
                musicbrainz
                    .search_recording(&track.title, track.main_artist())
                    .await
            }
        };
        let Some(found): Option<RecordingMatch> = or_log("MusicBrainz recording", found).flatten()
        else {
            debug!("No MusicBrainz recording for {}", track.title);
            return (None, None);
        };

        let (release, credits) = tokio::join!(
            musicbrainz.lookup_release(&found),
            musicbrainz.credits(&found.recording_id),
        );
        (
            or_log("MusicBrainz release", release),
            or_log("MusicBrainz credits", credits),
        )
    }
}
