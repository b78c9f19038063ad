use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
    /// `m:ss`, see [`format_duration`]
    pub duration: String,
    pub explicit: bool,
    pub preview_url: Option<String>,
    pub album_art: Option<String>,
    pub isrc: Option<String>,
    pub spotify_url: Option<String>,
}

impl Track {
    /// First credited artist, or an empty string for tracks without credits.
    pub fn main_artist(&self) -> &str {
        self.artists.first().map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub genres: Vec<String>,
    pub followers: u64,
    pub popularity: u32,
    pub spotify_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub key: i32,
    pub mode: i32,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub loudness: f64,
}

impl AudioFeatures {
    /// Pitch class plus mode, e.g. `C# minor`. `None` when the key was not detected.
    pub fn key_name(&self) -> Option<String> {
        const PITCH_CLASSES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let pitch = usize::try_from(self.key).ok()?;
        let name = PITCH_CLASSES.get(pitch)?;
        let mode = if self.mode == 1 { "major" } else { "minor" };
        Some(format!("{name} {mode}"))
    }
}

/// Release metadata resolved through MusicBrainz
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ReleaseInfo {
    pub recording_id: String,
    pub release_id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub country: Option<String>,
    pub labels: Vec<String>,
}

/// Writers and publishers taken from MusicBrainz work relationships
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Credits {
    pub writers: Vec<String>,
    pub publishers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArchivedRecording {
    pub identifier: String,
    pub title: String,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub details_url: String,
    pub stream_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArtistProfile {
    pub mbid: String,
    pub name: String,
    pub kind: Option<String>,
    pub country: Option<String>,
    pub begin: Option<String>,
    pub disambiguation: Option<String>,
}

/// Artist mode result: the top tracks presented as a setlist
#[derive(Debug, Clone, Serialize)]
pub struct ConcertCard {
    pub date: String,
    pub venue: String,
    pub setlist: Vec<Track>,
    pub artist: Artist,
    pub related: Vec<String>,
    pub profile: Option<ArtistProfile>,
    pub live_recordings: Vec<ArchivedRecording>,
}

/// Track mode result
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedTrack {
    pub track: Track,
    pub features: Option<AudioFeatures>,
    pub release: Option<ReleaseInfo>,
    pub credits: Option<Credits>,
    pub lyrics: Option<String>,
}

impl From<Track> for EnrichedTrack {
    fn from(track: Track) -> Self {
        EnrichedTrack {
            track,
            features: None,
            release: None,
            credits: None,
            lyrics: None,
        }
    }
}

/// Formats milliseconds as `minutes:seconds` with zero-padded seconds.
pub fn format_duration(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let seconds = (duration_ms % 60_000) / 1000;
    format!("{minutes}:{seconds:02}")
}
