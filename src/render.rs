//! Terminal rendering of search results.
//!
//! Missing optional fields are shown with a placeholder, never an error.

use crate::clients::entities::{ConcertCard, EnrichedTrack, ArchivedRecording, Track};

pub const NO_PREVIEW: &str = "No preview available";
pub const NO_IMAGE: &str = "No image";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_FOUND: &str = "Not found";
pub const NO_LYRICS: &str = "Lyrics not found";

// Lines of lyrics printed per track in list view
const LYRICS_PREVIEW_LINES: usize = 4;
const TITLE_WIDTH: usize = 40;

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(placeholder)
}

fn joined_or(values: &[String], placeholder: &str) -> String {
    if values.is_empty() {
        placeholder.to_string()
    } else {
        values.join(", ")
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn track_lines(index: usize, track: &Track) -> Vec<String> {
    let explicit = if track.explicit { "  [Explicit]" } else { "" };
    vec![
        format!("{}. {}{explicit}", index + 1, track.title),
        format!("   Duration: {}", track.duration),
        format!(
            "   Album art: {}",
            or_placeholder(track.album_art.as_deref(), NO_IMAGE)
        ),
        format!(
            "   Open in Spotify: {}",
            or_placeholder(track.spotify_url.as_deref(), NOT_AVAILABLE)
        ),
        format!(
            "   Preview: {}",
            or_placeholder(track.preview_url.as_deref(), NO_PREVIEW)
        ),
    ]
}

/// List layout of an artist mode result.
pub fn render_card(card: &ConcertCard) -> String {
    let artist = &card.artist;
    let mut lines = vec![
        artist.name.clone(),
        format!("Image: {}", or_placeholder(artist.image.as_deref(), NO_IMAGE)),
        format!("Genres: {}", joined_or(&artist.genres, NOT_AVAILABLE)),
        format!("Followers: {}", group_thousands(artist.followers)),
        format!("Popularity: {}/100", artist.popularity),
        format!(
            "Open on Spotify: {}",
            or_placeholder(artist.spotify_url.as_deref(), NOT_AVAILABLE)
        ),
    ];

    if let Some(profile) = profile_line(card) {
        lines.push(profile);
    }
    lines.push(format!("Related: {}", joined_or(&card.related, NOT_AVAILABLE)));

    lines.push(String::new());
    lines.push(format!("{} - {}", card.date, card.venue));
    for (i, track) in card.setlist.iter().enumerate() {
        lines.extend(track_lines(i, track));
    }

    lines.push(String::new());
    lines.push("Archived live recordings:".into());
    if card.live_recordings.is_empty() {
        lines.push(format!("   {NOT_FOUND}"));
    }
    for recording in &card.live_recordings {
        lines.push(recording_line(recording));
        lines.push(format!("   {}", recording.details_url));
        lines.push(format!(
            "   Stream: {}",
            or_placeholder(recording.stream_url.as_deref(), NO_PREVIEW)
        ));
    }

    lines.join("\n")
}

fn profile_line(card: &ConcertCard) -> Option<String> {
    let profile = card.profile.as_ref()?;
    let mut origin = Vec::new();
    if let Some(kind) = &profile.kind {
        origin.push(kind.clone());
    }
    if let Some(country) = &profile.country {
        origin.push(country.clone());
    }
    if let Some(begin) = &profile.begin {
        origin.push(format!("since {begin}"));
    }
    Some(format!(
        "MusicBrainz: {} ({})",
        profile.mbid,
        joined_or(&origin, NOT_AVAILABLE)
    ))
}

fn recording_line(recording: &ArchivedRecording) -> String {
    format!(
        " - {} [{}] {}",
        recording.title,
        or_placeholder(recording.date.as_deref(), NOT_AVAILABLE),
        or_placeholder(recording.venue.as_deref(), "")
    )
    .trim_end()
    .to_string()
}

/// List layout of a track mode result.
pub fn render_tracks(tracks: &[EnrichedTrack]) -> String {
    if tracks.is_empty() {
        return "No tracks found".to_string();
    }

    let mut lines = Vec::new();
    for (i, enriched) in tracks.iter().enumerate() {
        let track = &enriched.track;
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(track_lines(i, track));
        lines.push(format!(
            "   Artists: {}",
            joined_or(&track.artists, NOT_AVAILABLE)
        ));
        lines.push(format!(
            "   ISRC: {}",
            or_placeholder(track.isrc.as_deref(), NOT_FOUND)
        ));

        match &enriched.features {
            Some(f) => lines.push(format!(
                "   Audio features: tempo {:.0} BPM, key {}, energy {:.2}, danceability {:.2}, valence {:.2}",
                f.tempo,
                f.key_name().as_deref().unwrap_or(NOT_AVAILABLE),
                f.energy,
                f.danceability,
                f.valence
            )),
            None => lines.push(format!("   Audio features: {NOT_AVAILABLE}")),
        }

        match &enriched.release {
            Some(release) => lines.push(format!(
                "   Release: {} ({}, {}) label {}",
                or_placeholder(release.title.as_deref(), NOT_FOUND),
                or_placeholder(release.date.as_deref(), NOT_AVAILABLE),
                or_placeholder(release.country.as_deref(), NOT_AVAILABLE),
                joined_or(&release.labels, NOT_FOUND)
            )),
            None => lines.push(format!("   Release: {NOT_FOUND}")),
        }

        let (writers, publishers) = match &enriched.credits {
            Some(c) => (
                joined_or(&c.writers, NOT_FOUND),
                joined_or(&c.publishers, NOT_FOUND),
            ),
            None => (NOT_FOUND.to_string(), NOT_FOUND.to_string()),
        };
        lines.push(format!("   Writers: {writers}"));
        lines.push(format!("   Publishers: {publishers}"));

        match &enriched.lyrics {
            Some(lyrics) => {
                lines.push("   Lyrics:".into());
                lines.extend(
                    lyrics
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .take(LYRICS_PREVIEW_LINES)
                        .map(|l| format!("     {}", l.trim())),
                );
            }
            None => lines.push(format!("   Lyrics: {NO_LYRICS}")),
        }
    }
    lines.join("\n")
}

fn table(header: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let rows: Vec<Vec<String>> = rows.into_iter().collect();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(header.iter().map(ToString::to_string).collect())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.into_iter().map(format_row));
    lines.join("\n")
}

fn track_row(index: usize, track: &Track) -> Vec<String> {
    vec![
        (index + 1).to_string(),
        truncate(&track.title, TITLE_WIDTH),
        track.duration.clone(),
        if track.explicit { "yes" } else { "" }.to_string(),
        or_placeholder(track.preview_url.as_deref(), NO_PREVIEW).to_string(),
    ]
}

/// Table layout of an artist mode result.
pub fn render_card_table(card: &ConcertCard) -> String {
    let heading = format!(
        "{} - {} | {} followers | popularity {}/100 | genres: {}",
        card.date,
        card.venue,
        group_thousands(card.artist.followers),
        card.artist.popularity,
        joined_or(&card.artist.genres, NOT_AVAILABLE)
    );
    let body = table(
        &["#", "Title", "Duration", "Explicit", "Preview"],
        card.setlist.iter().enumerate().map(|(i, t)| track_row(i, t)),
    );

    // Everything the list layout shows beyond the setlist, in compact form
    let mut trailer = vec![String::new()];
    trailer.extend(profile_line(card));
    trailer.push(format!("Related: {}", joined_or(&card.related, NOT_AVAILABLE)));
    if card.live_recordings.is_empty() {
        trailer.push(format!("Archived live recordings: {NOT_FOUND}"));
    } else {
        trailer.push("Archived live recordings:".into());
    }
    for recording in &card.live_recordings {
        let stream = or_placeholder(recording.stream_url.as_deref(), &recording.details_url);
        trailer.push(format!("{} {stream}", recording_line(recording)));
    }

    format!("{heading}\n{body}\n{}", trailer.join("\n"))
}

/// Table layout of a track mode result.
pub fn render_tracks_table(tracks: &[EnrichedTrack]) -> String {
    table(
        &[
            "#", "Title", "Artist", "Duration", "Explicit", "ISRC", "Tempo", "Release", "Writers",
            "Publishers", "Lyrics",
        ],
        tracks.iter().enumerate().map(|(i, e)| {
            let track = &e.track;
            vec![
                (i + 1).to_string(),
                truncate(&track.title, TITLE_WIDTH),
                or_placeholder(Some(track.main_artist()), NOT_AVAILABLE).to_string(),
                track.duration.clone(),
                if track.explicit { "yes" } else { "" }.to_string(),
                or_placeholder(track.isrc.as_deref(), NOT_FOUND).to_string(),
                e.features
                    .as_ref()
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |f| format!("{:.0}", f.tempo)),
                e.release.as_ref().map_or_else(
                    || NOT_FOUND.to_string(),
                    |r| {
                        let title = or_placeholder(r.title.as_deref(), NOT_FOUND);
                        match r.date.as_deref() {
                            Some(date) => format!("{title} ({date})"),
                            None => title.to_string(),
                        }
                    },
                ),
                e.credits
                    .as_ref()
                    .map_or_else(|| NOT_FOUND.to_string(), |c| joined_or(&c.writers, NOT_FOUND)),
                e.credits.as_ref().map_or_else(
                    || NOT_FOUND.to_string(),
                    |c| joined_or(&c.publishers, NOT_FOUND),
                ),
                if e.lyrics.is_some() { "yes" } else { "no" }.to_string(),
            ]
        }),
    )
}
