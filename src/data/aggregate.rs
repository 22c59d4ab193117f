use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::Serialize;

use super::model::PlayEvent;

// ---------------------------------------------------------------------------
// Ranked tables: group → sum → sort → truncate
// ---------------------------------------------------------------------------

/// One row of a ranked table: display label and total listening time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub ms_played: u64,
}

/// Top tracks by total listening time, optionally restricted to one
/// calendar year.
pub fn top_tracks(events: &[PlayEvent], year: Option<i32>, limit: usize) -> Vec<RankedEntry> {
    ranked(events, year, limit, |e| e.track.clone())
}

/// Top artists by total listening time.
pub fn top_artists(events: &[PlayEvent], year: Option<i32>, limit: usize) -> Vec<RankedEntry> {
    ranked(events, year, limit, |e| e.artist.clone())
}

/// Top albums by total listening time. Albums are keyed by the
/// (album, artist) pair since different artists reuse album titles.
pub fn top_albums(events: &[PlayEvent], year: Option<i32>, limit: usize) -> Vec<RankedEntry> {
    ranked(events, year, limit, |e| match (&e.album, &e.artist) {
        (Some(album), Some(artist)) => Some(format!("{album} — {artist}")),
        _ => None,
    })
}

/// Rows whose key resolves to `None` (podcast rows, or albums in the legacy
/// export) are excluded from the grouping.
fn ranked(
    events: &[PlayEvent],
    year: Option<i32>,
    limit: usize,
    key: impl Fn(&PlayEvent) -> Option<String>,
) -> Vec<RankedEntry> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for event in events {
        if matches!(year, Some(y) if event.played_at.year() != y) {
            continue;
        }
        let Some(label) = key(event) else { continue };
        let total = totals.entry(label).or_default();
        *total = total.saturating_add(event.ms_played);
    }

    let mut rows: Vec<RankedEntry> = totals
        .into_iter()
        .map(|(label, ms_played)| RankedEntry { label, ms_played })
        .collect();
    rows.sort_by(|a, b| {
        b.ms_played
            .cmp(&a.ms_played)
            .then_with(|| a.label.cmp(&b.label))
    });
    rows.truncate(limit);
    rows
}

// ---------------------------------------------------------------------------
// Rolling artist history
// ---------------------------------------------------------------------------

/// Rolling listening-time series for one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistTrend {
    pub artist: String,
    /// One point per play: (timestamp, total ms over the trailing window).
    pub points: Vec<(DateTime<Utc>, u64)>,
}

/// For every play by `artist`, in time order, the summed listening time over
/// the trailing window `(t − window, t]`.
pub fn rolling_artist_history(
    events: &[PlayEvent],
    artist: &str,
    window: Duration,
) -> ArtistTrend {
    let mut plays: Vec<(DateTime<Utc>, u64)> = events
        .iter()
        .filter(|e| e.artist.as_deref() == Some(artist))
        .map(|e| (e.played_at, e.ms_played))
        .collect();
    plays.sort_by_key(|&(ts, _)| ts);

    let mut points = Vec::with_capacity(plays.len());
    let mut in_window: u64 = 0;
    let mut start = 0;
    for i in 0..plays.len() {
        in_window = in_window.saturating_add(plays[i].1);
        while start < i && plays[start].0 <= plays[i].0 - window {
            in_window = in_window.saturating_sub(plays[start].1);
            start += 1;
        }
        points.push((plays[i].0, in_window));
    }

    ArtistTrend {
        artist: artist.to_string(),
        points,
    }
}

/// Rolling histories for the overall top `artists` artists.
pub fn top_artist_trends(
    events: &[PlayEvent],
    artists: usize,
    window: Duration,
) -> Vec<ArtistTrend> {
    top_artists(events, None, artists)
        .into_iter()
        .map(|entry| rolling_artist_history(events, &entry.label, window))
        .collect()
}

// ---------------------------------------------------------------------------
// Temporal pattern: the listening clock
// ---------------------------------------------------------------------------

/// Play counts bucketed by day of week and hour of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningClock {
    /// `counts[day][hour]`, Monday first.
    pub counts: [[u64; 24]; 7],
}

impl ListeningClock {
    pub const DAY_LABELS: [&'static str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    /// The busiest cell, used to scale color intensity.
    pub fn max_count(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|day| day.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

pub fn listening_clock(events: &[PlayEvent]) -> ListeningClock {
    let mut counts = [[0u64; 24]; 7];
    for event in events {
        let day = event.played_at.weekday().num_days_from_monday() as usize;
        let hour = event.played_at.hour() as usize;
        counts[day][hour] += 1;
    }
    ListeningClock { counts }
}

// ---------------------------------------------------------------------------
// Dataset summary
// ---------------------------------------------------------------------------

/// Headline numbers for a loaded history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub streams: usize,
    pub total_ms: u64,
    pub unique_tracks: usize,
    pub unique_artists: usize,
    pub first_played: Option<DateTime<Utc>>,
    pub last_played: Option<DateTime<Utc>>,
}

pub fn summary(events: &[PlayEvent]) -> HistorySummary {
    let mut total_ms: u64 = 0;
    let mut tracks: HashSet<&str> = HashSet::new();
    let mut artists: HashSet<&str> = HashSet::new();

    for event in events {
        total_ms = total_ms.saturating_add(event.ms_played);
        if let Some(track) = event.track.as_deref() {
            tracks.insert(track);
        }
        if let Some(artist) = event.artist.as_deref() {
            artists.insert(artist);
        }
    }

    HistorySummary {
        streams: events.len(),
        total_ms,
        unique_tracks: tracks.len(),
        unique_artists: artists.len(),
        first_played: events.iter().map(|e| e.played_at).min(),
        last_played: events.iter().map(|e| e.played_at).max(),
    }
}
