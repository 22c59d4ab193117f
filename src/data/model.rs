use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Utc};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

// ---------------------------------------------------------------------------
// SchemaKind – which export convention a document uses
// ---------------------------------------------------------------------------

/// The two column-naming conventions found in listening-history exports.
///
/// * `Legacy` – the account-data export: `trackName`, `artistName`,
///   `endTime` (naive `YYYY-MM-DD HH:MM`), `msPlayed`. No album column.
/// * `Extended` – the full streaming-history export:
///   `master_metadata_track_name`, `master_metadata_album_artist_name`,
///   `master_metadata_album_album_name`, `ts` (RFC 3339), `ms_played`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaKind {
    Legacy,
    Extended,
}

/// Column names for the semantic fields of one schema variant.
///
/// All record parsing selects columns through this table; nothing outside
/// the data layer names a raw export column.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub track: &'static str,
    pub artist: &'static str,
    /// The legacy export has no album column.
    pub album: Option<&'static str>,
    pub timestamp: &'static str,
    pub ms_played: &'static str,
}

pub const LEGACY_FIELDS: FieldMap = FieldMap {
    track: "trackName",
    artist: "artistName",
    album: None,
    timestamp: "endTime",
    ms_played: "msPlayed",
};

pub const EXTENDED_FIELDS: FieldMap = FieldMap {
    track: "master_metadata_track_name",
    artist: "master_metadata_album_artist_name",
    album: Some("master_metadata_album_album_name"),
    timestamp: "ts",
    ms_played: "ms_played",
};

/// A record matched neither known convention.
#[derive(Debug, Error)]
#[error("record matches no known export schema (columns seen: {columns:?})")]
pub struct UnknownSchema {
    pub columns: Vec<String>,
}

impl SchemaKind {
    /// Detect the convention by presence-testing known column names on a
    /// record object.
    pub fn detect(record: &Map<String, JsonValue>) -> Result<Self, UnknownSchema> {
        if record.contains_key(LEGACY_FIELDS.ms_played)
            && record.contains_key(LEGACY_FIELDS.timestamp)
        {
            Ok(SchemaKind::Legacy)
        } else if record.contains_key(EXTENDED_FIELDS.ms_played)
            && record.contains_key(EXTENDED_FIELDS.timestamp)
        {
            Ok(SchemaKind::Extended)
        } else {
            Err(UnknownSchema {
                columns: record.keys().cloned().collect(),
            })
        }
    }

    /// The column lookup table for this variant.
    pub fn fields(self) -> &'static FieldMap {
        match self {
            SchemaKind::Legacy => &LEGACY_FIELDS,
            SchemaKind::Extended => &EXTENDED_FIELDS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SchemaKind::Legacy => "legacy",
            SchemaKind::Extended => "extended",
        }
    }
}

// ---------------------------------------------------------------------------
// PlayEvent – one row of the history
// ---------------------------------------------------------------------------

/// One recorded song playback, normalized across schema variants.
///
/// Track / artist / album are optional because the extended export writes
/// `null` metadata for podcast and audiobook rows. Those rows still count
/// toward stream totals but are skipped by name-keyed groupings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayEvent {
    pub track: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub played_at: DateTime<Utc>,
    pub ms_played: u64,
}

// ---------------------------------------------------------------------------
// PlayHistory – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The concatenated history with pre-computed indexes.
#[derive(Debug, Clone, Default)]
pub struct PlayHistory {
    /// All play events, in archive-member order.
    pub events: Vec<PlayEvent>,
    /// Sorted unique calendar years present in the data.
    pub years: Vec<i32>,
    /// Which schema variants contributed records.
    pub schemas: BTreeSet<SchemaKind>,
}

impl PlayHistory {
    /// Build indexes from the loaded events.
    pub fn from_events(events: Vec<PlayEvent>, schemas: BTreeSet<SchemaKind>) -> Self {
        let years_set: BTreeSet<i32> = events.iter().map(|e| e.played_at.year()).collect();
        PlayHistory {
            events,
            years: years_set.into_iter().collect(),
            schemas,
        }
    }

    /// Number of play events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
