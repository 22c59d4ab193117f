use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use zip::ZipArchive;

use super::model::{PlayEvent, PlayHistory, SchemaKind};

/// Member names must contain this substring to be loaded. The default
/// matches both the legacy `StreamingHistory*.json` members and the extended
/// `Streaming_History_Audio_*.json` members.
pub const DEFAULT_MEMBER_PATTERN: &str = "Streaming";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a listening-history archive from disk.
pub fn load_archive(path: &Path, pattern: &str) -> Result<PlayHistory> {
    let file =
        File::open(path).with_context(|| format!("opening archive {}", path.display()))?;
    load_archive_reader(file, pattern)
}

/// Load from any seekable reader. An uploaded in-memory buffer works through
/// `std::io::Cursor`.
pub fn load_archive_reader<R: Read + Seek>(reader: R, pattern: &str) -> Result<PlayHistory> {
    let mut archive = ZipArchive::new(reader).context("reading zip archive")?;

    let members: Vec<String> = archive
        .file_names()
        .filter(|name| name.contains(pattern))
        .map(str::to_owned)
        .collect();

    if members.is_empty() {
        bail!("archive contains no members matching '{pattern}'");
    }

    let mut events = Vec::new();
    let mut schemas = BTreeSet::new();

    for name in &members {
        let mut member = archive
            .by_name(name)
            .with_context(|| format!("opening archive member {name}"))?;
        let mut text = String::new();
        member
            .read_to_string(&mut text)
            .with_context(|| format!("reading archive member {name}"))?;

        if let Some((kind, mut parsed)) =
            parse_member(&text).with_context(|| format!("parsing {name}"))?
        {
            schemas.insert(kind);
            events.append(&mut parsed);
        }
    }

    Ok(PlayHistory::from_events(events, schemas))
}

// ---------------------------------------------------------------------------
// Member parsing
// ---------------------------------------------------------------------------

/// Parse one archive member: a JSON array of play-event records, all of one
/// schema variant. Returns `None` for an empty array (no rows to detect a
/// schema from).
fn parse_member(text: &str) -> Result<Option<(SchemaKind, Vec<PlayEvent>)>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("expected top-level JSON array")?;

    let Some(first) = records.first() else {
        return Ok(None);
    };
    let first_obj = first.as_object().context("row 0 is not a JSON object")?;
    let kind = SchemaKind::detect(first_obj)?;

    let events = records
        .iter()
        .enumerate()
        .map(|(row, record)| parse_event(kind, record, row))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some((kind, events)))
}

fn parse_event(kind: SchemaKind, record: &JsonValue, row: usize) -> Result<PlayEvent> {
    let obj = record
        .as_object()
        .with_context(|| format!("row {row} is not a JSON object"))?;
    let fields = kind.fields();

    let ms_played = obj
        .get(fields.ms_played)
        .and_then(JsonValue::as_u64)
        .with_context(|| format!("row {row}: missing or invalid '{}'", fields.ms_played))?;

    let raw_ts = obj
        .get(fields.timestamp)
        .and_then(JsonValue::as_str)
        .with_context(|| format!("row {row}: missing or invalid '{}'", fields.timestamp))?;
    let played_at = parse_timestamp(raw_ts)
        .with_context(|| format!("row {row}: unrecognised timestamp '{raw_ts}'"))?;

    Ok(PlayEvent {
        track: string_field(obj.get(fields.track)),
        artist: string_field(obj.get(fields.artist)),
        album: fields.album.and_then(|col| string_field(obj.get(col))),
        played_at,
        ms_played,
    })
}

/// Nulls and missing columns both normalize to `None` (podcast rows).
fn string_field(value: Option<&JsonValue>) -> Option<String> {
    value.and_then(JsonValue::as_str).map(str::to_owned)
}

/// The extended export writes RFC 3339 instants; the legacy export writes
/// naive minutes with no zone, which are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    const LEGACY_MEMBER: &str = r#"[
        {"endTime": "2023-04-01 21:02", "artistName": "Nina Simone",
         "trackName": "Sinnerman", "msPlayed": 612000},
        {"endTime": "2023-04-02 08:15", "artistName": "Nina Simone",
         "trackName": "Feeling Good", "msPlayed": 177000}
    ]"#;

    const EXTENDED_MEMBER: &str = r#"[
        {"ts": "2023-04-03T10:00:00Z", "ms_played": 240000,
         "master_metadata_track_name": "Sinnerman",
         "master_metadata_album_artist_name": "Nina Simone",
         "master_metadata_album_album_name": "Pastel Blues"},
        {"ts": "2023-04-03T11:00:00Z", "ms_played": 90000,
         "master_metadata_track_name": null,
         "master_metadata_album_artist_name": null,
         "master_metadata_album_album_name": null}
    ]"#;

    fn archive(members: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in members {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn loads_and_concatenates_matching_members() {
        let cursor = archive(&[
            ("MyData/StreamingHistory0.json", LEGACY_MEMBER),
            ("MyData/Streaming_History_Audio_2023.json", EXTENDED_MEMBER),
            ("MyData/Playlist1.json", r#"[{"name": "mix"}]"#),
        ]);

        let history = load_archive_reader(cursor, "StreamingHistory").unwrap();
        // Only the legacy member matches the default pattern.
        assert_eq!(history.len(), 2);
        assert_eq!(history.schemas.len(), 1);

        let cursor = archive(&[
            ("MyData/StreamingHistory0.json", LEGACY_MEMBER),
            ("MyData/Streaming_History_Audio_2023.json", EXTENDED_MEMBER),
        ]);
        let history = load_archive_reader(cursor, "Streaming").unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.schemas.len(), 2);
    }

    #[test]
    fn normalizes_both_variants_to_the_same_fields() {
        let cursor = archive(&[("Streaming_History_Audio_2023.json", EXTENDED_MEMBER)]);
        let history = load_archive_reader(cursor, "Streaming").unwrap();

        let track = &history.events[0];
        assert_eq!(track.track.as_deref(), Some("Sinnerman"));
        assert_eq!(track.artist.as_deref(), Some("Nina Simone"));
        assert_eq!(track.album.as_deref(), Some("Pastel Blues"));
        assert_eq!(track.ms_played, 240000);

        // Podcast row: null metadata survives as None.
        let podcast = &history.events[1];
        assert_eq!(podcast.track, None);
        assert_eq!(podcast.ms_played, 90000);
    }

    #[test]
    fn legacy_timestamps_parse_as_utc_minutes() {
        let cursor = archive(&[("StreamingHistory0.json", LEGACY_MEMBER)]);
        let history = load_archive_reader(cursor, "StreamingHistory").unwrap();
        assert_eq!(
            history.events[0].played_at,
            "2023-04-01T21:02:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn no_matching_members_is_an_error() {
        let cursor = archive(&[("Payments.json", "[]")]);
        let err = load_archive_reader(cursor, "StreamingHistory").unwrap_err();
        assert!(err.to_string().contains("StreamingHistory"));
    }

    #[test]
    fn malformed_rows_fail_with_member_context() {
        let cursor = archive(&[(
            "StreamingHistory0.json",
            r#"[{"endTime": "not a time", "trackName": "x", "artistName": "y", "msPlayed": 1}]"#,
        )]);
        let err = load_archive_reader(cursor, "StreamingHistory").unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("StreamingHistory0.json"));
        assert!(chain.contains("not a time"));
    }

    #[test]
    fn empty_members_contribute_nothing() {
        let cursor = archive(&[
            ("StreamingHistory0.json", "[]"),
            ("StreamingHistory1.json", LEGACY_MEMBER),
        ]);
        let history = load_archive_reader(cursor, "StreamingHistory").unwrap();
        assert_eq!(history.len(), 2);
    }
}
