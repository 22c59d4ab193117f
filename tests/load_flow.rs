use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use rewind::data::{aggregate, loader};

/// (track, artist, album, minute-aligned UTC timestamp, ms played)
type Play = (&'static str, &'static str, &'static str, &'static str, u64);

const PLAYS: &[Play] = &[
    ("Sinnerman", "Nina Simone", "Pastel Blues", "2023-04-01 21:02", 612_000),
    ("Sinnerman", "Nina Simone", "Pastel Blues", "2023-04-02 08:15", 300_000),
    ("Teardrop", "Massive Attack", "Mezzanine", "2023-04-02 09:00", 330_000),
    ("Teardrop", "Massive Attack", "Mezzanine", "2023-05-10 22:40", 330_000),
    ("Roygbiv", "Boards of Canada", "Music Has the Right to Children", "2023-06-01 07:30", 151_000),
];

fn legacy_member() -> String {
    let rows: Vec<_> = PLAYS
        .iter()
        .map(|&(track, artist, _album, ts, ms)| {
            json!({
                "endTime": ts,
                "artistName": artist,
                "trackName": track,
                "msPlayed": ms,
            })
        })
        .collect();
    serde_json::to_string(&rows).unwrap()
}

fn extended_member() -> String {
    let rows: Vec<_> = PLAYS
        .iter()
        .map(|&(track, artist, album, ts, ms)| {
            json!({
                "ts": format!("{}:00Z", ts.replacen(' ', "T", 1)),
                "ms_played": ms,
                "master_metadata_track_name": track,
                "master_metadata_album_artist_name": artist,
                "master_metadata_album_album_name": album,
            })
        })
        .collect();
    serde_json::to_string(&rows).unwrap()
}

fn write_archive(dir: &Path, name: &str, members: &[(&str, String)]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    for (member, body) in members {
        writer
            .start_file(member.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

#[test]
fn both_schema_variants_aggregate_identically() {
    let dir = tempfile::tempdir().unwrap();

    let legacy = write_archive(
        dir.path(),
        "legacy.zip",
        &[("StreamingHistory0.json", legacy_member())],
    );
    let extended = write_archive(
        dir.path(),
        "extended.zip",
        &[("Streaming_History_Audio_2023.json", extended_member())],
    );

    let legacy_history = loader::load_archive(&legacy, "Streaming").unwrap();
    let extended_history = loader::load_archive(&extended, "Streaming").unwrap();

    // Same plays, same instants, same totals once field names are mapped.
    assert_eq!(legacy_history.len(), extended_history.len());
    assert_eq!(
        aggregate::top_tracks(&legacy_history.events, None, 10),
        aggregate::top_tracks(&extended_history.events, None, 10),
    );
    assert_eq!(
        aggregate::top_artists(&legacy_history.events, Some(2023), 10),
        aggregate::top_artists(&extended_history.events, Some(2023), 10),
    );
}

#[test]
fn mixed_archive_concatenates_and_ranks() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(
        dir.path(),
        "mixed.zip",
        &[
            ("MyData/StreamingHistory0.json", legacy_member()),
            ("MyData/Streaming_History_Audio_2023.json", extended_member()),
            ("MyData/Playlist1.json", json!([{"name": "mix"}]).to_string()),
        ],
    );

    let history = loader::load_archive(&archive, "Streaming").unwrap();
    assert_eq!(history.len(), PLAYS.len() * 2);
    assert_eq!(history.schemas.len(), 2);
    assert_eq!(history.years, vec![2023]);

    // Top-N is a descending, truncated subset of the full ranking.
    let all = aggregate::top_tracks(&history.events, None, usize::MAX);
    let top2 = aggregate::top_tracks(&history.events, None, 2);
    assert_eq!(top2.as_slice(), &all[..2]);
    assert!(all.windows(2).all(|w| w[0].ms_played >= w[1].ms_played));

    // Doubled data doubles the per-track totals.
    assert_eq!(all[0].label, "Sinnerman");
    assert_eq!(all[0].ms_played, 2 * (612_000 + 300_000));

    let summary = aggregate::summary(&history.events);
    assert_eq!(summary.streams, 10);
    assert_eq!(summary.unique_tracks, 3);
    assert_eq!(summary.unique_artists, 3);
}

#[test]
fn album_grouping_only_exists_in_the_extended_schema() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = write_archive(
        dir.path(),
        "legacy.zip",
        &[("StreamingHistory0.json", legacy_member())],
    );
    let extended = write_archive(
        dir.path(),
        "extended.zip",
        &[("Streaming_History_Audio_2023.json", extended_member())],
    );

    let legacy_history = loader::load_archive(&legacy, "Streaming").unwrap();
    assert!(aggregate::top_albums(&legacy_history.events, None, 10).is_empty());

    let extended_history = loader::load_archive(&extended, "Streaming").unwrap();
    let albums = aggregate::top_albums(&extended_history.events, None, 10);
    assert_eq!(albums[0].label, "Pastel Blues — Nina Simone");
}
