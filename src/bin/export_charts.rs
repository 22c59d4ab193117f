use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Duration;

use rewind::chart;
use rewind::data::aggregate;
use rewind::data::format::format_duration;
use rewind::data::loader::{self, DEFAULT_MEMBER_PATTERN};

/// Batch surface: load an archive, log a summary, write the two standard
/// charts next to it. `cargo run --bin export_charts -- my_data.zip [year]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(archive) = args.next().map(PathBuf::from) else {
        bail!("usage: export_charts <archive.zip> [year]");
    };
    let year: Option<i32> = match args.next() {
        Some(raw) => Some(raw.parse().context("year must be a number")?),
        None => None,
    };

    let history = loader::load_archive(&archive, DEFAULT_MEMBER_PATTERN)?;
    let stats = aggregate::summary(&history.events);
    println!(
        "{} streams, {} listened, {} tracks by {} artists",
        stats.streams,
        format_duration(stats.total_ms),
        stats.unique_tracks,
        stats.unique_artists
    );

    let out_dir = archive.parent().unwrap_or_else(|| Path::new("."));

    let tracks = aggregate::top_tracks(&history.events, year, 10);
    let scope = year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "all time".to_string());
    let tracks_path = out_dir.join("top_tracks.png");
    chart::ranked_bar_chart(
        &tracks_path,
        &format!("Top 10 tracks ({scope})"),
        &tracks,
        (1000, 600),
    )?;
    println!("Wrote {}", tracks_path.display());

    let trends = aggregate::top_artist_trends(&history.events, 5, Duration::days(365));
    let trends_path = out_dir.join("top_artists_rolling.png");
    chart::trend_line_chart(
        &trends_path,
        "Top 5 artists (365-day rolling window)",
        &trends,
        (1200, 600),
    )?;
    println!("Wrote {}", trends_path.display());

    Ok(())
}
