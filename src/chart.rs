use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use plotters::prelude::*;

use crate::color::SeriesColors;
use crate::data::aggregate::{ArtistTrend, RankedEntry};

const MS_PER_HOUR: f64 = 3.6e6;

fn rgb(color: eframe::egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

// ---------------------------------------------------------------------------
// Ranked horizontal bar chart
// ---------------------------------------------------------------------------

/// Render a ranked table as a horizontal bar chart PNG, top entry at the top,
/// value axis in hours.
pub fn ranked_bar_chart(
    path: &Path,
    title: &str,
    rows: &[RankedEntry],
    size: (u32, u32),
) -> Result<()> {
    if rows.is_empty() {
        bail!("nothing to chart: ranked table is empty");
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).context("filling chart background")?;

    let max_hours = rows
        .iter()
        .map(|r| r.ms_played as f64 / MS_PER_HOUR)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let n = rows.len() as i32;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(240)
        .build_cartesian_2d(0f64..max_hours * 1.05, (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Listening time")
        .x_label_formatter(&|hours| format!("{hours:.1}h"))
        .y_labels(rows.len())
        .y_label_formatter(&|seg| {
            // Segment k holds rank n-1-k so rank 0 draws at the top.
            let idx = match seg {
                SegmentValue::Exact(v) | SegmentValue::CenterOf(v) => *v,
                SegmentValue::Last => return String::new(),
            };
            rows.get((n - 1 - idx) as usize)
                .map(|row| row.label.clone())
                .unwrap_or_default()
        })
        .draw()?;

    let bar_color = rgb(crate::color::generate_palette(1)[0]);
    chart.draw_series(rows.iter().enumerate().map(|(rank, row)| {
        let y = n - 1 - rank as i32;
        let hours = row.ms_played as f64 / MS_PER_HOUR;
        Rectangle::new(
            [
                (0.0, SegmentValue::Exact(y)),
                (hours, SegmentValue::Exact(y + 1)),
            ],
            bar_color.mix(0.8).filled(),
        )
    }))?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Rolling trend time-series
// ---------------------------------------------------------------------------

/// Render rolling artist histories as a multi-line time plot PNG, one line
/// per artist, y axis in hours.
pub fn trend_line_chart(
    path: &Path,
    title: &str,
    trends: &[ArtistTrend],
    size: (u32, u32),
) -> Result<()> {
    let mut span: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for &(ts, _) in trends.iter().flat_map(|t| &t.points) {
        span = Some(match span {
            Some((first, last)) => (first.min(ts), last.max(ts)),
            None => (ts, ts),
        });
    }
    let Some((first, mut last)) = span else {
        bail!("nothing to chart: no trend points");
    };
    if last <= first {
        last = first + chrono::Duration::days(1);
    }

    let max_hours = trends
        .iter()
        .flat_map(|t| t.points.iter().map(|&(_, ms)| ms as f64 / MS_PER_HOUR))
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).context("filling chart background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first..last, 0f64..max_hours * 1.05)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|ts: &DateTime<Utc>| ts.format("%Y-%m").to_string())
        .y_desc("Listening time")
        .y_label_formatter(&|hours| format!("{hours:.1}h"))
        .draw()?;

    let colors = SeriesColors::new(trends.iter().map(|t| t.artist.clone()));
    for trend in trends {
        let color = rgb(colors.color_for(&trend.artist));
        chart
            .draw_series(LineSeries::new(
                trend
                    .points
                    .iter()
                    .map(|&(ts, ms)| (ts, ms as f64 / MS_PER_HOUR)),
                color.stroke_width(2),
            ))?
            .label(&trend.artist)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
