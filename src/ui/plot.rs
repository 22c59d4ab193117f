use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Legend, Line, Plot, PlotPoints, Polygon};

use crate::color::SeriesColors;
use crate::data::aggregate::{ArtistTrend, ListeningClock, RankedEntry};
use crate::data::format::format_hours;
use crate::state::{AnalysisResult, AppState};

const MS_PER_HOUR: f64 = 3.6e6;

// ---------------------------------------------------------------------------
// Central panel – render the selected analysis
// ---------------------------------------------------------------------------

/// Render the current analysis result in the central panel.
pub fn analysis_plot(ui: &mut Ui, state: &AppState) {
    let Some(result) = &state.result else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listening-history archive  (File → Open…)");
        });
        return;
    };

    match result {
        AnalysisResult::Ranked(rows) => ranked_bars(ui, rows),
        AnalysisResult::Trends(trends) => trend_lines(ui, trends),
        AnalysisResult::Clock(clock) => clock_grid(ui, clock),
    }
}

// ---------------------------------------------------------------------------
// Ranked tables – horizontal bars, top entry at the top
// ---------------------------------------------------------------------------

fn ranked_bars(ui: &mut Ui, rows: &[RankedEntry]) {
    if rows.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Nothing to show for this selection.");
        });
        return;
    }

    let n = rows.len();
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(rank, row)| {
            Bar::new((n - 1 - rank) as f64, row.ms_played as f64 / MS_PER_HOUR)
                .name(format!("{}\n{}", row.label, format_hours(row.ms_played)))
                .width(0.7)
        })
        .collect();
    let chart = BarChart::new(bars)
        .horizontal()
        .color(crate::color::generate_palette(1)[0]);

    Plot::new("ranked_bars")
        .x_axis_formatter(|mark, _range| format!("{:.1}h", mark.value))
        .y_grid_spacer(uniform_grid_spacer(|_| [100.0, 10.0, 1.0]))
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 {
                return String::new();
            }
            let idx = idx as i64;
            if idx < 0 || idx >= n as i64 {
                return String::new();
            }
            labels[n - 1 - idx as usize].clone()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

// ---------------------------------------------------------------------------
// Artist trends – one rolling line per artist
// ---------------------------------------------------------------------------

fn trend_lines(ui: &mut Ui, trends: &[ArtistTrend]) {
    let colors = SeriesColors::new(trends.iter().map(|t| t.artist.clone()));

    Plot::new("artist_trends")
        .legend(Legend::default())
        .x_axis_formatter(|mark, _range| {
            chrono::DateTime::from_timestamp(mark.value as i64, 0)
                .map(|ts| ts.format("%Y-%m").to_string())
                .unwrap_or_default()
        })
        .y_axis_formatter(|mark, _range| format!("{:.1}h", mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trend in trends {
                let points: PlotPoints = trend
                    .points
                    .iter()
                    .map(|&(ts, ms)| [ts.timestamp() as f64, ms as f64 / MS_PER_HOUR])
                    .collect();

                let line = Line::new(points)
                    .name(&trend.artist)
                    .color(colors.color_for(&trend.artist))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Listening clock – hour × weekday grid
// ---------------------------------------------------------------------------

fn clock_grid(ui: &mut Ui, clock: &ListeningClock) {
    let max = clock.max_count().max(1) as f32;

    Plot::new("listening_clock")
        .x_grid_spacer(uniform_grid_spacer(|_| [24.0, 6.0, 1.0]))
        .y_grid_spacer(uniform_grid_spacer(|_| [28.0, 7.0, 1.0]))
        .x_axis_formatter(|mark, _range| {
            let hour = mark.value.round() as i64;
            if (0..24).contains(&hour) && (mark.value - hour as f64).abs() < 1e-6 {
                format!("{hour:02}:00")
            } else {
                String::new()
            }
        })
        .y_axis_formatter(|mark, _range| {
            let row = mark.value.round() as i64;
            if (0..7).contains(&row) && (mark.value - row as f64).abs() < 1e-6 {
                // Row [y, y+1) holds day 6 − y, Monday at the top.
                ListeningClock::DAY_LABELS[(6 - row) as usize].to_string()
            } else {
                String::new()
            }
        })
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (day, hours) in clock.counts.iter().enumerate() {
                let y = (6 - day) as f64;
                for (hour, &count) in hours.iter().enumerate() {
                    let x = hour as f64;
                    let cell = Polygon::new(PlotPoints::from(vec![
                        [x, y],
                        [x + 1.0, y],
                        [x + 1.0, y + 1.0],
                        [x, y + 1.0],
                    ]))
                    .fill_color(heat_color(count as f32 / max))
                    .stroke(Stroke::new(0.5, Color32::from_gray(60)))
                    .name(format!(
                        "{} {:02}:00 — {} streams",
                        ListeningClock::DAY_LABELS[day],
                        hour,
                        count
                    ));
                    plot_ui.polygon(cell);
                }
            }
        });
}

/// Pale → warm ramp scaled by cell intensity.
fn heat_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: f32, b: f32| (a + (b - a) * t) as u8;
    Color32::from_rgb(lerp(250.0, 190.0), lerp(248.0, 50.0), lerp(240.0, 30.0))
}
