use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart;
use crate::data::aggregate::RankedEntry;
use crate::data::format::{format_duration, format_hours};
use crate::data::loader;
use crate::state::{Analysis, AnalysisResult, AppState};

// ---------------------------------------------------------------------------
// Left side panel – analysis selection and parameters
// ---------------------------------------------------------------------------

/// Render the left analysis panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    let years = state
        .history
        .as_ref()
        .map(|h| h.years.clone())
        .unwrap_or_default();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Preset selector ----
            ui.strong("Preset");
            let current = state.analysis;
            egui::ComboBox::from_id_salt("analysis_preset")
                .selected_text(current.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for preset in Analysis::ALL {
                        if ui
                            .selectable_label(current == preset, preset.label())
                            .clicked()
                        {
                            state.set_analysis(preset);
                        }
                    }
                });
            ui.add_space(4.0);

            // ---- Per-preset parameters ----
            match state.analysis {
                Analysis::TopTracks | Analysis::TopArtists | Analysis::TopAlbums => {
                    let year_label = state
                        .params
                        .year
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "All time".to_string());
                    egui::ComboBox::from_id_salt("year_filter")
                        .selected_text(year_label)
                        .show_ui(ui, |ui: &mut Ui| {
                            if ui
                                .selectable_label(state.params.year.is_none(), "All time")
                                .clicked()
                            {
                                state.params.year = None;
                                changed = true;
                            }
                            for &year in &years {
                                if ui
                                    .selectable_label(
                                        state.params.year == Some(year),
                                        year.to_string(),
                                    )
                                    .clicked()
                                {
                                    state.params.year = Some(year);
                                    changed = true;
                                }
                            }
                        });

                    changed |= ui
                        .add(egui::Slider::new(&mut state.params.limit, 3..=50).text("Rows"))
                        .changed();
                }
                Analysis::ArtistTrends => {
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut state.params.trend_artists, 1..=10)
                                .text("Artists"),
                        )
                        .changed();
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut state.params.window_days, 30..=730)
                                .text("Window (days)"),
                        )
                        .changed();
                }
                Analysis::ListeningClock => {}
            }

            ui.separator();

            // ---- Input options ----
            ui.strong("Input");
            ui.label("Member name pattern");
            ui.text_edit_singleline(&mut state.member_pattern);

            ui.separator();

            // ---- Dataset summary ----
            ui.strong("Summary");
            match (&state.summary, &state.history) {
                (Some(summary), Some(history)) => {
                    ui.label(format!("{} streams", summary.streams));
                    ui.label(format!(
                        "{} listened ({})",
                        format_duration(summary.total_ms),
                        format_hours(summary.total_ms)
                    ));
                    ui.label(format!("{} unique tracks", summary.unique_tracks));
                    ui.label(format!("{} unique artists", summary.unique_artists));
                    if let (Some(first), Some(last)) =
                        (summary.first_played, summary.last_played)
                    {
                        ui.label(format!(
                            "{} → {}",
                            first.format("%Y-%m-%d"),
                            last.format("%Y-%m-%d")
                        ));
                    }
                    let schemas: Vec<&str> =
                        history.schemas.iter().map(|s| s.label()).collect();
                    ui.label(format!("Schema: {}", schemas.join(", ")));
                }
                _ => {
                    ui.label("No archive loaded.");
                }
            }
        });

    if changed {
        state.recompute();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open archive…").clicked() {
                open_archive_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(
                    state.result.is_some(),
                    egui::Button::new("Export chart as PNG…"),
                )
                .clicked()
            {
                export_png_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(
                    state.ranked_rows().is_some(),
                    egui::Button::new("Export table as CSV…"),
                )
                .clicked()
            {
                export_csv_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(history) = &state.history {
            ui.label(format!("{} streams loaded", history.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_archive_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listening-history archive")
        .add_filter("ZIP archive", &["zip"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_archive(&path, &state.member_pattern) {
            Ok(history) => {
                log::info!(
                    "Loaded {} play events across years {:?}",
                    history.len(),
                    history.years
                );
                state.set_history(history);
            }
            Err(e) => {
                log::error!("Failed to load archive: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn export_png_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .add_filter("PNG image", &["png"])
        .set_file_name("chart.png")
        .save_file();
    let Some(path) = file else { return };

    let title = chart_title(state);
    let outcome = match &state.result {
        Some(AnalysisResult::Ranked(rows)) => {
            chart::ranked_bar_chart(&path, &title, rows, (1000, 600))
        }
        Some(AnalysisResult::Trends(trends)) => {
            chart::trend_line_chart(&path, &title, trends, (1200, 600))
        }
        _ => {
            state.status_message =
                Some("PNG export covers ranked tables and artist trends.".to_string());
            return;
        }
    };

    match outcome {
        Ok(()) => {
            log::info!("Wrote chart to {}", path.display());
            state.status_message = Some(format!("Saved {}", path.display()));
        }
        Err(e) => {
            log::error!("Chart export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_csv_dialog(state: &mut AppState) {
    let Some(rows) = state.ranked_rows() else { return };
    let rows = rows.to_vec();

    let file = rfd::FileDialog::new()
        .set_title("Export table")
        .add_filter("CSV", &["csv"])
        .set_file_name("analysis.csv")
        .save_file();
    let Some(path) = file else { return };

    match write_ranked_csv(&path, &rows) {
        Ok(()) => {
            log::info!("Wrote table to {}", path.display());
            state.status_message = Some(format!("Saved {}", path.display()));
        }
        Err(e) => {
            log::error!("CSV export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_ranked_csv(path: &Path, rows: &[RankedEntry]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Chart caption: preset name plus the active scope.
fn chart_title(state: &AppState) -> String {
    match state.analysis {
        Analysis::ArtistTrends => format!(
            "{} ({}-day rolling window)",
            state.analysis.label(),
            state.params.window_days
        ),
        _ => match state.params.year {
            Some(year) => format!("{} ({year})", state.analysis.label()),
            None => format!("{} (all time)", state.analysis.label()),
        },
    }
}
