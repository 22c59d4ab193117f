use chrono::Duration;

use crate::data::aggregate::{
    self, ArtistTrend, HistorySummary, ListeningClock, RankedEntry,
};
use crate::data::model::PlayHistory;

// ---------------------------------------------------------------------------
// Analysis selection
// ---------------------------------------------------------------------------

/// The analysis presets offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    TopTracks,
    TopArtists,
    TopAlbums,
    ArtistTrends,
    ListeningClock,
}

impl Analysis {
    pub const ALL: [Analysis; 5] = [
        Analysis::TopTracks,
        Analysis::TopArtists,
        Analysis::TopAlbums,
        Analysis::ArtistTrends,
        Analysis::ListeningClock,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Analysis::TopTracks => "Top tracks",
            Analysis::TopArtists => "Top artists",
            Analysis::TopAlbums => "Top albums",
            Analysis::ArtistTrends => "Artist trends",
            Analysis::ListeningClock => "Listening clock",
        }
    }
}

/// Parameters shared by the analyses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisParams {
    /// Restrict ranked analyses to one calendar year; `None` = all time.
    pub year: Option<i32>,
    /// Row count for ranked tables.
    pub limit: usize,
    /// Number of artists drawn in the trends preset.
    pub trend_artists: usize,
    /// Rolling-window length for the trends preset.
    pub window_days: i64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            year: None,
            limit: 10,
            trend_artists: 5,
            window_days: 365,
        }
    }
}

/// Computed output of the selected preset.
#[derive(Debug, Clone)]
pub enum AnalysisResult {
    Ranked(Vec<RankedEntry>),
    Trends(Vec<ArtistTrend>),
    Clock(ListeningClock),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded history (None until the user opens an archive).
    pub history: Option<PlayHistory>,

    /// Selected analysis preset.
    pub analysis: Analysis,

    /// Analysis parameters from the side panel.
    pub params: AnalysisParams,

    /// Result of the selected analysis (cached; recomputed on change only).
    pub result: Option<AnalysisResult>,

    /// Headline numbers for the loaded history.
    pub summary: Option<HistorySummary>,

    /// Archive members must contain this substring to be loaded.
    pub member_pattern: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            history: None,
            analysis: Analysis::TopTracks,
            params: AnalysisParams::default(),
            result: None,
            summary: None,
            member_pattern: crate::data::loader::DEFAULT_MEMBER_PATTERN.to_string(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded history and compute the initial analysis.
    pub fn set_history(&mut self, history: PlayHistory) {
        self.summary = Some(aggregate::summary(&history.events));
        self.history = Some(history);
        self.status_message = None;
        self.recompute();
    }

    /// Recompute the cached result for the selected preset and parameters.
    pub fn recompute(&mut self) {
        let Some(history) = &self.history else {
            self.result = None;
            return;
        };
        let events = &history.events;
        let params = &self.params;

        self.result = Some(match self.analysis {
            Analysis::TopTracks => AnalysisResult::Ranked(aggregate::top_tracks(
                events,
                params.year,
                params.limit,
            )),
            Analysis::TopArtists => AnalysisResult::Ranked(aggregate::top_artists(
                events,
                params.year,
                params.limit,
            )),
            Analysis::TopAlbums => AnalysisResult::Ranked(aggregate::top_albums(
                events,
                params.year,
                params.limit,
            )),
            Analysis::ArtistTrends => AnalysisResult::Trends(aggregate::top_artist_trends(
                events,
                params.trend_artists,
                Duration::days(params.window_days),
            )),
            Analysis::ListeningClock => {
                AnalysisResult::Clock(aggregate::listening_clock(events))
            }
        });
    }

    /// Switch preset and recompute.
    pub fn set_analysis(&mut self, analysis: Analysis) {
        if self.analysis != analysis {
            self.analysis = analysis;
            self.recompute();
        }
    }

    /// The ranked rows of the current result, when the preset is ranked.
    pub fn ranked_rows(&self) -> Option<&[RankedEntry]> {
        match &self.result {
            Some(AnalysisResult::Ranked(rows)) => Some(rows),
            _ => None,
        }
    }

    /// The trend series of the current result, when the preset is trends.
    pub fn trend_series(&self) -> Option<&[ArtistTrend]> {
        match &self.result {
            Some(AnalysisResult::Trends(trends)) => Some(trends),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::data::model::{PlayEvent, SchemaKind};

    use super::*;

    fn history() -> PlayHistory {
        let events = vec![
            PlayEvent {
                track: Some("Sinnerman".into()),
                artist: Some("Nina Simone".into()),
                album: None,
                played_at: "2023-01-10T08:00:00Z".parse().unwrap(),
                ms_played: 600_000,
            },
            PlayEvent {
                track: Some("Angel".into()),
                artist: Some("Massive Attack".into()),
                album: None,
                played_at: "2023-02-10T08:00:00Z".parse().unwrap(),
                ms_played: 400_000,
            },
        ];
        PlayHistory::from_events(events, BTreeSet::from([SchemaKind::Legacy]))
    }

    #[test]
    fn loading_history_computes_summary_and_result() {
        let mut state = AppState::default();
        state.set_history(history());

        assert_eq!(state.summary.as_ref().unwrap().streams, 2);
        let rows = state.ranked_rows().unwrap();
        assert_eq!(rows[0].label, "Sinnerman");
    }

    #[test]
    fn switching_preset_swaps_the_result_shape() {
        let mut state = AppState::default();
        state.set_history(history());

        state.set_analysis(Analysis::ArtistTrends);
        assert!(state.trend_series().is_some());
        assert!(state.ranked_rows().is_none());

        state.set_analysis(Analysis::ListeningClock);
        assert!(matches!(state.result, Some(AnalysisResult::Clock(_))));
    }

    #[test]
    fn parameter_change_takes_effect_on_recompute() {
        let mut state = AppState::default();
        state.set_history(history());

        state.params.limit = 1;
        state.recompute();
        assert_eq!(state.ranked_rows().unwrap().len(), 1);
    }
}
