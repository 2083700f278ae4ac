//! End-of-run statistics derived from round history.

use serde::Serialize;

use super::model::HistoryRecord;

/// Aggregate view of a finished (or abandoned) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub rounds_played: usize,
    pub correct: usize,
    /// Rounded percentage of correct rounds, 0 when nothing was played.
    pub accuracy_pct: u32,
    /// Highest level id reached, 0 when nothing was played.
    pub peak_level: u32,
    pub score: u32,
    /// History indices of the rounds answered wrongly.
    pub mistakes: Vec<usize>,
}

impl SessionSummary {
    #[must_use]
    pub fn from_history(history: &[HistoryRecord]) -> Self {
        let rounds_played = history.len();
        let correct = history.iter().filter(|r| r.correct).count();
        let accuracy_pct = if rounds_played == 0 {
            0
        } else {
            u32::try_from((correct * 100 + rounds_played / 2) / rounds_played).unwrap_or(100)
        };
        Self {
            rounds_played,
            correct,
            accuracy_pct,
            peak_level: history.iter().map(|r| r.level).max().unwrap_or(0),
            score: history.iter().map(|r| r.earned).sum(),
            mistakes: history
                .iter()
                .enumerate()
                .filter(|(_, r)| !r.correct)
                .map(|(i, _)| i)
                .collect(),
        }
    }
}

/// Render seconds as `m:ss`.
#[must_use]
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
