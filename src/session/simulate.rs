//! Headless runs with a scripted player on a synthetic clock.
//!
//! The simulator drives the same [`GameDriver`] as the terminal loop. Each
//! answer advances the clock by a fixed amount, so assessment ticks fire and
//! the time limit can end a run exactly as it would interactively.

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::puzzle::builder::PuzzleBuilder;
use crate::puzzle::level::LevelCatalog;

use super::driver::GameDriver;
use super::model::{
    FinishReason, Mode, PracticeResult, PracticeSettings, Session, SessionEvent, SessionNotice,
    SessionSettings,
};
use super::summary::SessionSummary;

/// Keeps the player's coin flips independent from puzzle generation.
const PLAYER_SEED_SALT: u64 = 0x5bd1_e995;
/// Loop guard: answers plus advances needed per round, with slack.
const STEPS_PER_ROUND: usize = 16;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    /// `None` runs an assessment.
    pub practice: Option<PracticeSettings>,
    /// Rounds to play. For an assessment this also caps the run.
    pub rounds: u32,
    /// Probability that each single answer is correct.
    pub accuracy: f64,
    /// Synthetic time spent on each answer.
    pub answer_time: Duration,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub mode: Mode,
    pub finish_reason: Option<FinishReason>,
    pub time_left: u32,
    /// Level id of the last puzzle in play.
    pub final_level: u32,
    pub summary: SessionSummary,
    #[serde(skip)]
    pub notices: Vec<SessionNotice>,
}

/// Play one run to completion and report what happened.
#[must_use]
pub fn simulate(
    mut settings: SessionSettings,
    catalog: LevelCatalog,
    plan: &SimulationPlan,
) -> SimulationReport {
    let accuracy = if plan.accuracy.is_finite() {
        plan.accuracy.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut player = plan.seed.map_or_else(StdRng::from_os_rng, |s| {
        StdRng::seed_from_u64(s ^ PLAYER_SEED_SALT)
    });

    let (mode, start) = match plan.practice {
        Some(practice) => (Mode::PracticePlay, SessionEvent::StartPractice(practice)),
        None => {
            settings.assessment_rounds = plan.rounds;
            (Mode::Assessment, SessionEvent::StartAssessment)
        }
    };

    let builder = PuzzleBuilder::new(catalog, plan.seed);
    let mut driver = GameDriver::new(Session::new(settings), builder, Vec::<SessionNotice>::new());
    let mut now = Instant::now();
    driver.dispatch(start, now);

    let target = plan.rounds as usize;
    let budget = target.saturating_mul(STEPS_PER_ROUND).saturating_add(STEPS_PER_ROUND);

    for _ in 0..budget {
        let session = driver.session();
        if session.mode != mode || session.history.len() >= target {
            break;
        }

        if let Some(result) = session.practice_result {
            match (result, driver.next_deadline()) {
                (PracticeResult::Success, Some(at)) => {
                    now = now.max(at);
                    driver.pump(now);
                }
                _ => driver.dispatch(SessionEvent::RequestNext, now),
            }
            continue;
        }

        let Some(puzzle) = session.puzzle.as_ref() else {
            break;
        };
        let Some(layer_index) = puzzle.focus_layer() else {
            break;
        };
        let layer = &puzzle.layers[layer_index];
        let correct = layer.code;
        let wrong: Vec<_> = layer
            .options
            .map(|opts| opts.into_iter().filter(|c| *c != correct).collect())
            .unwrap_or_default();

        now += plan.answer_time;
        driver.pump(now);
        if driver.session().mode != mode {
            break;
        }

        let code = if wrong.is_empty() || player.random_bool(accuracy) {
            correct
        } else {
            wrong[player.random_range(0..wrong.len())]
        };
        driver.dispatch(SessionEvent::SubmitAnswer { code, layer_index }, now);
    }

    let session = driver.session();
    let summary = SessionSummary::from_history(&session.history);
    let time_left = session.time_left;
    let final_level = session
        .puzzle
        .as_ref()
        .map(|p| p.level.id)
        .or_else(|| session.history.last().map(|r| r.level))
        .unwrap_or(0);

    // Practice has no natural end; close the run so it is logged as abandoned.
    if mode == Mode::PracticePlay {
        driver.dispatch(SessionEvent::GoHome, now);
    }

    let (_, notices) = driver.into_parts();
    let finish_reason = notices.iter().find_map(|n| match n {
        SessionNotice::RunFinished { reason, .. } => Some(*reason),
        _ => None,
    });

    SimulationReport {
        mode,
        finish_reason,
        time_left,
        final_level,
        summary,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::PracticeType;

    fn plan(practice: Option<PracticeSettings>, accuracy: f64, answer_ms: u64) -> SimulationPlan {
        SimulationPlan {
            practice,
            rounds: 24,
            accuracy,
            answer_time: Duration::from_millis(answer_ms),
            seed: Some(42),
        }
    }

    #[test]
    fn perfect_assessment_plays_every_round() {
        let report = simulate(
            SessionSettings::default(),
            LevelCatalog::builtin(),
            &plan(None, 1.0, 1000),
        );
        assert_eq!(report.finish_reason, Some(FinishReason::RoundsExhausted));
        assert_eq!(report.summary.rounds_played, 24);
        assert_eq!(report.summary.correct, 24);
        assert_eq!(report.summary.accuracy_pct, 100);
        assert!(report.summary.mistakes.is_empty());
        assert_eq!(report.summary.peak_level, 11);
    }

    #[test]
    fn slow_player_runs_out_of_time() {
        let report = simulate(
            SessionSettings::default(),
            LevelCatalog::builtin(),
            &plan(None, 1.0, 60_000),
        );
        assert_eq!(report.finish_reason, Some(FinishReason::TimeExpired));
        assert_eq!(report.time_left, 0);
        assert!(report.summary.rounds_played < 24);
    }

    #[test]
    fn hopeless_player_scores_nothing() {
        let report = simulate(
            SessionSettings::default(),
            LevelCatalog::builtin(),
            &plan(None, 0.0, 1000),
        );
        assert_eq!(report.summary.score, 0);
        assert_eq!(report.summary.correct, 0);
        assert_eq!(report.summary.mistakes.len(), report.summary.rounds_played);
        assert_eq!(report.final_level, 1);
    }

    #[test]
    fn practice_run_stops_at_round_target_and_is_abandoned() {
        let practice = PracticeSettings {
            practice_type: PracticeType::Progressive,
            start_level: 0,
        };
        let report = simulate(
            SessionSettings::default(),
            LevelCatalog::builtin(),
            &plan(Some(practice), 0.7, 1000),
        );
        assert_eq!(report.summary.rounds_played, 24);
        assert!(report.finish_reason.is_none());
        assert!(matches!(
            report.notices.last(),
            Some(SessionNotice::RunAbandoned {
                mode: Mode::PracticePlay,
                ..
            })
        ));
    }

    #[test]
    fn seeded_runs_repeat() {
        let p = plan(None, 0.6, 3000);
        let a = simulate(SessionSettings::default(), LevelCatalog::builtin(), &p);
        let b = simulate(SessionSettings::default(), LevelCatalog::builtin(), &p);
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.time_left, b.time_left);
    }

    #[test]
    fn nan_accuracy_is_treated_as_zero() {
        let report = simulate(
            SessionSettings::default(),
            LevelCatalog::builtin(),
            &plan(None, f64::NAN, 1000),
        );
        assert_eq!(report.summary.correct, 0);
    }
}
