//! Pure update function for the Switch Challenge state machine.
//!
//! `update()` takes the current session and an event, mutates the session,
//! and returns a command describing any side-effects the runtime should
//! execute.
//!
//! **Design invariant:** this module performs zero I/O. Timers, deferred
//! advances and logging are all described as [`SessionCmd`] values.

use crate::puzzle::builder::PuzzleBuilder;
use crate::puzzle::permutation::PermutationCode;

use super::model::{
    FinishReason, HistoryRecord, Mode, PracticeResult, PracticeSettings, RoundToken, Session,
    SessionCmd, SessionEvent, SessionNotice,
};
use super::progression::{assessment_next_level, practice_next_level, resolve_pick};

/// Apply an event to the session and return the next command for the runtime.
///
/// Every state transition goes through this function. Events that make no
/// sense in the current state are ignored and return [`SessionCmd::None`].
pub fn update(session: &mut Session, builder: &mut PuzzleBuilder, event: SessionEvent) -> SessionCmd {
    match event {
        SessionEvent::StartAssessment => start_assessment(session, builder),

        SessionEvent::OpenPracticeConfig => {
            if session.mode == Mode::Home {
                session.mode = Mode::PracticeConfig;
            }
            SessionCmd::None
        }

        SessionEvent::StartPractice(settings) => start_practice(session, builder, settings),

        SessionEvent::SubmitAnswer { code, layer_index } => {
            handle_answer(session, builder, code, layer_index)
        }

        SessionEvent::RequestNext => {
            if session.mode != Mode::PracticePlay
                || session.is_reviewing()
                || session.practice_result.is_none()
            {
                return SessionCmd::None;
            }
            let last_correct = session.history.last().is_some_and(|r| r.correct);
            let next = next_practice_level(session, builder, last_correct);
            advance_round(session, builder, next);
            SessionCmd::None
        }

        SessionEvent::DeferredAdvance { token, next_level } => {
            if session.mode == Mode::PracticePlay
                && session.round_token() == Some(token)
                && session.practice_result == Some(PracticeResult::Success)
            {
                advance_round(session, builder, next_level);
            }
            SessionCmd::None
        }

        SessionEvent::Tick => {
            if session.mode != Mode::Assessment {
                return SessionCmd::None;
            }
            session.time_left = session.time_left.saturating_sub(1);
            if session.time_left == 0 {
                finish(session, FinishReason::TimeExpired)
            } else {
                SessionCmd::None
            }
        }

        SessionEvent::SelectReview(index) => {
            if session.mode == Mode::Finished && index < session.history.len() {
                session.review = Some(index);
            }
            SessionCmd::None
        }

        SessionEvent::ClearReview => {
            session.review = None;
            SessionCmd::None
        }

        SessionEvent::ReviewPrevious => {
            if matches!(session.mode, Mode::PracticePlay | Mode::Finished)
                && !session.history.is_empty()
            {
                let from = session.review.unwrap_or(session.history.len());
                session.review = Some(from.saturating_sub(1));
            }
            SessionCmd::None
        }

        SessionEvent::ReviewNext => {
            if let Some(i) = session.review {
                session.review = if i + 1 >= session.history.len() {
                    None
                } else {
                    Some(i + 1)
                };
            }
            SessionCmd::None
        }

        SessionEvent::GoBack => match session.mode {
            Mode::Home => SessionCmd::None,
            Mode::Finished if session.is_reviewing() => {
                session.review = None;
                SessionCmd::None
            }
            _ => go_home(session),
        },

        SessionEvent::GoHome => go_home(session),
    }
}

// ──────────────────── run lifecycle ────────────────────

fn reset_run(session: &mut Session, mode: Mode, level_index: usize) {
    session.mode = mode;
    session.epoch = session.epoch.wrapping_add(1);
    session.round = 1;
    session.level_index = level_index;
    session.score = 0;
    session.history.clear();
    session.time_left = session.settings.time_limit_secs;
    session.random_phase = false;
    session.solved_mystery = 0;
    session.review = None;
    session.practice_result = None;
}

fn start_assessment(session: &mut Session, builder: &mut PuzzleBuilder) -> SessionCmd {
    reset_run(session, Mode::Assessment, 0);
    let puzzle = builder.generate_puzzle(0);
    let level = puzzle.level.id;
    session.puzzle = Some(puzzle);
    SessionCmd::batch(vec![
        SessionCmd::StartTimer,
        SessionCmd::Notify(SessionNotice::RunStarted {
            mode: Mode::Assessment,
            level,
        }),
    ])
}

fn start_practice(
    session: &mut Session,
    builder: &mut PuzzleBuilder,
    settings: PracticeSettings,
) -> SessionCmd {
    let was_assessment = session.mode == Mode::Assessment;
    let start = builder.catalog().clamp_index(settings.start_level);
    reset_run(session, Mode::PracticePlay, start);
    session.practice = PracticeSettings {
        practice_type: settings.practice_type,
        start_level: start,
    };
    let puzzle = builder.generate_puzzle(start);
    let level = puzzle.level.id;
    session.puzzle = Some(puzzle);

    let mut cmds = Vec::new();
    if was_assessment {
        cmds.push(SessionCmd::StopTimer);
    }
    cmds.push(SessionCmd::Notify(SessionNotice::RunStarted {
        mode: Mode::PracticePlay,
        level,
    }));
    SessionCmd::batch(cmds)
}

fn go_home(session: &mut Session) -> SessionCmd {
    let previous = session.mode;
    if previous == Mode::Home {
        return SessionCmd::None;
    }

    let mut cmds = Vec::new();
    if previous == Mode::Assessment {
        cmds.push(SessionCmd::StopTimer);
    }
    if previous.is_playing() {
        cmds.push(SessionCmd::Notify(SessionNotice::RunAbandoned {
            mode: previous,
            round: session.round,
            score: session.score,
        }));
    }

    session.mode = Mode::Home;
    session.epoch = session.epoch.wrapping_add(1);
    session.puzzle = None;
    session.solved_mystery = 0;
    session.review = None;
    session.practice_result = None;
    SessionCmd::batch(cmds)
}

fn finish(session: &mut Session, reason: FinishReason) -> SessionCmd {
    session.mode = Mode::Finished;
    session.review = None;
    SessionCmd::batch(vec![
        SessionCmd::StopTimer,
        SessionCmd::Notify(SessionNotice::RunFinished {
            reason,
            score: session.score,
            rounds_played: session.history.len(),
            time_left: session.time_left,
        }),
    ])
}

// ──────────────────── answers ────────────────────

fn handle_answer(
    session: &mut Session,
    builder: &mut PuzzleBuilder,
    code: PermutationCode,
    layer_index: usize,
) -> SessionCmd {
    if session.is_reviewing() {
        return SessionCmd::None;
    }
    match session.mode {
        Mode::Assessment => {}
        Mode::PracticePlay if session.practice_result.is_none() => {}
        _ => return SessionCmd::None,
    }
    let Some(puzzle) = session.puzzle.as_mut() else {
        return SessionCmd::None;
    };
    let total_mystery = puzzle.total_mystery;
    let Some(layer) = puzzle.layers.get_mut(layer_index) else {
        return SessionCmd::None;
    };
    if !layer.is_open() {
        return SessionCmd::None;
    }

    layer.user_selected = Some(code);
    if code == layer.code {
        layer.is_solved = true;
        session.solved_mystery += 1;
        if session.solved_mystery == total_mystery {
            complete_round(session, builder, None)
        } else {
            SessionCmd::None
        }
    } else {
        let correct_code = layer.code;
        complete_round(session, builder, Some(correct_code))
    }
}

/// Conclude the live round. `missed` holds the correct code of the layer the
/// player got wrong; `None` means the round was solved.
fn complete_round(
    session: &mut Session,
    builder: &mut PuzzleBuilder,
    missed: Option<PermutationCode>,
) -> SessionCmd {
    let success = missed.is_none();
    let Some(notice) = record_history(session, success) else {
        return SessionCmd::None;
    };
    let mut cmds = vec![SessionCmd::Notify(notice)];

    match session.mode {
        Mode::Assessment => {
            let next = assessment_next_level(
                session.level_index,
                builder.catalog().max_index(),
                success,
            );
            if session.round >= session.settings.assessment_rounds {
                cmds.push(finish(session, FinishReason::RoundsExhausted));
            } else {
                advance_round(session, builder, next);
            }
        }
        Mode::PracticePlay => match missed {
            None => {
                session.practice_result = Some(PracticeResult::Success);
                let next = next_practice_level(session, builder, true);
                if let Some(token) = session.round_token() {
                    cmds.push(schedule_advance(session, token, next));
                }
            }
            Some(correct_code) => {
                session.practice_result = Some(PracticeResult::Failure { correct_code });
            }
        },
        _ => {}
    }

    SessionCmd::batch(cmds)
}

fn schedule_advance(session: &Session, token: RoundToken, next_level: usize) -> SessionCmd {
    SessionCmd::ScheduleAdvance {
        token,
        next_level,
        after: session.settings.advance_delay(),
    }
}

fn record_history(session: &mut Session, success: bool) -> Option<SessionNotice> {
    let puzzle = session.puzzle.as_ref()?;
    let points = puzzle.level.points;
    let earned = if success { points } else { 0 };
    let record = HistoryRecord {
        round: session.round,
        level: puzzle.level.id,
        points_possible: points,
        earned,
        correct: success,
        puzzle: puzzle.clone(),
    };
    let level = record.level;
    session.history.push(record);
    session.score = session.score.saturating_add(earned);

    Some(SessionNotice::RoundRecorded {
        mode: session.mode,
        round: session.round,
        level,
        earned,
        correct: success,
        score: session.score,
    })
}

fn next_practice_level(session: &mut Session, builder: &mut PuzzleBuilder, last_correct: bool) -> usize {
    let (pick, random_phase) = practice_next_level(
        session.practice.practice_type,
        session.level_index,
        builder.catalog().max_index(),
        last_correct,
        session.random_phase,
    );
    session.random_phase = random_phase;
    resolve_pick(pick, builder, session.settings.random_harder_weight)
}

fn advance_round(session: &mut Session, builder: &mut PuzzleBuilder, next_level: usize) {
    let next_level = builder.catalog().clamp_index(next_level);
    session.round = session.round.saturating_add(1);
    session.level_index = next_level;
    session.puzzle = Some(builder.generate_puzzle(next_level));
    session.solved_mystery = 0;
    session.practice_result = None;
    session.review = None;
}

// ──────────────────── tests ────────────────────
