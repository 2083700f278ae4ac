//! Property-based tests for the session reducer.
//!
//! Random event sequences must never break the run invariants.

use proptest::prelude::*;

use crate::puzzle::builder::PuzzleBuilder;
use crate::puzzle::level::LevelCatalog;
use crate::puzzle::permutation::PermutationCode;
use crate::session::model::{
    Mode, PracticeSettings, PracticeType, Session, SessionEvent, SessionSettings,
};
use crate::session::update::update;

// ──────────────────── strategies ────────────────────

fn arb_practice_type() -> impl Strategy<Value = PracticeType> {
    prop_oneof![
        Just(PracticeType::Progressive),
        Just(PracticeType::Level),
        Just(PracticeType::Random),
    ]
}

/// Events that do not depend on the live puzzle.
fn arb_blind_event() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        1 => Just(SessionEvent::StartAssessment),
        1 => Just(SessionEvent::OpenPracticeConfig),
        1 => (arb_practice_type(), 0usize..15).prop_map(|(practice_type, start_level)| {
            SessionEvent::StartPractice(PracticeSettings { practice_type, start_level })
        }),
        3 => Just(SessionEvent::RequestNext),
        3 => Just(SessionEvent::Tick),
        1 => (0usize..30).prop_map(SessionEvent::SelectReview),
        1 => Just(SessionEvent::ClearReview),
        1 => Just(SessionEvent::ReviewPrevious),
        1 => Just(SessionEvent::ReviewNext),
        1 => Just(SessionEvent::GoBack),
        1 => Just(SessionEvent::GoHome),
    ]
}

/// Either a blind event, or an answer resolved against the live puzzle:
/// `Some(true)` answers correctly, `Some(false)` picks a decoy.
fn arb_step() -> impl Strategy<Value = (SessionEvent, Option<bool>)> {
    prop_oneof![
        2 => arb_blind_event().prop_map(|e| (e, None)),
        3 => any::<bool>().prop_map(|correct| (SessionEvent::ClearReview, Some(correct))),
    ]
}

fn resolve_answer(session: &Session, correct: bool) -> Option<SessionEvent> {
    let puzzle = session.puzzle.as_ref()?;
    let layer_index = puzzle.focus_layer()?;
    let layer = &puzzle.layers[layer_index];
    let code: PermutationCode = if correct {
        layer.code
    } else {
        layer.options?.into_iter().find(|o| *o != layer.code)?
    };
    Some(SessionEvent::SubmitAnswer { code, layer_index })
}

fn settings() -> SessionSettings {
    SessionSettings {
        assessment_rounds: 6,
        time_limit_secs: 20,
        ..SessionSettings::default()
    }
}

// ──────────────────── properties ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn reducer_preserves_run_invariants(
        seed in any::<u64>(),
        steps in prop::collection::vec(arb_step(), 1..120),
    ) {
        let mut builder = PuzzleBuilder::new(LevelCatalog::builtin(), Some(seed));
        let mut session = Session::new(settings());
        let max_index = builder.catalog().max_index();

        for (event, answer) in steps {
            let event = match answer {
                Some(correct) => match resolve_answer(&session, correct) {
                    Some(e) => e,
                    None => continue,
                },
                None => event,
            };
            let history_before = session.history.len();
            let _ = update(&mut session, &mut builder, event);

            prop_assert!(session.level_index <= max_index);
            prop_assert!(session.time_left <= settings().time_limit_secs);
            prop_assert!(session.history.len() >= history_before || session.history.is_empty());
            prop_assert_eq!(
                session.score,
                session.history.iter().map(|r| r.earned).sum::<u32>()
            );
            if let Some(p) = session.puzzle.as_ref() {
                prop_assert!(session.solved_mystery <= p.total_mystery);
                prop_assert_eq!(session.solved_mystery, p.solved_mystery_count());
                prop_assert_eq!(
                    session.round_complete(),
                    session.solved_mystery == p.total_mystery
                );
            }
            if let Some(i) = session.review {
                prop_assert!(i < session.history.len());
            }
            if session.mode == Mode::Assessment {
                prop_assert!(session.history.len() < settings().assessment_rounds as usize);
            }
            if session.mode == Mode::Finished {
                prop_assert!(
                    session.time_left == 0
                        || session.history.len() == settings().assessment_rounds as usize
                );
            }
            for record in &session.history {
                prop_assert_eq!(record.earned, if record.correct { record.points_possible } else { 0 });
            }
        }
    }
}
