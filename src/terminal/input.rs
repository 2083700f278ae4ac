//! Key routing: maps terminal keys to session events per mode.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::model::{Mode, PracticeSettings, Session, SessionEvent};
use crate::session::summary::SessionSummary;

/// What a key press asks the runtime to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Dispatch(SessionEvent),
    /// Practice setup edits; they stay local until the run starts.
    CycleType,
    LevelUp,
    LevelDown,
    Quit,
}

/// Resolve a key against the current session. `None` means the key is unbound
/// in this mode.
#[must_use]
pub fn resolve_key(key: KeyEvent, session: &Session, draft: PracticeSettings) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }

    match key.code {
        KeyCode::Char('q') => return Some(KeyAction::Quit),
        KeyCode::Esc | KeyCode::Char('b') => {
            return Some(KeyAction::Dispatch(SessionEvent::GoBack));
        }
        _ => {}
    }

    match session.mode {
        Mode::Home => match key.code {
            KeyCode::Char('a') => Some(KeyAction::Dispatch(SessionEvent::StartAssessment)),
            KeyCode::Char('p') => Some(KeyAction::Dispatch(SessionEvent::OpenPracticeConfig)),
            _ => None,
        },
        Mode::PracticeConfig => match key.code {
            KeyCode::Char('t') | KeyCode::Tab => Some(KeyAction::CycleType),
            KeyCode::Char('+' | '=') | KeyCode::Right | KeyCode::Up => Some(KeyAction::LevelUp),
            KeyCode::Char('-') | KeyCode::Left | KeyCode::Down => Some(KeyAction::LevelDown),
            KeyCode::Enter => Some(KeyAction::Dispatch(SessionEvent::StartPractice(draft))),
            _ => None,
        },
        Mode::Assessment | Mode::PracticePlay => play_key(key.code, session),
        Mode::Finished => finished_key(key.code, session),
    }
}

fn digit(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char(c) => c.to_digit(10).and_then(|d| usize::try_from(d).ok()),
        _ => None,
    }
}

fn play_key(code: KeyCode, session: &Session) -> Option<KeyAction> {
    let practice = session.mode == Mode::PracticePlay;
    match code {
        KeyCode::Char('n') | KeyCode::Enter if practice => {
            Some(KeyAction::Dispatch(SessionEvent::RequestNext))
        }
        KeyCode::Char('[') | KeyCode::Left if practice => {
            Some(KeyAction::Dispatch(SessionEvent::ReviewPrevious))
        }
        KeyCode::Char(']') | KeyCode::Right if practice => {
            Some(KeyAction::Dispatch(SessionEvent::ReviewNext))
        }
        _ => {
            let n = digit(code).filter(|n| (1..=4).contains(n))?;
            let puzzle = session.puzzle.as_ref()?;
            let layer_index = puzzle.focus_layer()?;
            let options = puzzle.layers[layer_index].options?;
            Some(KeyAction::Dispatch(SessionEvent::SubmitAnswer {
                code: options[n - 1],
                layer_index,
            }))
        }
    }
}

fn finished_key(code: KeyCode, session: &Session) -> Option<KeyAction> {
    match code {
        KeyCode::Char('a') => Some(KeyAction::Dispatch(SessionEvent::StartAssessment)),
        KeyCode::Char('[') | KeyCode::Left => {
            Some(KeyAction::Dispatch(SessionEvent::ReviewPrevious))
        }
        KeyCode::Char(']') | KeyCode::Right => Some(KeyAction::Dispatch(SessionEvent::ReviewNext)),
        _ => {
            let n = digit(code).filter(|n| *n >= 1)?;
            let mistakes = SessionSummary::from_history(&session.history).mistakes;
            let index = *mistakes.get(n - 1)?;
            Some(KeyAction::Dispatch(SessionEvent::SelectReview(index)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::builder::PuzzleBuilder;
    use crate::puzzle::level::LevelCatalog;
    use crate::session::update::update;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn resolve(code: KeyCode, session: &Session) -> Option<KeyAction> {
        resolve_key(press(code), session, PracticeSettings::default())
    }

    #[test]
    fn home_keys() {
        let s = Session::default();
        assert_eq!(
            resolve(KeyCode::Char('a'), &s),
            Some(KeyAction::Dispatch(SessionEvent::StartAssessment))
        );
        assert_eq!(
            resolve(KeyCode::Char('p'), &s),
            Some(KeyAction::Dispatch(SessionEvent::OpenPracticeConfig))
        );
        assert_eq!(resolve(KeyCode::Char('q'), &s), Some(KeyAction::Quit));
        assert_eq!(resolve(KeyCode::Char('z'), &s), None);
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let s = Session::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(
            resolve_key(key, &s, PracticeSettings::default()),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn practice_setup_keys() {
        let mut s = Session::default();
        s.mode = Mode::PracticeConfig;
        assert_eq!(resolve(KeyCode::Char('t'), &s), Some(KeyAction::CycleType));
        assert_eq!(resolve(KeyCode::Char('+'), &s), Some(KeyAction::LevelUp));
        assert_eq!(resolve(KeyCode::Char('-'), &s), Some(KeyAction::LevelDown));
        assert!(matches!(
            resolve(KeyCode::Enter, &s),
            Some(KeyAction::Dispatch(SessionEvent::StartPractice(_)))
        ));
    }

    #[test]
    fn digits_answer_the_focused_layer() {
        let mut b = PuzzleBuilder::new(LevelCatalog::builtin(), Some(9));
        let mut s = Session::default();
        update(&mut s, &mut b, SessionEvent::StartAssessment);
        let options = s.puzzle.as_ref().unwrap().layers[0].options.unwrap();
        assert_eq!(
            resolve(KeyCode::Char('3'), &s),
            Some(KeyAction::Dispatch(SessionEvent::SubmitAnswer {
                code: options[2],
                layer_index: 0
            }))
        );
        assert_eq!(resolve(KeyCode::Char('5'), &s), None);
        // No practice-only keys during an assessment.
        assert_eq!(resolve(KeyCode::Char('n'), &s), None);
    }

    #[test]
    fn finished_digits_select_mistakes() {
        let mut b = PuzzleBuilder::new(LevelCatalog::builtin(), Some(10));
        let mut s = Session::default();
        s.settings.assessment_rounds = 2;
        update(&mut s, &mut b, SessionEvent::StartAssessment);
        for _ in 0..2 {
            let layer = s.puzzle.as_ref().unwrap().layers[0].clone();
            let wrong = layer
                .options
                .unwrap()
                .into_iter()
                .find(|c| *c != layer.code)
                .unwrap();
            update(
                &mut s,
                &mut b,
                SessionEvent::SubmitAnswer {
                    code: wrong,
                    layer_index: 0,
                },
            );
        }
        assert_eq!(s.mode, Mode::Finished);
        assert_eq!(
            resolve(KeyCode::Char('2'), &s),
            Some(KeyAction::Dispatch(SessionEvent::SelectReview(1)))
        );
        assert_eq!(resolve(KeyCode::Char('3'), &s), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let s = Session::default();
        let mut key = press(KeyCode::Char('a'));
        key.kind = KeyEventKind::Release;
        assert_eq!(resolve_key(key, &s, PracticeSettings::default()), None);
    }
}
