//! Screen builders: one frame per mode, derived from session state only.

#![allow(missing_docs)]

use crate::puzzle::builder::{Layer, Puzzle};
use crate::puzzle::level::{LayerKind, LevelCatalog};
use crate::session::model::{HistoryRecord, Mode, PracticeResult, PracticeSettings, Session};
use crate::session::summary::{SessionSummary, format_time};

use super::frame::{Frame, Line, Span, Tone};

/// Mistakes addressable with the digit keys on the summary screen.
pub const MAX_LISTED_MISTAKES: usize = 9;

/// Everything a frame is derived from.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub session: &'a Session,
    pub catalog: &'a LevelCatalog,
    /// Selection on the practice setup screen (not yet applied).
    pub practice_draft: PracticeSettings,
}

/// Build the frame for the session's current mode.
#[must_use]
pub fn render(view: &View<'_>) -> Frame {
    let session = view.session;
    match session.mode {
        Mode::Home => home(),
        Mode::PracticeConfig => practice_config(view.catalog, view.practice_draft),
        Mode::Assessment | Mode::PracticePlay => match session.reviewed_record() {
            Some(record) => review(session, record),
            None => play(session),
        },
        Mode::Finished => match session.reviewed_record() {
            Some(record) => review(session, record),
            None => summary(session),
        },
    }
}

fn title(frame: &mut Frame, text: &str) {
    frame.push(Line::toned(text, Tone::Accent));
    frame.blank();
}

fn hints(frame: &mut Frame, text: &str) {
    frame.blank();
    frame.push(Line::toned(text, Tone::Muted));
}

// ──────────────────── home / setup ────────────────────

fn home() -> Frame {
    let mut f = Frame::default();
    title(&mut f, "SWITCH CHALLENGE");
    f.push(Line::plain(
        "Symbols pass through a chain of switches. Each switch reorders them by",
    ));
    f.push(Line::plain(
        "a 4-digit code: output position k takes input position code[k].",
    ));
    f.push(Line::plain("Work out the hidden codes from the input and output."));
    f.blank();
    f.push(Line::plain("  a  Assessment").push(Span::new("  timed, fixed number of rounds", Tone::Muted)));
    f.push(Line::plain("  p  Practice").push(Span::new("    untimed, pick a progression", Tone::Muted)));
    hints(&mut f, "q quit");
    f
}

fn practice_config(catalog: &LevelCatalog, draft: PracticeSettings) -> Frame {
    let mut f = Frame::default();
    title(&mut f, "PRACTICE SETUP");
    let level = catalog.get(draft.start_level);
    f.push(Line::plain("Type:        ").push(Span::new(draft.practice_type.label(), Tone::Accent)));
    f.push(Line::toned(
        format!("             {}", draft.practice_type.description()),
        Tone::Muted,
    ));
    f.push(
        Line::plain("Start level: ")
            .push(Span::new(level.to_string(), Tone::Accent))
            .push(Span::new(
                format!("  [{}] {} pts", level.structure_tag(), level.points),
                Tone::Muted,
            )),
    );
    hints(&mut f, "t type  +/- level  enter start  esc back");
    f
}

// ──────────────────── play ────────────────────

fn header(session: &Session, puzzle: &Puzzle) -> Line {
    let mode = match session.mode {
        Mode::Assessment => "ASSESSMENT".to_string(),
        _ => format!("PRACTICE ({})", session.practice.practice_type),
    };
    let round = if session.mode == Mode::Assessment {
        format!("Round {}/{}", session.round, session.settings.assessment_rounds)
    } else {
        format!("Round {}", session.round)
    };
    let mut line = Line::toned(mode, Tone::Accent)
        .push(Span::plain(format!("  {round}  {}  ", puzzle.level)));
    if session.timer_active() {
        let tone = if session.time_left <= 30 {
            Tone::Danger
        } else {
            Tone::Plain
        };
        line = line.push(Span::new(format!("Time {}  ", format_time(session.time_left)), tone));
    }
    line.push(Span::plain(format!("Score {}", session.score)))
}

fn layer_code(layer: &Layer, reveal: bool) -> Span {
    if layer.is_revealed() || reveal {
        let tone = match layer.kind {
            LayerKind::Fixed => Tone::Plain,
            LayerKind::Mystery if layer.is_solved => Tone::Success,
            LayerKind::Mystery => Tone::Warning,
        };
        Span::new(layer.code.to_string(), tone)
    } else {
        Span::new("????", Tone::Warning)
    }
}

/// Input, switch chain and output. `reveal` shows every true code.
fn chain(frame: &mut Frame, puzzle: &Puzzle, reveal: bool) {
    frame.push(Line::plain("  input   ").symbols(&puzzle.input));
    for (i, layer) in puzzle.layers.iter().enumerate() {
        let mut line = Line::toned(format!("  {}. [{}] ", i + 1, layer.kind.tag()), Tone::Muted)
            .push(layer_code(layer, reveal));
        if let Some(picked) = layer.user_selected {
            if picked == layer.code {
                line = line.push(Span::new("  ✓", Tone::Success));
            } else {
                line = line.push(Span::new(format!("  ✗ {picked}"), Tone::Danger));
            }
        }
        frame.push(line);
    }
    frame.push(Line::plain("  output  ").symbols(&puzzle.output));
}

fn play(session: &Session) -> Frame {
    let mut f = Frame::default();
    let Some(puzzle) = session.puzzle.as_ref() else {
        title(&mut f, "No puzzle");
        return f;
    };

    f.push(header(session, puzzle));
    f.blank();
    chain(&mut f, puzzle, false);
    f.blank();

    match session.practice_result {
        Some(PracticeResult::Success) => {
            f.push(Line::toned("Correct!", Tone::Success));
        }
        Some(PracticeResult::Failure { correct_code }) => {
            f.push(
                Line::toned("Incorrect. ", Tone::Danger)
                    .push(Span::plain("The answer was "))
                    .push(Span::new(correct_code.to_string(), Tone::Accent)),
            );
        }
        None => {
            if let Some(idx) = puzzle.focus_layer() {
                f.push(Line::plain(format!(
                    "Switch {} ({} of {} solved). Pick its code:",
                    idx + 1,
                    session.solved_mystery,
                    puzzle.total_mystery
                )));
                if let Some(options) = puzzle.layers[idx].options {
                    let mut line = Line::blank();
                    for (n, code) in options.iter().enumerate() {
                        line = line
                            .push(Span::new(format!("  {}) ", n + 1), Tone::Muted))
                            .push(Span::plain(code.to_string()));
                    }
                    f.push(line);
                }
            }
        }
    }

    let keys = match (session.mode, session.practice_result) {
        (Mode::PracticePlay, Some(_)) => "n next  [ ] review  esc home  q quit",
        (Mode::PracticePlay, None) => "1-4 choose  [ ] review  esc home  q quit",
        _ => "1-4 choose  esc home  q quit",
    };
    hints(&mut f, keys);
    f
}

// ──────────────────── review / summary ────────────────────

fn review(session: &Session, record: &HistoryRecord) -> Frame {
    let mut f = Frame::default();
    let position = session.review.map_or(0, |i| i + 1);
    f.push(
        Line::toned(format!("REVIEW {position}/{}", session.history.len()), Tone::Accent).push(
            Span::plain(format!(
                "  Round {}  Level {}  ",
                record.round, record.puzzle.level.label
            )),
        ),
    );
    f.push(if record.correct {
        Line::toned(format!("Correct, +{} points", record.earned), Tone::Success)
    } else {
        Line::toned(
            format!("Missed, 0 of {} points", record.points_possible),
            Tone::Danger,
        )
    });
    f.blank();
    chain(&mut f, &record.puzzle, true);

    let keys = if session.mode == Mode::Finished {
        "[ ] step  esc summary"
    } else {
        "[ ] step  ] past the end returns to play"
    };
    hints(&mut f, keys);
    f
}

fn summary(session: &Session) -> Frame {
    let mut f = Frame::default();
    let s = SessionSummary::from_history(&session.history);
    title(&mut f, "RESULTS");
    f.push(Line::plain("Score      ").push(Span::new(s.score.to_string(), Tone::Accent)));
    f.push(Line::plain(format!("Rounds     {}", s.rounds_played)));
    f.push(Line::plain(format!(
        "Correct    {} ({}%)",
        s.correct, s.accuracy_pct
    )));
    f.push(Line::plain(format!("Peak level {}", s.peak_level)));
    f.push(Line::plain(format!(
        "Time left  {}",
        format_time(session.time_left)
    )));

    if s.mistakes.is_empty() {
        f.blank();
        f.push(Line::toned("No mistakes.", Tone::Success));
    } else {
        f.blank();
        f.push(Line::plain("Mistakes:"));
        for (n, &idx) in s.mistakes.iter().take(MAX_LISTED_MISTAKES).enumerate() {
            let record = &session.history[idx];
            f.push(Line::toned(
                format!(
                    "  {}) round {} level {} [{}]",
                    n + 1,
                    record.round,
                    record.level,
                    record.puzzle.level.structure_tag()
                ),
                Tone::Danger,
            ));
        }
    }

    hints(&mut f, "1-9 review mistake  a again  esc home  q quit");
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::builder::PuzzleBuilder;
    use crate::session::model::{PracticeType, SessionEvent, SessionSettings};
    use crate::session::update::update;

    fn view(session: &Session, catalog: &LevelCatalog) -> String {
        render(&View {
            session,
            catalog,
            practice_draft: PracticeSettings {
                practice_type: PracticeType::Random,
                start_level: 3,
            },
        })
        .plain_text()
    }

    #[test]
    fn home_lists_both_modes() {
        let catalog = LevelCatalog::builtin();
        let text = view(&Session::default(), &catalog);
        assert!(text.contains("Assessment"));
        assert!(text.contains("Practice"));
    }

    #[test]
    fn practice_setup_shows_draft() {
        let catalog = LevelCatalog::builtin();
        let mut s = Session::default();
        s.mode = Mode::PracticeConfig;
        let text = view(&s, &catalog);
        assert!(text.contains("random"));
        assert!(text.contains("Level 4"));
    }

    #[test]
    fn play_hides_unsolved_mystery_codes() {
        let catalog = LevelCatalog::builtin();
        let mut b = PuzzleBuilder::new(catalog.clone(), Some(3));
        let mut s = Session::new(SessionSettings::default());
        update(&mut s, &mut b, SessionEvent::StartAssessment);
        let text = view(&s, &catalog);
        let truth = s.puzzle.as_ref().unwrap().layers[0].code.to_string();
        assert!(text.contains("????"));
        assert!(text.contains("Round 1/24"));
        assert!(text.contains("Time 5:00"));
        // The true code shows up once, as one of the four options.
        assert_eq!(text.matches(&truth).count(), 1);
    }

    #[test]
    fn review_reveals_codes_and_choice() {
        let catalog = LevelCatalog::builtin();
        let mut b = PuzzleBuilder::new(catalog.clone(), Some(4));
        let mut s = Session::new(SessionSettings {
            assessment_rounds: 1,
            ..SessionSettings::default()
        });
        update(&mut s, &mut b, SessionEvent::StartAssessment);
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
        assert_eq!(s.mode, Mode::Finished);

        let summary = view(&s, &catalog);
        assert!(summary.contains("RESULTS"));
        assert!(summary.contains("1) round 1 level 1"));

        update(&mut s, &mut b, SessionEvent::SelectReview(0));
        let text = view(&s, &catalog);
        assert!(text.contains("REVIEW 1/1"));
        assert!(text.contains(&layer.code.to_string()));
        assert!(text.contains(&format!("✗ {wrong}")));
    }
}
