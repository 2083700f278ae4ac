//! Interactive game loop.
//!
//! An input thread forwards crossterm events over a crossbeam channel. The
//! main loop paints the current frame, then waits on that channel until the
//! next scheduler deadline (`recv_timeout`) and pumps whatever became due.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use crate::core::errors::{Result, SwcError};
use crate::puzzle::builder::PuzzleBuilder;
use crate::puzzle::symbol::Symbol;
use crate::render::{Frame, Tone, View, render};
use crate::session::driver::{GameDriver, NoticeSink};
use crate::session::model::{PracticeSettings, Session, SessionEvent};

use super::guard::TerminalGuard;
use super::input::{KeyAction, resolve_key};

/// Longest wait between repaints when nothing is scheduled.
const IDLE_WAIT: Duration = Duration::from_millis(250);

pub struct PlayOptions {
    pub color: bool,
    /// Initial selection on the practice setup screen.
    pub practice_draft: PracticeSettings,
    /// Jump straight into a practice run with `practice_draft`.
    pub start_practice: bool,
}

/// Run the interactive game until the player quits. Returns the final
/// session and the sink.
pub fn run_play<S: NoticeSink>(
    session: Session,
    builder: PuzzleBuilder,
    sink: S,
    options: &PlayOptions,
) -> Result<(Session, S)> {
    let guard = TerminalGuard::new().map_err(|source| SwcError::Terminal { source })?;
    let mut driver = GameDriver::new(session, builder, sink);
    let outcome = run_inner(&mut driver, options);
    drop(guard);
    outcome?;
    Ok(driver.into_parts())
}

fn spawn_input_thread() -> Result<Receiver<Event>> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("swc-input".to_string())
        .spawn(move || {
            while let Ok(ev) = event::read() {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        })
        .map_err(|e| SwcError::Runtime {
            details: format!("failed to spawn input thread: {e}"),
        })?;
    Ok(rx)
}

fn run_inner<S: NoticeSink>(driver: &mut GameDriver<S>, options: &PlayOptions) -> Result<()> {
    let terminal_err = |source| SwcError::Terminal { source };
    let mut stdout = io::stdout();
    let mut draft = options.practice_draft;
    let max_index = driver.builder().catalog().max_index();
    draft.start_level = draft.start_level.min(max_index);

    if options.start_practice {
        driver.dispatch(SessionEvent::StartPractice(draft), Instant::now());
    }

    let keys = spawn_input_thread()?;

    loop {
        let frame = render(&View {
            session: driver.session(),
            catalog: driver.builder().catalog(),
            practice_draft: draft,
        });
        paint(&mut stdout, &frame, options.color).map_err(terminal_err)?;

        let now = Instant::now();
        let wait = driver
            .next_deadline()
            .map_or(IDLE_WAIT, |at| at.saturating_duration_since(now).min(IDLE_WAIT));

        match keys.recv_timeout(wait) {
            Ok(Event::Key(key)) => match resolve_key(key, driver.session(), draft) {
                Some(KeyAction::Quit) => return Ok(()),
                Some(KeyAction::Dispatch(event)) => driver.dispatch(event, Instant::now()),
                Some(KeyAction::CycleType) => {
                    draft.practice_type = draft.practice_type.cycle();
                }
                Some(KeyAction::LevelUp) => {
                    draft.start_level = (draft.start_level + 1).min(max_index);
                }
                Some(KeyAction::LevelDown) => {
                    draft.start_level = draft.start_level.saturating_sub(1);
                }
                None => {}
            },
            Ok(_) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        driver.pump(Instant::now());
    }
}

const fn tone_color(tone: Tone) -> Option<Color> {
    match tone {
        Tone::Plain => None,
        Tone::Muted => Some(Color::DarkGrey),
        Tone::Accent => Some(Color::Cyan),
        Tone::Success => Some(Color::Green),
        Tone::Danger => Some(Color::Red),
        Tone::Warning => Some(Color::Yellow),
        Tone::Shape(symbol) => Some(symbol_color(symbol)),
    }
}

const fn symbol_color(symbol: Symbol) -> Color {
    match symbol {
        Symbol::Circle => Color::Blue,
        Symbol::Square => Color::Red,
        Symbol::Triangle => Color::Green,
        Symbol::Diamond => Color::Yellow,
        Symbol::Star => Color::Magenta,
        Symbol::Hexagon => Color::DarkYellow,
    }
}

fn paint(stdout: &mut io::Stdout, frame: &Frame, color: bool) -> io::Result<()> {
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in frame.lines.iter().enumerate() {
        let row = u16::try_from(row + 1).unwrap_or(u16::MAX);
        queue!(stdout, MoveTo(2, row))?;
        for span in &line.spans {
            match tone_color(span.tone).filter(|_| color) {
                Some(c) => queue!(
                    stdout,
                    SetForegroundColor(c),
                    Print(&span.text),
                    SetAttribute(Attribute::Reset)
                )?,
                None => queue!(stdout, Print(&span.text))?,
            }
        }
    }
    stdout.flush()
}
