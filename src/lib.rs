#![forbid(unsafe_code)]

//! Switch Challenge: a permutation reasoning game.
//!
//! A row of four symbols passes through a chain of switches. Each switch
//! applies a 4-digit permutation code; some codes are shown, the mystery ones
//! must be picked from four options. Two ways to play:
//! 1. **Assessment**: a timed run with adaptive difficulty and scoring
//! 2. **Practice**: progressive, single-level or random drills, untimed
//!
//! # Library usage
//!
//! The game core is a pure reducer. Drive it directly or through
//! [`session::driver::GameDriver`], which adds timers and an activity sink:
//!
//! ```rust,no_run
//! use switch_challenge::prelude::*;
//!
//! let mut builder = PuzzleBuilder::new(LevelCatalog::builtin(), Some(7));
//! let mut session = Session::default();
//! let cmd = update(&mut session, &mut builder, SessionEvent::StartAssessment);
//! assert_eq!(session.mode, Mode::Assessment);
//! # let _ = cmd;
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod puzzle;
pub mod render;
pub mod session;
#[cfg(feature = "cli")]
pub mod terminal;
