//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use switch_challenge::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{Result, SwcError};

// Puzzle
pub use crate::puzzle::builder::{Layer, Puzzle, PuzzleBuilder};
pub use crate::puzzle::level::{LayerKind, LevelCatalog, LevelConfig};
pub use crate::puzzle::permutation::PermutationCode;
pub use crate::puzzle::symbol::{Symbol, SymbolSet};

// Session
pub use crate::session::driver::{GameDriver, NoticeSink, NullSink};
pub use crate::session::model::{
    FinishReason, HistoryRecord, Mode, PracticeResult, PracticeSettings, PracticeType, Session,
    SessionCmd, SessionEvent, SessionNotice, SessionSettings,
};
pub use crate::session::simulate::{SimulationPlan, SimulationReport, simulate};
pub use crate::session::summary::SessionSummary;
pub use crate::session::update::update;

// Logging
pub use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
