//! Session state model for the Switch Challenge state machine.
//!
//! All run state lives in [`Session`]. External inputs arrive as
//! [`SessionEvent`] values; side-effects (timer control, deferred advances,
//! activity notices) are described by [`SessionCmd`] values returned from
//! [`update`](super::update::update).
//!
//! **Design invariant:** the model is deterministic given its random source,
//! and no I/O happens here.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::puzzle::builder::Puzzle;
use crate::puzzle::permutation::PermutationCode;

// ──────────────────── modes ────────────────────

/// Top-level application mode.
///
/// Reviewing is not a separate mode: it is `Finished` or `PracticePlay`
/// with [`Session::review`] set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Home,
    PracticeConfig,
    Assessment,
    PracticePlay,
    Finished,
}

impl Mode {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::PracticeConfig => "practice_config",
            Self::Assessment => "assessment",
            Self::PracticePlay => "practice",
            Self::Finished => "finished",
        }
    }

    /// Modes in which answers are accepted.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Assessment | Self::PracticePlay)
    }
}

// ──────────────────── practice settings ────────────────────

/// Level-selection policy between practice rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeType {
    /// Climb one level per success, stay on failure.
    #[default]
    Progressive,
    /// Repeat the chosen level forever.
    Level,
    /// Climb to the top, then draw levels at random, biased toward hard ones.
    Random,
}

impl PracticeType {
    /// Cycle order used by the practice setup screen.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Progressive => Self::Random,
            Self::Random => Self::Level,
            Self::Level => Self::Progressive,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Progressive => "progressive",
            Self::Level => "level",
            Self::Random => "random",
        }
    }

    /// One-line description for setup screens.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Progressive => "Difficulty increases as you get answers right.",
            Self::Level => "Practice the same difficulty level repeatedly.",
            Self::Random => "Go up to the max level, then shuffle (biased towards higher levels).",
        }
    }
}

impl fmt::Display for PracticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PracticeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "progressive" => Ok(Self::Progressive),
            "level" | "single" => Ok(Self::Level),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown practice type {other:?} (expected progressive, level or random)"
            )),
        }
    }
}

/// Choices made on the practice setup screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSettings {
    pub practice_type: PracticeType,
    pub start_level: usize,
}

/// Tunables that shape a run. Derived from [`Config`](crate::core::config::Config).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Rounds in one assessment.
    pub assessment_rounds: u32,
    /// Assessment time budget in seconds.
    pub time_limit_secs: u32,
    /// Pause between a practice success and the next round.
    pub advance_delay_ms: u64,
    /// Probability of drawing from the harder levels in the random phase.
    pub random_harder_weight: f64,
}

impl SessionSettings {
    #[must_use]
    pub const fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            assessment_rounds: 24,
            time_limit_secs: 300,
            advance_delay_ms: 500,
            random_harder_weight: 0.8,
        }
    }
}

// ──────────────────── per-round records ────────────────────

/// Outcome shown after a practice answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PracticeResult {
    Success,
    Failure { correct_code: PermutationCode },
}

/// Immutable snapshot of a concluded round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub round: u32,
    /// Level id (not index).
    pub level: u32,
    pub points_possible: u32,
    pub earned: u32,
    pub correct: bool,
    /// Puzzle with layer states as they were when the round ended.
    pub puzzle: Puzzle,
}

/// Identity of a live round. Deferred work scheduled for one round must not
/// apply to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundToken {
    pub epoch: u64,
    pub round: u32,
    pub puzzle_id: u64,
}

// ──────────────────── session ────────────────────

/// Complete state of one run plus navigation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub settings: SessionSettings,
    pub mode: Mode,
    pub practice: PracticeSettings,
    /// 1-based round counter.
    pub round: u32,
    pub level_index: usize,
    pub score: u32,
    pub history: Vec<HistoryRecord>,
    /// Seconds left in an assessment.
    pub time_left: u32,
    /// Random practice has reached the top level and now draws at random.
    pub random_phase: bool,
    pub puzzle: Option<Puzzle>,
    pub solved_mystery: usize,
    /// History index under review, `None` for the live view or summary.
    pub review: Option<usize>,
    pub practice_result: Option<PracticeResult>,
    /// Bumped on every run start and abandon.
    pub epoch: u64,
}

impl Session {
    #[must_use]
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            mode: Mode::Home,
            practice: PracticeSettings::default(),
            round: 1,
            level_index: 0,
            score: 0,
            history: Vec::new(),
            time_left: settings.time_limit_secs,
            random_phase: false,
            puzzle: None,
            solved_mystery: 0,
            review: None,
            practice_result: None,
            epoch: 0,
        }
    }

    #[must_use]
    pub fn is_reviewing(&self) -> bool {
        self.review.is_some()
    }

    /// Token identifying the live round, if any.
    #[must_use]
    pub fn round_token(&self) -> Option<RoundToken> {
        self.puzzle.as_ref().map(|p| RoundToken {
            epoch: self.epoch,
            round: self.round,
            puzzle_id: p.id,
        })
    }

    /// Whether every mystery layer of the live puzzle is solved.
    #[must_use]
    pub fn round_complete(&self) -> bool {
        self.puzzle
            .as_ref()
            .is_some_and(|p| self.solved_mystery == p.total_mystery)
    }

    /// History record under review.
    #[must_use]
    pub fn reviewed_record(&self) -> Option<&HistoryRecord> {
        self.review.and_then(|i| self.history.get(i))
    }

    /// The puzzle a renderer should show: a stored snapshot while reviewing,
    /// otherwise the live puzzle.
    #[must_use]
    pub fn displayed_puzzle(&self) -> Option<&Puzzle> {
        match self.reviewed_record() {
            Some(record) => Some(&record.puzzle),
            None => self.puzzle.as_ref(),
        }
    }

    /// Whether the one-second assessment timer should run.
    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.mode == Mode::Assessment
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

// ──────────────────── events ────────────────────

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StartAssessment,
    OpenPracticeConfig,
    StartPractice(PracticeSettings),
    SubmitAnswer {
        code: PermutationCode,
        layer_index: usize,
    },
    /// Explicit "next question" in practice.
    RequestNext,
    /// Fired by the scheduler after a practice success.
    DeferredAdvance {
        token: RoundToken,
        next_level: usize,
    },
    /// One elapsed second.
    Tick,
    SelectReview(usize),
    ClearReview,
    ReviewPrevious,
    ReviewNext,
    GoBack,
    GoHome,
}

// ──────────────────── notices ────────────────────

/// Why a run reached `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    RoundsExhausted,
    TimeExpired,
}

/// Activity facts emitted by the reducer for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum SessionNotice {
    RunStarted {
        mode: Mode,
        level: u32,
    },
    RoundRecorded {
        mode: Mode,
        round: u32,
        level: u32,
        earned: u32,
        correct: bool,
        score: u32,
    },
    RunFinished {
        reason: FinishReason,
        score: u32,
        rounds_played: usize,
        time_left: u32,
    },
    RunAbandoned {
        mode: Mode,
        round: u32,
        score: u32,
    },
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCmd {
    /// No side-effect.
    None,
    /// Begin delivering one `Tick` per second.
    StartTimer,
    /// Stop delivering ticks.
    StopTimer,
    /// Deliver `DeferredAdvance { token, next_level }` after `after`.
    ScheduleAdvance {
        token: RoundToken,
        next_level: usize,
        after: Duration,
    },
    /// Record an activity notice.
    Notify(SessionNotice),
    /// Execute multiple commands in order.
    Batch(Vec<Self>),
}

impl SessionCmd {
    /// Collapse a command list, avoiding one-element batches.
    #[must_use]
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        cmds.retain(|c| *c != Self::None);
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    /// Flatten nested batches into a linear list.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }

    /// Notices carried by this command tree.
    #[must_use]
    pub fn notices(&self) -> Vec<&SessionNotice> {
        match self {
            Self::Notify(n) => vec![n],
            Self::Batch(cmds) => cmds.iter().flat_map(Self::notices).collect(),
            _ => Vec::new(),
        }
    }
}

// ──────────────────── tests ────────────────────
