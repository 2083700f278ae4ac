//! Activity logger: a dedicated thread owns the [`JsonlWriter`]; the game loop
//! sends [`ActivityEvent`]s over a bounded crossbeam channel.
//!
//! `try_send()` keeps the render loop from ever blocking on log back-pressure.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::errors::{Result, SwcError};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::session::driver::NoticeSink;
use crate::session::model::SessionNotice;

const CHANNEL_CAPACITY: usize = 256;

/// Events accepted by the logger thread.
#[derive(Debug, Clone)]
pub enum ActivityEvent {
    Session(SessionNotice),
    ConfigLoaded {
        source: String,
        config_hash: String,
    },
    Error {
        code: String,
        message: String,
    },
    /// Ask the logger thread to flush and exit.
    Shutdown,
}

/// Cheaply cloneable sender side of the logger.
#[derive(Clone)]
pub struct ActivityLoggerHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ActivityLoggerHandle {
    /// Non-blocking send. A full channel drops the event and bumps the
    /// dropped counter.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Request shutdown. Blocks only if the channel is full.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
    }
}

impl NoticeSink for ActivityLoggerHandle {
    fn record(&mut self, notice: &SessionNotice) {
        self.send(ActivityEvent::Session(notice.clone()));
    }
}

pub struct ActivityLoggerConfig {
    pub jsonl_config: JsonlConfig,
    pub channel_capacity: usize,
}

impl Default for ActivityLoggerConfig {
    fn default() -> Self {
        Self {
            jsonl_config: JsonlConfig::default(),
            channel_capacity: CHANNEL_CAPACITY,
        }
    }
}

/// Spawn the logger thread. It exits on `shutdown()` or when every handle
/// has been dropped.
pub fn spawn_logger(
    config: ActivityLoggerConfig,
) -> Result<(ActivityLoggerHandle, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded::<ActivityEvent>(config.channel_capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    let handle = ActivityLoggerHandle {
        tx,
        dropped_events: Arc::clone(&dropped),
    };

    let join = thread::Builder::new()
        .name("swc-logger".to_string())
        .spawn(move || logger_thread_main(&rx, config.jsonl_config, &dropped))
        .map_err(|e| SwcError::Runtime {
            details: format!("failed to spawn logger thread: {e}"),
        })?;

    Ok((handle, join))
}

fn logger_thread_main(rx: &Receiver<ActivityEvent>, jsonl_config: JsonlConfig, dropped: &AtomicU64) {
    let mut jsonl = JsonlWriter::open(jsonl_config);

    while let Ok(event) = rx.recv() {
        let d = dropped.swap(0, Ordering::Relaxed);
        if d > 0 {
            let mut warn = LogEntry::new(EventType::Error, Severity::Warning);
            warn.details = Some(format!("{d} log events dropped due to back-pressure"));
            jsonl.write_entry(&warn);
        }

        if matches!(event, ActivityEvent::Shutdown) {
            break;
        }
        jsonl.write_entry(&event_to_log_entry(&event));
    }

    jsonl.flush();
}

// ──────────────────── event conversion ────────────────────

/// Map an activity event to its log line.
#[must_use]
pub fn event_to_log_entry(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::Session(notice) => notice_to_log_entry(notice),
        ActivityEvent::ConfigLoaded {
            source,
            config_hash,
        } => {
            let mut e = LogEntry::new(EventType::ConfigLoaded, Severity::Info);
            e.config_hash = Some(config_hash.clone());
            e.details = Some(format!("source={source}"));
            e
        }
        ActivityEvent::Error { code, message } => {
            let mut e = LogEntry::new(EventType::Error, Severity::Error);
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e
        }
        ActivityEvent::Shutdown => {
            let mut e = LogEntry::new(EventType::Error, Severity::Info);
            e.details = Some("shutdown".to_string());
            e
        }
    }
}

fn notice_to_log_entry(notice: &SessionNotice) -> LogEntry {
    match notice {
        SessionNotice::RunStarted { mode, level } => {
            let mut e = LogEntry::new(EventType::RunStart, Severity::Info);
            e.mode = Some(mode.label().to_string());
            e.level = Some(*level);
            e
        }
        SessionNotice::RoundRecorded {
            mode,
            round,
            level,
            earned,
            correct,
            score,
        } => {
            let mut e = LogEntry::new(EventType::RoundComplete, Severity::Info);
            e.mode = Some(mode.label().to_string());
            e.round = Some(*round);
            e.level = Some(*level);
            e.earned = Some(*earned);
            e.correct = Some(*correct);
            e.score = Some(*score);
            e
        }
        SessionNotice::RunFinished {
            reason,
            score,
            rounds_played,
            time_left,
        } => {
            let mut e = LogEntry::new(EventType::RunFinish, Severity::Info);
            e.reason = Some(
                match reason {
                    crate::session::model::FinishReason::RoundsExhausted => "rounds_exhausted",
                    crate::session::model::FinishReason::TimeExpired => "time_expired",
                }
                .to_string(),
            );
            e.score = Some(*score);
            e.rounds_played = Some(*rounds_played);
            e.time_left = Some(*time_left);
            e
        }
        SessionNotice::RunAbandoned { mode, round, score } => {
            let mut e = LogEntry::new(EventType::RunAbandon, Severity::Info);
            e.mode = Some(mode.label().to_string());
            e.round = Some(*round);
            e.score = Some(*score);
            e
        }
    }
}
