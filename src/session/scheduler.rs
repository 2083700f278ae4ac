//! Timer and deferred-event bookkeeping for the reducer's commands.
//!
//! The scheduler never sleeps and never reads the clock itself: callers pass
//! `now` in, so the same code drives the interactive loop and the headless
//! simulator.

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use super::model::{SessionCmd, SessionEvent, SessionNotice};

/// Period of the assessment countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Scheduler {
    tick_period: Duration,
    next_tick: Option<Instant>,
    pending: Vec<(Instant, SessionEvent)>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Scheduler {
    #[must_use]
    pub fn new(tick_period: Duration) -> Self {
        Self {
            tick_period,
            next_tick: None,
            pending: Vec::new(),
        }
    }

    /// Execute timer and scheduling commands; return the notices for the
    /// caller to record, in emission order.
    pub fn apply(&mut self, cmd: SessionCmd, now: Instant) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        for cmd in cmd.flatten() {
            match cmd {
                SessionCmd::StartTimer => self.next_tick = Some(now + self.tick_period),
                SessionCmd::StopTimer => self.next_tick = None,
                SessionCmd::ScheduleAdvance {
                    token,
                    next_level,
                    after,
                } => self.pending.push((
                    now + after,
                    SessionEvent::DeferredAdvance { token, next_level },
                )),
                SessionCmd::Notify(notice) => notices.push(notice),
                SessionCmd::None | SessionCmd::Batch(_) => {}
            }
        }
        notices
    }

    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.next_tick.is_some()
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Earliest instant at which [`due_events`](Self::due_events) has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let deferred = self.pending.iter().map(|(at, _)| *at).min();
        match (self.next_tick, deferred) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drain every event due at `now`, oldest deadline first. A stalled
    /// caller receives one `Tick` per elapsed period.
    pub fn due_events(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut due: Vec<(Instant, SessionEvent)> = Vec::new();

        if let Some(mut at) = self.next_tick {
            while at <= now {
                due.push((at, SessionEvent::Tick));
                at += self.tick_period;
            }
            self.next_tick = Some(at);
        }

        let (ready, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = waiting;
        due.extend(ready);

        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, event)| event).collect()
    }

    /// Forget the timer and all pending work.
    pub fn clear(&mut self) {
        self.next_tick = None;
        self.pending.clear();
    }
}
