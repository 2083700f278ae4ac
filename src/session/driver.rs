//! Glue between the reducer, the scheduler and an activity sink.
//!
//! Both the interactive terminal loop and the headless simulator drive a
//! [`GameDriver`]; they differ only in where events and `now` come from.

#![allow(missing_docs)]

use std::time::Instant;

use crate::puzzle::builder::PuzzleBuilder;

use super::model::{Session, SessionEvent, SessionNotice};
use super::scheduler::Scheduler;
use super::update::update;

/// Receiver for the activity notices a run produces.
pub trait NoticeSink {
    fn record(&mut self, notice: &SessionNotice);
}

/// Sink that drops every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NoticeSink for NullSink {
    fn record(&mut self, _notice: &SessionNotice) {}
}

impl NoticeSink for Vec<SessionNotice> {
    fn record(&mut self, notice: &SessionNotice) {
        self.push(notice.clone());
    }
}

pub struct GameDriver<S: NoticeSink> {
    session: Session,
    builder: PuzzleBuilder,
    scheduler: Scheduler,
    sink: S,
}

impl<S: NoticeSink> GameDriver<S> {
    pub fn new(session: Session, builder: PuzzleBuilder, sink: S) -> Self {
        Self {
            session,
            builder,
            scheduler: Scheduler::default(),
            sink,
        }
    }

    /// Feed one event through the reducer and execute its command.
    pub fn dispatch(&mut self, event: SessionEvent, now: Instant) {
        let cmd = update(&mut self.session, &mut self.builder, event);
        for notice in self.scheduler.apply(cmd, now) {
            self.sink.record(&notice);
        }
    }

    /// Deliver every scheduled event due at `now`. Returns how many fired.
    pub fn pump(&mut self, now: Instant) -> usize {
        let due = self.scheduler.due_events(now);
        let fired = due.len();
        for event in due {
            self.dispatch(event, now);
        }
        fired
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn builder(&self) -> &PuzzleBuilder {
        &self.builder
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (Session, S) {
        (self.session, self.sink)
    }
}
