use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{LogEntry, PlayMode, QuizSource};
use quiz_core::session::{Notification, Session, Step};
use quiz_core::{Clock, Entropy};
use storage::repository::LogSink;
use tracing::{debug, info, warn};

use crate::error::PlayError;

/// Everything the presentation host is told about.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayEvent {
    SourceSelected { name: String, description: String },
    Engine(Notification),
    /// Log entries could not be written yet; they stay queued and are retried.
    LogDeferred { pending: usize, reason: String },
}

/// Receives state changes; implemented by whatever renders the game.
pub trait PresentationHost: Send {
    fn notify(&mut self, event: &PlayEvent);
}

/// Drives one session at a time and persists its log entries.
///
/// Host intents map to the async methods here. The service reads `now` from its
/// clock and hands it to the pure [`Session`]; log entries the session emits are
/// appended before the notifications of the same step are delivered.
pub struct PlayService {
    clock: Clock,
    entropy: Entropy,
    log: Arc<dyn LogSink>,
    host: Box<dyn PresentationHost>,
    source: Option<Arc<QuizSource>>,
    session: Option<Session>,
    pending_logs: VecDeque<LogEntry>,
    closed: bool,
}

impl PlayService {
    #[must_use]
    pub fn new(
        clock: Clock,
        entropy: Entropy,
        log: Arc<dyn LogSink>,
        host: Box<dyn PresentationHost>,
    ) -> Self {
        Self {
            clock,
            entropy,
            log,
            host,
            source: None,
            session: None,
            pending_logs: VecDeque::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access for fixed clocks in tests and replays.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn selected_source(&self) -> Option<&Arc<QuizSource>> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// True while a session is playing or showing feedback.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.is_finished())
    }

    #[must_use]
    pub fn pending_log_count(&self) -> usize {
        self.pending_logs.len()
    }

    /// Entries the sink has not accepted yet, oldest first.
    pub fn pending_logs(&self) -> impl ExactSizeIterator<Item = &LogEntry> {
        self.pending_logs.iter()
    }

    /// Choose the source the next `start` plays.
    pub fn select_source(&mut self, source: Arc<QuizSource>) {
        debug!(name = source.name(), "quiz source selected");
        self.host.notify(&PlayEvent::SourceSelected {
            name: source.name().to_owned(),
            description: source.description().to_owned(),
        });
        self.source = Some(source);
    }

    /// Start a session on the selected source. A session still in progress is retired
    /// first, so its pending quiz is logged.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::NoSourceSelected` without a source, `PlayError::Closed` after
    /// `close`, and `PlayError::Session` if the session cannot start.
    pub async fn start(&mut self, mode: PlayMode) -> Result<(), PlayError> {
        if self.closed {
            return Err(PlayError::Closed);
        }
        let source = self.source.clone().ok_or(PlayError::NoSourceSelected)?;
        if self.is_playing() {
            self.retire().await?;
        }

        let now = self.clock.now();
        let (session, step) = Session::start(source, mode, self.entropy.source(), now)?;
        info!(
            source = session.source().name(),
            mode = %mode.kind(),
            "session started"
        );
        self.session = Some(session);
        self.apply(step).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PlayError::NoSession` without a session and `PlayError::Session` when the
    /// session is not waiting for an answer.
    pub async fn submit_answer(&mut self, text: &str) -> Result<(), PlayError> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(PlayError::NoSession)?;
        let step = session.submit_answer(text, now)?;
        self.apply(step).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PlayError::NoSession` without a session and `PlayError::Session` unless
    /// endless feedback is showing.
    pub async fn request_next(&mut self) -> Result<(), PlayError> {
        let session = self.session.as_mut().ok_or(PlayError::NoSession)?;
        let step = session.request_next()?;
        self.apply(step).await;
        Ok(())
    }

    /// End the session early. Repeated calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::NoSession` if no session was ever started.
    pub async fn retire(&mut self) -> Result<(), PlayError> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(PlayError::NoSession)?;
        let step = session.retire(now);
        if !step.is_empty() {
            info!("session retired");
        }
        self.apply(step).await;
        Ok(())
    }

    /// Periodic timer callback. Retries deferred log writes and lets a time-limited
    /// session expire.
    pub async fn tick(&mut self) {
        let now = self.clock.now();
        let step = match self.session.as_mut() {
            Some(session) => session.tick(now),
            None => Step::default(),
        };
        self.apply(step).await;
    }

    /// Retire any running session, write what is still queued, and close the log sink.
    /// Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::LogsNotWritten` if queued entries could not be written, and
    /// `PlayError::Storage` if the sink fails to close. Both leave the service closed.
    pub async fn close(&mut self) -> Result<(), PlayError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let now = self.clock.now();
        if let Some(session) = self.session.as_mut() {
            let step = session.retire(now);
            self.apply(step).await;
        }

        let unwritten = match self.flush_pending().await {
            Ok(()) => None,
            Err(reason) => Some(PlayError::LogsNotWritten {
                count: self.pending_logs.len(),
                reason,
            }),
        };
        self.log.close().await?;
        info!("play service closed");
        match unwritten {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn apply(&mut self, step: Step) {
        self.pending_logs.extend(step.logs);
        if let Err(reason) = self.flush_pending().await {
            self.host.notify(&PlayEvent::LogDeferred {
                pending: self.pending_logs.len(),
                reason,
            });
        }
        for notification in step.notifications {
            if let Notification::SessionFinished(summary) = &notification {
                info!(
                    source = %summary.source_name,
                    displayed = summary.displayed_count,
                    correct = summary.correct_count,
                    reason = ?summary.reason,
                    "session finished"
                );
            }
            self.host.notify(&PlayEvent::Engine(notification));
        }
    }

    /// Append queued entries in order, stopping at the first failure.
    async fn flush_pending(&mut self) -> Result<(), String> {
        while let Some(entry) = self.pending_logs.front() {
            match self.log.append(entry).await {
                Ok(id) => {
                    debug!(id, result = ?entry.result, "log entry written");
                    self.pending_logs.pop_front();
                }
                Err(err) => {
                    warn!(pending = self.pending_logs.len(), error = %err, "log write deferred");
                    return Err(err.to_string());
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PlayService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayService")
            .field("clock", &self.clock)
            .field("entropy", &self.entropy)
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field("session", &self.session)
            .field("pending_logs", &self.pending_logs.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
