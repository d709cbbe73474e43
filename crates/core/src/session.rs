//! The play session state machine.
//!
//! A [`Session`] is created in `Playing` with its first quiz on screen. Every event
//! (`submit_answer`, `request_next`, `retire`, `tick`) returns a [`Step`] holding the log
//! entries to persist and the notifications for the presentation host. The session never
//! performs I/O itself; the services layer forwards `Step::logs` to the log sink.
//!
//! Every displayed quiz produces exactly one log entry. A quiz still on screen when the
//! session ends is logged as [`AnswerResult::NoAnswer`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AnswerResult, LogEntry, ModeError, PlayMode, Quiz, QuizSource, QuizSourceError};
use crate::random::RandomSource;
use crate::timer::{CountdownTimer, ElapsedTimer, SessionTimer};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already finished")]
    Finished,

    #[error("no answered quiz is waiting to be continued")]
    NotInFeedback,

    #[error("the answered quiz is still showing feedback")]
    NotPlaying,

    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error(transparent)]
    Source(#[from] QuizSourceError),
}

//
// ─── STATE & EVENTS ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A quiz is on screen waiting for an answer.
    Playing,
    /// Endless mode only: the answered quiz is shown with its solution.
    Feedback,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The countdown of a time-limited session expired.
    TimeUp,
    /// A fixed-count session displayed and answered its last quiz.
    CountReached,
    /// The player ended the session.
    Retired,
}

/// Solution shown after an answer in endless mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub result: AnswerResult,
    pub submitted: String,
    pub question: String,
    pub answer: String,
    pub explanation: String,
}

/// State changes reported to the presentation host.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    QuizChanged {
        question: String,
        displayed_count: u32,
        correct_count: u32,
    },
    AnswerJudged {
        result: AnswerResult,
    },
    FeedbackReady(Feedback),
    TimerTick {
        elapsed_seconds: f64,
        remaining_seconds: Option<f64>,
    },
    SessionFinished(SessionSummary),
}

/// Output of a single event: entries to append to the log, then notifications in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub logs: Vec<LogEntry>,
    pub notifications: Vec<Notification>,
}

impl Step {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.notifications.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.notifications.iter().find_map(|n| match n {
            Notification::SessionFinished(summary) => Some(summary),
            _ => None,
        })
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Time-limited: correct answers divided by the configured seconds.
    AnswersPerSecond(f64),
    /// Fixed-count: total elapsed seconds divided by correct answers.
    SecondsPerCorrectAnswer(f64),
}

/// Results of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub source_name: String,
    pub mode: PlayMode,
    pub reason: FinishReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub displayed_count: u32,
    pub correct_count: u32,
    pub elapsed_seconds: f64,
    /// Time left on the countdown when a time-limited session stopped, never negative.
    pub remaining_seconds_at_stop: Option<f64>,
}

impl SessionSummary {
    /// Fraction of displayed quizzes answered correctly.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.displayed_count == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.displayed_count)
    }

    /// Mode-specific score; `None` for endless sessions and for a fixed-count session
    /// without a single correct answer.
    #[must_use]
    pub fn score(&self) -> Option<Score> {
        match self.mode {
            PlayMode::Endless => None,
            PlayMode::TimeLimited { seconds } => Some(Score::AnswersPerSecond(
                f64::from(self.correct_count) / f64::from(seconds),
            )),
            PlayMode::FixedCount { .. } if self.correct_count == 0 => None,
            PlayMode::FixedCount { .. } => Some(Score::SecondsPerCorrectAnswer(
                self.elapsed_seconds / f64::from(self.correct_count),
            )),
        }
    }

    /// Quizzes the player still had to go when retiring a fixed-count session,
    /// counting the unanswered one on screen.
    #[must_use]
    pub fn quizzes_left(&self) -> Option<u32> {
        match (self.mode, self.reason) {
            (PlayMode::FixedCount { count }, FinishReason::Retired) => {
                Some((count + 1).saturating_sub(self.displayed_count))
            }
            _ => None,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A single play session over one quiz source.
pub struct Session {
    source: Arc<QuizSource>,
    rng: Box<dyn RandomSource>,
    mode: PlayMode,
    state: SessionState,
    current: Quiz,
    displayed_count: u32,
    correct_count: u32,
    is_current_answer_logged: bool,
    timer: SessionTimer,
    started_at: DateTime<Utc>,
    summary: Option<SessionSummary>,
}

impl Session {
    /// Start playing: draws the first quiz and starts the timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Mode` for a zero limit and `SessionError::Source` if the
    /// first quiz cannot be generated.
    pub fn start(
        source: Arc<QuizSource>,
        mode: PlayMode,
        mut rng: Box<dyn RandomSource>,
        now: DateTime<Utc>,
    ) -> Result<(Self, Step), SessionError> {
        let mode = mode.validate()?;
        let current = source.generate_quiz(rng.as_mut())?;
        let mut timer = match mode {
            PlayMode::TimeLimited { seconds } => {
                SessionTimer::Countdown(CountdownTimer::new(f64::from(seconds)))
            }
            PlayMode::Endless | PlayMode::FixedCount { .. } => {
                SessionTimer::Elapsed(ElapsedTimer::new())
            }
        };
        timer.start(now);

        let session = Self {
            source,
            rng,
            mode,
            state: SessionState::Playing,
            current,
            displayed_count: 1,
            correct_count: 0,
            is_current_answer_logged: false,
            timer,
            started_at: now,
            summary: None,
        };
        let step = Step {
            logs: Vec::new(),
            notifications: vec![session.quiz_changed()],
        };
        Ok((session, step))
    }

    #[must_use]
    pub fn source(&self) -> &QuizSource {
        &self.source
    }

    #[must_use]
    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn current_quiz(&self) -> &Quiz {
        &self.current
    }

    #[must_use]
    pub fn displayed_count(&self) -> u32 {
        self.displayed_count
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn is_current_answer_logged(&self) -> bool {
        self.is_current_answer_logged
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        self.timer.elapsed_seconds(now)
    }

    /// Countdown time left; `None` outside time-limited sessions.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<f64> {
        match &self.timer {
            SessionTimer::Countdown(timer) => Some(timer.remaining_seconds(now)),
            SessionTimer::Elapsed(_) => None,
        }
    }

    /// Score the answer to the quiz on screen.
    ///
    /// Endless sessions move to `Feedback`; the other modes go straight to the next
    /// quiz or finish. An answer arriving after the countdown expired is not scored: the
    /// quiz is logged as `NoAnswer` and the session finishes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` after the session ended and
    /// `SessionError::NotPlaying` while endless feedback is showing.
    pub fn submit_answer(&mut self, answer: &str, now: DateTime<Utc>) -> Result<Step, SessionError> {
        match self.state {
            SessionState::Finished => return Err(SessionError::Finished),
            SessionState::Feedback => return Err(SessionError::NotPlaying),
            SessionState::Playing => {}
        }
        if self.timer.is_time_over(now) {
            return Ok(self.finish(FinishReason::TimeUp, now));
        }

        // Draw the follow-up quiz before touching any state: a failed draw leaves the
        // current quiz unanswered and unlogged.
        let needs_next = match self.mode {
            PlayMode::Endless => false,
            PlayMode::TimeLimited { .. } => true,
            PlayMode::FixedCount { count } => self.displayed_count < count,
        };
        let next = if needs_next {
            Some(self.source.generate_quiz(self.rng.as_mut())?)
        } else {
            None
        };

        let is_correct = self.current.check_answer(answer);
        if is_correct {
            self.correct_count += 1;
        }
        let result = AnswerResult::from_check(is_correct);

        let mut step = Step::default();
        self.log_current(result, now, &mut step);
        step.notifications.push(Notification::AnswerJudged { result });

        match (self.mode, next) {
            (PlayMode::Endless, _) => {
                self.state = SessionState::Feedback;
                step.notifications.push(Notification::FeedbackReady(Feedback {
                    result,
                    submitted: answer.to_owned(),
                    question: self.current.question().to_owned(),
                    answer: self.current.delimited_answer(),
                    explanation: self.current.explanation().to_owned(),
                }));
            }
            (_, Some(quiz)) => self.show(quiz, &mut step),
            (_, None) => self.finish_into(FinishReason::CountReached, now, &mut step),
        }
        Ok(step)
    }

    /// Leave endless feedback for a freshly generated quiz.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInFeedback` unless feedback is showing, and
    /// `SessionError::Finished` after the session ended.
    pub fn request_next(&mut self) -> Result<Step, SessionError> {
        match self.state {
            SessionState::Finished => Err(SessionError::Finished),
            SessionState::Playing => Err(SessionError::NotInFeedback),
            SessionState::Feedback => {
                let mut step = Step::default();
                self.advance(&mut step)?;
                Ok(step)
            }
        }
    }

    /// End the session early. The quiz on screen, if unanswered, is logged as `NoAnswer`.
    ///
    /// Calling this on a finished session does nothing, so a repeated cancel can never
    /// write a second entry.
    pub fn retire(&mut self, now: DateTime<Utc>) -> Step {
        if self.is_finished() {
            return Step::default();
        }
        self.finish(FinishReason::Retired, now)
    }

    /// Periodic timer event. Finishes a time-limited session whose countdown expired;
    /// otherwise reports the clock for display.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Step {
        if self.is_finished() {
            return Step::default();
        }
        if self.timer.is_time_over(now) {
            return self.finish(FinishReason::TimeUp, now);
        }
        Step {
            logs: Vec::new(),
            notifications: vec![Notification::TimerTick {
                elapsed_seconds: self.elapsed_seconds(now),
                remaining_seconds: self.remaining_seconds(now),
            }],
        }
    }

    fn quiz_changed(&self) -> Notification {
        Notification::QuizChanged {
            question: self.current.question().to_owned(),
            displayed_count: self.displayed_count,
            correct_count: self.correct_count,
        }
    }

    fn log_current(&mut self, result: AnswerResult, now: DateTime<Utc>, step: &mut Step) {
        if self.is_current_answer_logged {
            return;
        }
        step.logs.push(LogEntry::for_quiz(&self.current, result, now));
        self.is_current_answer_logged = true;
    }

    fn advance(&mut self, step: &mut Step) -> Result<(), SessionError> {
        let quiz = self.source.generate_quiz(self.rng.as_mut())?;
        self.show(quiz, step);
        Ok(())
    }

    fn show(&mut self, quiz: Quiz, step: &mut Step) {
        self.current = quiz;
        self.displayed_count += 1;
        self.is_current_answer_logged = false;
        self.state = SessionState::Playing;
        step.notifications.push(self.quiz_changed());
    }

    fn finish(&mut self, reason: FinishReason, now: DateTime<Utc>) -> Step {
        let mut step = Step::default();
        self.finish_into(reason, now, &mut step);
        step
    }

    fn finish_into(&mut self, reason: FinishReason, now: DateTime<Utc>, step: &mut Step) {
        self.log_current(AnswerResult::NoAnswer, now, step);
        self.timer.stop(now);
        self.state = SessionState::Finished;

        let remaining_seconds_at_stop = match &self.timer {
            SessionTimer::Countdown(timer) => timer.remaining_at_stop(),
            SessionTimer::Elapsed(_) => None,
        };
        let summary = SessionSummary {
            source_name: self.source.name().to_owned(),
            mode: self.mode,
            reason,
            started_at: self.started_at,
            finished_at: now,
            displayed_count: self.displayed_count,
            correct_count: self.correct_count,
            elapsed_seconds: self.timer.elapsed_seconds(now),
            remaining_seconds_at_stop,
        };
        self.summary = Some(summary.clone());
        step.notifications.push(Notification::SessionFinished(summary));
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("source", &self.source.name())
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("displayed_count", &self.displayed_count)
            .field("correct_count", &self.correct_count)
            .field("is_current_answer_logged", &self.is_current_answer_logged)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
