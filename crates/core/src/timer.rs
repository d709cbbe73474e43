//! Elapsed and countdown timers.
//!
//! Timers never read the clock themselves: every call takes `now` from the caller's
//! [`Clock`](crate::Clock). Queries before `start` return zero elapsed time, and no
//! operation fails.

use chrono::{DateTime, Utc};

use crate::time::seconds_between;

/// Measures time since `start`, frozen once stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElapsedTimer {
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    total_seconds: f64,
}

impl ElapsedTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.stopped_at = None;
        self.total_seconds = 0.0;
    }

    /// Freeze the total. Later calls are ignored.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.is_stopped() {
            return;
        }
        self.stopped_at = Some(now);
        self.total_seconds = self
            .started_at
            .map_or(0.0, |started| seconds_between(started, now));
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    /// Seconds since `start`; the frozen total once stopped.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        if self.is_stopped() {
            return self.total_seconds;
        }
        self.started_at
            .map_or(0.0, |started| seconds_between(started, now))
    }

    /// Total recorded by `stop`, or `0.0` while running.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }
}

/// Counts down from a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownTimer {
    inner: ElapsedTimer,
    duration_seconds: f64,
    remaining_at_stop: Option<f64>,
}

impl CountdownTimer {
    #[must_use]
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            inner: ElapsedTimer::new(),
            duration_seconds,
            remaining_at_stop: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.inner.start(now);
        self.remaining_at_stop = None;
    }

    /// Freeze elapsed time and record the non-negative time left. Later calls are ignored.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.inner.is_stopped() {
            return;
        }
        self.inner.stop(now);
        self.remaining_at_stop = Some(self.remaining_seconds(now).max(0.0));
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        self.inner.elapsed_seconds(now)
    }

    /// Duration minus elapsed time; negative once the countdown has run past zero.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> f64 {
        self.duration_seconds - self.inner.elapsed_seconds(now)
    }

    #[must_use]
    pub fn is_time_over(&self, now: DateTime<Utc>) -> bool {
        self.remaining_seconds(now) < 0.0
    }

    #[must_use]
    pub fn remaining_at_stop(&self) -> Option<f64> {
        self.remaining_at_stop
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.inner.total_seconds()
    }
}

/// The timer a session runs, chosen by its play mode.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionTimer {
    Elapsed(ElapsedTimer),
    Countdown(CountdownTimer),
}

impl SessionTimer {
    pub fn start(&mut self, now: DateTime<Utc>) {
        match self {
            SessionTimer::Elapsed(timer) => timer.start(now),
            SessionTimer::Countdown(timer) => timer.start(now),
        }
    }

    pub fn stop(&mut self, now: DateTime<Utc>) {
        match self {
            SessionTimer::Elapsed(timer) => timer.stop(now),
            SessionTimer::Countdown(timer) => timer.stop(now),
        }
    }

    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        match self {
            SessionTimer::Elapsed(timer) => timer.elapsed_seconds(now),
            SessionTimer::Countdown(timer) => timer.elapsed_seconds(now),
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        match self {
            SessionTimer::Elapsed(timer) => timer.is_stopped(),
            SessionTimer::Countdown(timer) => timer.is_stopped(),
        }
    }

    #[must_use]
    pub fn is_time_over(&self, now: DateTime<Utc>) -> bool {
        match self {
            SessionTimer::Elapsed(_) => false,
            SessionTimer::Countdown(timer) => timer.is_time_over(now),
        }
    }
}
