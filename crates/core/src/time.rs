//! Wall-clock source for sessions.
//!
//! The session engine never reads the system time itself; callers pass `now` in. The
//! service layer owns a [`Clock`] and tests swap in a fixed one they can step forward.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// System time.
    #[default]
    Default,
    /// A pinned instant, moved only by [`Clock::advance`].
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Step a fixed clock forward by `delta`. A system clock is left alone.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Seconds from `earlier` to `later`, negative when `later` comes first.
#[must_use]
pub fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later.signed_duration_since(earlier);
    #[allow(clippy::cast_precision_loss)]
    let millis = delta.num_milliseconds() as f64;
    millis / 1000.0
}

/// Unix seconds of the instant used by [`fixed_now`] (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Deterministic instant for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// A clock pinned at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_steps_by_session_ticks() {
        let mut clock = fixed_clock();
        for _ in 0..3 {
            clock.advance(Duration::milliseconds(250));
        }
        assert_eq!(seconds_between(fixed_now(), clock.now()), 0.75);
        assert!(clock.is_fixed());
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::default_clock();
        clock.advance(Duration::days(365));
        assert!(!clock.is_fixed());
        assert!(clock.now() < fixed_now() + Duration::days(365 * 100));
    }

    #[test]
    fn seconds_between_keeps_sign_and_fraction() {
        let start = fixed_now();
        assert_eq!(seconds_between(start, start + Duration::milliseconds(1500)), 1.5);
        assert_eq!(seconds_between(start + Duration::seconds(2), start), -2.0);
    }
}
