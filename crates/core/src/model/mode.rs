use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeError {
    #[error("unknown play mode: {0:?}")]
    InvalidMode(String),

    #[error("{0} needs a limit greater than zero")]
    ZeroLimit(ModeKind),
}

//
// ─── PLAY MODE ─────────────────────────────────────────────────────────────────
//

/// Mode identifier as chosen on the mode selection screen, before its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    Endless,
    TimeLimited,
    FixedCount,
}

impl ModeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModeKind::Endless => "endless",
            ModeKind::TimeLimited => "time-limit",
            ModeKind::FixedCount => "fixed-count",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeKind {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "endless" => Ok(Self::Endless),
            "time-limit" | "time-limited" | "time" => Ok(Self::TimeLimited),
            "fixed-count" | "fixed" | "count" => Ok(Self::FixedCount),
            _ => Err(ModeError::InvalidMode(s.to_owned())),
        }
    }
}

/// How a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    /// Runs until the player ends it, pausing on feedback after every answer.
    Endless,
    /// Runs until the countdown expires.
    TimeLimited { seconds: u32 },
    /// Runs until `count` quizzes have been displayed and answered.
    FixedCount { count: u32 },
}

impl PlayMode {
    #[must_use]
    pub fn kind(&self) -> ModeKind {
        match self {
            PlayMode::Endless => ModeKind::Endless,
            PlayMode::TimeLimited { .. } => ModeKind::TimeLimited,
            PlayMode::FixedCount { .. } => ModeKind::FixedCount,
        }
    }

    /// # Errors
    ///
    /// Returns `ModeError::ZeroLimit` for a time limit or quiz count of zero.
    pub fn validate(self) -> Result<Self, ModeError> {
        match self {
            PlayMode::TimeLimited { seconds: 0 } | PlayMode::FixedCount { count: 0 } => {
                Err(ModeError::ZeroLimit(self.kind()))
            }
            _ => Ok(self),
        }
    }
}

//
// ─── LIMITS ────────────────────────────────────────────────────────────────────
//

/// Default and bounds for a numeric mode parameter typed in by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeLimits {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl ModeLimits {
    /// Time limit in seconds: two minutes by default, up to an hour.
    pub const TIME_LIMIT_SECONDS: Self = Self {
        default: 120,
        min: 1,
        max: 3_600,
    };

    /// Number of quizzes in a fixed-count session.
    pub const QUIZ_COUNT: Self = Self {
        default: 10,
        min: 1,
        max: 10_000,
    };

    /// Turn raw player input into a usable value.
    ///
    /// Numbers are truncated toward zero and clamped into `[min, max]`; anything that
    /// does not parse as a finite number falls back to `default`.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> u32 {
        let Ok(value) = raw.trim().parse::<f64>() else {
            return self.default;
        };
        if !value.is_finite() {
            return self.default;
        }
        let truncated = value.trunc();
        if truncated < f64::from(self.min) {
            self.min
        } else if truncated > f64::from(self.max) {
            self.max
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = truncated as u32;
            value
        }
    }
}
