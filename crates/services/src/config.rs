use quiz_core::model::{ModeError, ModeKind, ModeLimits, PlayMode};

/// Limits applied to the numeric parameter typed in on the mode selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaySettings {
    pub time_limit: ModeLimits,
    pub quiz_count: ModeLimits,
}

impl Default for PlaySettings {
    fn default() -> Self {
        Self {
            time_limit: ModeLimits::TIME_LIMIT_SECONDS,
            quiz_count: ModeLimits::QUIZ_COUNT,
        }
    }
}

impl PlaySettings {
    /// Build a play mode from its kind and the raw parameter entry.
    ///
    /// A missing or malformed entry falls back to the default; numbers are clamped.
    #[must_use]
    pub fn resolve(&self, kind: ModeKind, raw: Option<&str>) -> PlayMode {
        match kind {
            ModeKind::Endless => PlayMode::Endless,
            ModeKind::TimeLimited => PlayMode::TimeLimited {
                seconds: raw.map_or(self.time_limit.default, |r| self.time_limit.normalize(r)),
            },
            ModeKind::FixedCount => PlayMode::FixedCount {
                count: raw.map_or(self.quiz_count.default, |r| self.quiz_count.normalize(r)),
            },
        }
    }

    /// Parse a mode name and resolve its parameter.
    ///
    /// # Errors
    ///
    /// Returns `ModeError::InvalidMode` for an unknown mode name.
    pub fn parse(&self, mode: &str, raw: Option<&str>) -> Result<PlayMode, ModeError> {
        let kind: ModeKind = mode.parse()?;
        Ok(self.resolve(kind, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_defaults_and_clamps() {
        let settings = PlaySettings::default();
        assert_eq!(
            settings.resolve(ModeKind::TimeLimited, None),
            PlayMode::TimeLimited { seconds: 120 }
        );
        assert_eq!(
            settings.resolve(ModeKind::FixedCount, Some("abc")),
            PlayMode::FixedCount { count: 10 }
        );
        assert_eq!(
            settings.resolve(ModeKind::FixedCount, Some("0")),
            PlayMode::FixedCount { count: 1 }
        );
        assert_eq!(settings.resolve(ModeKind::Endless, Some("5")), PlayMode::Endless);
    }

    #[test]
    fn parse_rejects_unknown_modes() {
        let settings = PlaySettings::default();
        assert_eq!(
            settings.parse("time-limit", Some("30")).unwrap(),
            PlayMode::TimeLimited { seconds: 30 }
        );
        assert!(matches!(
            settings.parse("marathon", None),
            Err(ModeError::InvalidMode(_))
        ));
    }
}
