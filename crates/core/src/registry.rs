//! Built-in dynamic quiz generators.
//!
//! Each entry maps a stable identifier to the constructor of a [`QuizSource`]. The host
//! adds these next to the static quiz banks it finds on disk.

use crate::calendar::{CalendarPolicy, DateRange};
use crate::model::{Overview, QuizSource, QuizSourceError};

/// A registered generator and its constructor.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorEntry {
    pub id: &'static str,
    build: fn() -> Result<QuizSource, QuizSourceError>,
}

impl GeneratorEntry {
    /// # Errors
    ///
    /// Propagates the constructor's `QuizSourceError`.
    pub fn build(&self) -> Result<QuizSource, QuizSourceError> {
        (self.build)()
    }
}

pub const GENERATORS: &[GeneratorEntry] = &[
    GeneratorEntry {
        id: "day-of-week",
        build: day_of_week_historical,
    },
    GeneratorEntry {
        id: "day-of-week-proleptic",
        build: day_of_week_proleptic,
    },
    GeneratorEntry {
        id: "multiplication-1",
        build: multiplication_one_digit,
    },
    GeneratorEntry {
        id: "multiplication-2",
        build: multiplication_two_digits,
    },
    GeneratorEntry {
        id: "multiplication-3",
        build: multiplication_three_digits,
    },
];

#[must_use]
pub fn lookup(id: &str) -> Option<&'static GeneratorEntry> {
    GENERATORS.iter().find(|entry| entry.id == id)
}

/// Build every registered generator, in registry order.
///
/// # Errors
///
/// Returns the first constructor error.
pub fn build_all() -> Result<Vec<QuizSource>, QuizSourceError> {
    GENERATORS.iter().map(GeneratorEntry::build).collect()
}

fn day_of_week_historical() -> Result<QuizSource, QuizSourceError> {
    Ok(QuizSource::calendar(
        Overview::new(
            "Day of the week",
            "Name the weekday of a date between 0001-01-01 and 9999-12-31 \
             (Julian calendar up to 1582-10-04, Gregorian from 1582-10-15).",
        ),
        CalendarPolicy::Historical,
        DateRange::full(),
    ))
}

fn day_of_week_proleptic() -> Result<QuizSource, QuizSourceError> {
    Ok(QuizSource::calendar(
        Overview::new(
            "Day of the week (proleptic Gregorian)",
            "Name the weekday of a date between 0001-01-01 and 9999-12-31 \
             using Gregorian rules throughout.",
        ),
        CalendarPolicy::ProlepticGregorian,
        DateRange::full(),
    ))
}

fn multiplication(digits: u32) -> Result<QuizSource, QuizSourceError> {
    QuizSource::multiplication(
        Overview::new(
            format!("Multiplication ({digits}-digit)"),
            format!("Multiply two numbers of up to {digits} digits."),
        ),
        digits,
    )
}

fn multiplication_one_digit() -> Result<QuizSource, QuizSourceError> {
    multiplication(1)
}

fn multiplication_two_digits() -> Result<QuizSource, QuizSourceError> {
    multiplication(2)
}

fn multiplication_three_digits() -> Result<QuizSource, QuizSourceError> {
    multiplication(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Generator;

    #[test]
    fn every_entry_builds() {
        let sources = build_all().unwrap();
        assert_eq!(sources.len(), GENERATORS.len());
        assert!(sources.iter().all(|s| !matches!(s.generator(), Generator::Static(_))));
    }

    #[test]
    fn ids_are_unique_and_resolvable() {
        for entry in GENERATORS {
            assert_eq!(lookup(entry.id).unwrap().id, entry.id);
            assert_eq!(GENERATORS.iter().filter(|e| e.id == entry.id).count(), 1);
        }
        assert!(lookup("spelling-bee").is_none());
    }

    #[test]
    fn day_of_week_defaults_to_historical_calendar() {
        let source = lookup("day-of-week").unwrap().build().unwrap();
        match source.generator() {
            Generator::Calendar(calendar) => {
                assert_eq!(calendar.policy, CalendarPolicy::Historical);
                assert_eq!(calendar.range, DateRange::full());
            }
            other => panic!("unexpected generator {other:?}"),
        }
    }
}
