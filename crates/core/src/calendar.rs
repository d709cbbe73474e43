//! Calendar arithmetic for the day-of-week quiz.
//!
//! Dates are carried as `chrono::NaiveDate` (year/month/day labels). Under
//! [`CalendarPolicy::Historical`] a label on or before 1582-10-04 is read as a Julian
//! date and a label on or after 1582-10-15 as a Gregorian one; the ten labels in
//! between never existed and are rejected.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::{RandomSource, uniform_int};

/// Last Julian date of the historical transition, as `(year, month, day)`.
pub const JULIAN_CUTOFF: (i32, u32, u32) = (1582, 10, 4);

/// First Gregorian date of the historical transition, as `(year, month, day)`.
pub const GREGORIAN_START: (i32, u32, u32) = (1582, 10, 15);

/// `num_days_from_ce` of 0001-01-01.
pub const FIRST_SUPPORTED_DAY: i32 = 1;

/// `num_days_from_ce` of 9999-12-31.
pub const LAST_SUPPORTED_DAY: i32 = 3_652_059;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CalendarError {
    #[error("{0} falls inside the Julian/Gregorian transition gap and has no weekday")]
    UndefinedDate(NaiveDate),

    #[error("{0} is outside the supported range 0001-01-01..=9999-12-31")]
    OutOfRange(NaiveDate),

    #[error("date range start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("date range {start}..={end} contains no valid dates under the historical calendar")]
    NoValidDates { start: NaiveDate, end: NaiveDate },

    #[error("day number {0} does not map to a calendar date")]
    DayNumber(i32),
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Which calendar rules govern a date label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalendarPolicy {
    /// Julian rules up to 1582-10-04, Gregorian rules from 1582-10-15.
    #[default]
    Historical,
    /// Gregorian rules across the whole range.
    ProlepticGregorian,
}

impl CalendarPolicy {
    /// Whether Gregorian day-of-week rules apply to `date`.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::UndefinedDate` for a historical-policy date inside the
    /// transition gap.
    pub fn uses_gregorian_rules(self, date: NaiveDate) -> Result<bool, CalendarError> {
        match self {
            CalendarPolicy::ProlepticGregorian => Ok(true),
            CalendarPolicy::Historical => {
                let ymd = ymd(date);
                if ymd >= GREGORIAN_START {
                    Ok(true)
                } else if ymd <= JULIAN_CUTOFF {
                    Ok(false)
                } else {
                    Err(CalendarError::UndefinedDate(date))
                }
            }
        }
    }
}

fn ymd(date: NaiveDate) -> (i32, u32, u32) {
    (date.year(), date.month(), date.day())
}

/// True for the labels strictly between the Julian cutoff and the Gregorian start.
#[must_use]
pub fn in_transition_gap(date: NaiveDate) -> bool {
    let ymd = ymd(date);
    ymd > JULIAN_CUTOFF && ymd < GREGORIAN_START
}

//
// ─── DAY OF WEEK ───────────────────────────────────────────────────────────────
//

/// Day of the week for `date` under `policy`.
///
/// Use `Weekday::number_from_monday` for the ISO number (1 = Monday, 7 = Sunday).
///
/// # Errors
///
/// Returns `CalendarError::UndefinedDate` when the historical policy is asked about a
/// date in the transition gap.
pub fn day_of_week(date: NaiveDate, policy: CalendarPolicy) -> Result<Weekday, CalendarError> {
    let gregorian = policy.uses_gregorian_rules(date)?;

    let mut year = i64::from(date.year());
    let mut month = i64::from(date.month());
    let day = i64::from(date.day());
    if month < 3 {
        month += 12;
        year -= 1;
    }
    let century = year.div_euclid(100);
    let year_in_century = year.rem_euclid(100);

    let mut h = day + (13 * (month + 1)).div_euclid(5) + year_in_century + year_in_century / 4;
    if gregorian {
        h += century.div_euclid(4) - 2 * century;
    } else {
        h += 5 - century;
    }

    // Zeller's h counts from Saturday; shift so index 0 is Monday.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (h + 5).rem_euclid(7) as usize;
    Ok(WEEKDAYS[index])
}

/// Full English name of a weekday.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

//
// ─── LEAP YEARS ────────────────────────────────────────────────────────────────
//

#[must_use]
pub fn is_gregorian_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

#[must_use]
pub fn is_julian_leap_year(year: i32) -> bool {
    year % 4 == 0
}

/// Leap-year status of `year` under `policy`.
///
/// The historical policy switches rules by year: years before 1582 use the Julian rule,
/// 1582 and later the Gregorian one. This is coarser than the day-level switch used by
/// [`day_of_week`] and is kept that way on purpose.
#[must_use]
pub fn is_leap_year(year: i32, policy: CalendarPolicy) -> bool {
    match policy {
        CalendarPolicy::ProlepticGregorian => is_gregorian_leap_year(year),
        CalendarPolicy::Historical if year < JULIAN_CUTOFF.0 => is_julian_leap_year(year),
        CalendarPolicy::Historical => is_gregorian_leap_year(year),
    }
}

//
// ─── SAMPLING ──────────────────────────────────────────────────────────────────
//

/// Inclusive range of dates to sample from, stored as `num_days_from_ce` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    first: i32,
    last: i32,
}

impl Default for DateRange {
    fn default() -> Self {
        Self::full()
    }
}

impl DateRange {
    /// 0001-01-01 through 9999-12-31.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            first: FIRST_SUPPORTED_DAY,
            last: LAST_SUPPORTED_DAY,
        }
    }

    /// Build a range from two dates in the supported span.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::OutOfRange` if either end is outside year 1..=9999 and
    /// `CalendarError::InvalidRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        let first = supported_day(start)?;
        let last = supported_day(end)?;
        if first > last {
            return Err(CalendarError::InvalidRange { start, end });
        }
        Ok(Self { first, last })
    }

    /// # Errors
    ///
    /// Returns `CalendarError::DayNumber` only if the stored bounds are corrupt.
    pub fn start(&self) -> Result<NaiveDate, CalendarError> {
        date_from_day(self.first)
    }

    /// # Errors
    ///
    /// Returns `CalendarError::DayNumber` only if the stored bounds are corrupt.
    pub fn end(&self) -> Result<NaiveDate, CalendarError> {
        date_from_day(self.last)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.first..=self.last).contains(&date.num_days_from_ce())
    }

    fn lies_within_gap(&self) -> Result<bool, CalendarError> {
        Ok(in_transition_gap(self.start()?) && in_transition_gap(self.end()?))
    }
}

fn supported_day(date: NaiveDate) -> Result<i32, CalendarError> {
    let day = date.num_days_from_ce();
    if (FIRST_SUPPORTED_DAY..=LAST_SUPPORTED_DAY).contains(&day) {
        Ok(day)
    } else {
        Err(CalendarError::OutOfRange(date))
    }
}

fn date_from_day(day: i32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_num_days_from_ce_opt(day).ok_or(CalendarError::DayNumber(day))
}

/// Draw a date uniformly from `range`.
///
/// Under the historical policy, draws landing in the transition gap are discarded and
/// redrawn, so every valid date keeps the same probability.
///
/// # Errors
///
/// Returns `CalendarError::NoValidDates` if the historical policy is asked to sample a
/// range that lies entirely inside the gap.
pub fn sample_date(
    rng: &mut dyn RandomSource,
    range: DateRange,
    policy: CalendarPolicy,
) -> Result<NaiveDate, CalendarError> {
    let historical = policy == CalendarPolicy::Historical;
    if historical && range.lies_within_gap()? {
        return Err(CalendarError::NoValidDates {
            start: range.start()?,
            end: range.end()?,
        });
    }

    loop {
        let drawn = uniform_int(rng, i64::from(range.first), i64::from(range.last));
        let day = i32::try_from(drawn).map_err(|_| CalendarError::DayNumber(range.last))?;
        let date = date_from_day(day)?;
        if historical && in_transition_gap(date) {
            continue;
        }
        return Ok(date);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn anchor_dates_match_known_weekdays() {
        let historical = CalendarPolicy::Historical;
        assert_eq!(
            day_of_week(date(2000, 1, 1), historical).unwrap().number_from_monday(),
            6
        );
        assert_eq!(day_of_week(date(1582, 10, 4), historical).unwrap(), Weekday::Thu);
        assert_eq!(day_of_week(date(1582, 10, 15), historical).unwrap(), Weekday::Fri);
        assert_eq!(day_of_week(date(1492, 10, 12), historical).unwrap(), Weekday::Fri);
        assert_eq!(day_of_week(date(1066, 10, 14), historical).unwrap(), Weekday::Sat);
        assert_eq!(day_of_week(date(1, 1, 1), historical).unwrap(), Weekday::Sat);
    }

    #[test]
    fn proleptic_policy_agrees_with_chrono_everywhere() {
        let mut rng = SeededRandom::new(2024);
        for _ in 0..5_000 {
            let d = sample_date(&mut rng, DateRange::full(), CalendarPolicy::ProlepticGregorian)
                .unwrap();
            let ours = day_of_week(d, CalendarPolicy::ProlepticGregorian).unwrap();
            assert_eq!(ours, d.weekday(), "mismatch for {d}");
        }
        assert_eq!(
            day_of_week(date(1, 1, 1), CalendarPolicy::ProlepticGregorian).unwrap(),
            Weekday::Mon
        );
        assert_eq!(
            day_of_week(date(9999, 12, 31), CalendarPolicy::ProlepticGregorian).unwrap(),
            Weekday::Fri
        );
    }

    #[test]
    fn historical_policy_agrees_with_chrono_after_the_switch() {
        let range = DateRange::new(date(1582, 10, 15), date(9999, 12, 31)).unwrap();
        let mut rng = SeededRandom::new(99);
        for _ in 0..2_000 {
            let d = sample_date(&mut rng, range, CalendarPolicy::Historical).unwrap();
            assert_eq!(day_of_week(d, CalendarPolicy::Historical).unwrap(), d.weekday());
        }
    }

    #[test]
    fn julian_days_run_consecutively_into_the_switch() {
        let mut previous = day_of_week(date(1582, 9, 1), CalendarPolicy::Historical).unwrap();
        let mut d = date(1582, 9, 2);
        while d <= date(1582, 10, 4) {
            let current = day_of_week(d, CalendarPolicy::Historical).unwrap();
            assert_eq!(current, previous.succ());
            previous = current;
            d = d.succ_opt().unwrap();
        }
        let first_gregorian = day_of_week(date(1582, 10, 15), CalendarPolicy::Historical).unwrap();
        assert_eq!(first_gregorian, previous.succ());
    }

    #[test]
    fn gap_dates_are_undefined() {
        for day in 5..=14 {
            let err = day_of_week(date(1582, 10, day), CalendarPolicy::Historical).unwrap_err();
            assert_eq!(err, CalendarError::UndefinedDate(date(1582, 10, day)));
            assert!(in_transition_gap(date(1582, 10, day)));
        }
        assert!(!in_transition_gap(date(1582, 10, 4)));
        assert!(!in_transition_gap(date(1582, 10, 15)));
        assert!(day_of_week(date(1582, 10, 10), CalendarPolicy::ProlepticGregorian).is_ok());
    }

    #[test]
    fn leap_year_rules() {
        assert!(is_gregorian_leap_year(2000));
        assert!(!is_gregorian_leap_year(1900));
        assert!(is_julian_leap_year(1900));
        assert!(!is_julian_leap_year(1901));

        assert!(is_leap_year(1500, CalendarPolicy::Historical));
        assert!(!is_leap_year(1500, CalendarPolicy::ProlepticGregorian));
        assert!(!is_leap_year(1700, CalendarPolicy::Historical));
        assert!(is_leap_year(1600, CalendarPolicy::Historical));
    }

    #[test]
    fn sampling_rejects_gap_draws() {
        let range = DateRange::new(date(1582, 10, 1), date(1582, 10, 20)).unwrap();
        // 0.45 lands on 1582-10-10, 0.0 on 1582-10-01.
        let mut rng = ScriptedRandom::new(vec![0.45, 0.0]);
        let sampled = sample_date(&mut rng, range, CalendarPolicy::Historical).unwrap();
        assert_eq!(sampled, date(1582, 10, 1));

        let mut rng = ScriptedRandom::new(vec![0.45]);
        let sampled = sample_date(&mut rng, range, CalendarPolicy::ProlepticGregorian).unwrap();
        assert_eq!(sampled, date(1582, 10, 10));
    }

    #[test]
    fn historical_sampling_never_returns_gap_dates() {
        let range = DateRange::new(date(1582, 9, 20), date(1582, 10, 31)).unwrap();
        let mut rng = SeededRandom::new(5);
        for _ in 0..5_000 {
            let d = sample_date(&mut rng, range, CalendarPolicy::Historical).unwrap();
            assert!(!in_transition_gap(d), "sampled gap date {d}");
            assert!(range.contains(d));
        }
    }

    #[test]
    fn sampling_a_gap_only_range_is_an_error() {
        let range = DateRange::new(date(1582, 10, 6), date(1582, 10, 9)).unwrap();
        let mut rng = ScriptedRandom::new(vec![0.5]);
        let err = sample_date(&mut rng, range, CalendarPolicy::Historical).unwrap_err();
        assert!(matches!(err, CalendarError::NoValidDates { .. }));
    }

    #[test]
    fn full_range_bounds() {
        let range = DateRange::full();
        assert_eq!(range.start().unwrap(), date(1, 1, 1));
        assert_eq!(range.end().unwrap(), date(9999, 12, 31));

        let mut low = ScriptedRandom::new(vec![0.0]);
        let mut high = ScriptedRandom::new(vec![0.999_999_999]);
        assert_eq!(
            sample_date(&mut low, range, CalendarPolicy::Historical).unwrap(),
            date(1, 1, 1)
        );
        assert_eq!(
            sample_date(&mut high, range, CalendarPolicy::Historical).unwrap(),
            date(9999, 12, 31)
        );
    }

    #[test]
    fn range_validation() {
        let err = DateRange::new(date(2000, 1, 2), date(2000, 1, 1)).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidRange { .. }));
        let err = DateRange::new(date(0, 12, 31), date(2000, 1, 1)).unwrap_err();
        assert_eq!(err, CalendarError::OutOfRange(date(0, 12, 31)));
    }
}
