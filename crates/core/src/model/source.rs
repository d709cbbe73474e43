use chrono::Datelike;
use thiserror::Error;

use crate::calendar::{
    CalendarError, CalendarPolicy, DateRange, day_of_week, is_leap_year, sample_date,
    weekday_name,
};
use crate::model::Quiz;
use crate::random::{RandomSource, uniform_index, uniform_int};

/// Largest operand width whose product still fits in a `u64`.
pub const MAX_MULTIPLICATION_DIGITS: u32 = 9;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSourceError {
    #[error("quiz source {name:?} has no quizzes")]
    EmptyPool { name: String },

    #[error("quiz source has no overview record")]
    MissingOverview,

    #[error("multiplication operands need 1..={max} digits, got {digits}")]
    InvalidDigits { digits: u32, max: u32 },

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

/// Name and description shown when choosing what to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub name: String,
    pub description: String,
}

impl Overview {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

//
// ─── GENERATORS ────────────────────────────────────────────────────────────────
//

/// Fixed, non-empty pool of quizzes drawn with replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPool {
    quizzes: Vec<Quiz>,
}

impl StaticPool {
    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    #[must_use]
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    fn generate(&self, rng: &mut dyn RandomSource) -> Quiz {
        let index = uniform_index(rng, self.quizzes.len());
        self.quizzes[index].clone()
    }
}

/// "Which day of the week is this date?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarQuiz {
    pub policy: CalendarPolicy,
    pub range: DateRange,
}

impl CalendarQuiz {
    fn generate(&self, rng: &mut dyn RandomSource) -> Result<Quiz, QuizSourceError> {
        let date = sample_date(rng, self.range, self.policy)?;
        let weekday = day_of_week(date, self.policy)?;
        let full = weekday_name(weekday);
        let short = &full[..3];
        let answers = [
            full.to_owned(),
            full.to_lowercase(),
            short.to_owned(),
            short.to_lowercase(),
        ];
        let explanation = if is_leap_year(date.year(), self.policy) {
            format!("{} is a leap year.", date.year())
        } else {
            String::new()
        };
        Ok(Quiz::new(date.format("%Y-%m-%d").to_string(), answers, explanation))
    }
}

/// Product of two random `digits`-wide operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplicationQuiz {
    digits: u32,
}

impl MultiplicationQuiz {
    /// # Errors
    ///
    /// Returns `QuizSourceError::InvalidDigits` unless `1 <= digits <= 9`.
    pub fn new(digits: u32) -> Result<Self, QuizSourceError> {
        if !(1..=MAX_MULTIPLICATION_DIGITS).contains(&digits) {
            return Err(QuizSourceError::InvalidDigits {
                digits,
                max: MAX_MULTIPLICATION_DIGITS,
            });
        }
        Ok(Self { digits })
    }

    #[must_use]
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Inclusive operand bounds: `[2, 10^digits - 1]`.
    #[must_use]
    pub fn operand_range(&self) -> (i64, i64) {
        (2, 10_i64.pow(self.digits) - 1)
    }

    fn generate(&self, rng: &mut dyn RandomSource) -> Quiz {
        let (low, high) = self.operand_range();
        let left = uniform_int(rng, low, high);
        let right = uniform_int(rng, low, high);
        let product = left * right;
        Quiz::new(format!("{left} × {right} = ?"), [product.to_string()], "")
    }
}

/// The closed set of quiz generator kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generator {
    Static(StaticPool),
    Calendar(CalendarQuiz),
    Multiplication(MultiplicationQuiz),
}

//
// ─── QUIZ SOURCE ───────────────────────────────────────────────────────────────
//

/// A named provider of quizzes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSource {
    overview: Overview,
    generator: Generator,
}

impl QuizSource {
    /// Build a static source from a loaded quiz bank.
    ///
    /// # Errors
    ///
    /// Returns `QuizSourceError::MissingOverview` without an overview record and
    /// `QuizSourceError::EmptyPool` when `quizzes` is empty.
    pub fn from_pool(overview: Option<Overview>, quizzes: Vec<Quiz>) -> Result<Self, QuizSourceError> {
        let overview = overview.ok_or(QuizSourceError::MissingOverview)?;
        if quizzes.is_empty() {
            return Err(QuizSourceError::EmptyPool {
                name: overview.name,
            });
        }
        Ok(Self {
            overview,
            generator: Generator::Static(StaticPool { quizzes }),
        })
    }

    #[must_use]
    pub fn calendar(overview: Overview, policy: CalendarPolicy, range: DateRange) -> Self {
        Self {
            overview,
            generator: Generator::Calendar(CalendarQuiz { policy, range }),
        }
    }

    /// # Errors
    ///
    /// Returns `QuizSourceError::InvalidDigits` for an unsupported operand width.
    pub fn multiplication(overview: Overview, digits: u32) -> Result<Self, QuizSourceError> {
        Ok(Self {
            overview,
            generator: Generator::Multiplication(MultiplicationQuiz::new(digits)?),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.overview.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.overview.description
    }

    #[must_use]
    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    #[must_use]
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Produce the next quiz. Dynamic generators draw fresh values on every call.
    ///
    /// # Errors
    ///
    /// Returns `QuizSourceError::Calendar` if the calendar generator cannot produce a
    /// valid date.
    pub fn generate_quiz(&self, rng: &mut dyn RandomSource) -> Result<Quiz, QuizSourceError> {
        match &self.generator {
            Generator::Static(pool) => Ok(pool.generate(rng)),
            Generator::Calendar(calendar) => calendar.generate(rng),
            Generator::Multiplication(multiplication) => Ok(multiplication.generate(rng)),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
