//! Injectable randomness.
//!
//! Every draw in the engine goes through [`RandomSource::next_f64`], a float in `[0, 1)`.
//! Integer and index draws are derived from it so a scripted source can steer
//! generators precisely in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform floats in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;
}

/// Draws from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible draws from a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays a fixed list of floats, wrapping around when exhausted.
///
/// Values are clamped into `[0, 1)`; an empty script always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Cloneable recipe for the random source handed to each new session.
#[derive(Debug, Clone, Default)]
pub enum Entropy {
    #[default]
    Thread,
    Seeded(u64),
    Scripted(Vec<f64>),
}

impl Entropy {
    #[must_use]
    pub fn source(&self) -> Box<dyn RandomSource> {
        match self {
            Entropy::Thread => Box::new(ThreadRandom),
            Entropy::Seeded(seed) => Box::new(SeededRandom::new(*seed)),
            Entropy::Scripted(values) => Box::new(ScriptedRandom::new(values.clone())),
        }
    }
}

/// Uniform integer in the inclusive range `[low, high]`.
///
/// Returns `low` when the range is empty or inverted.
pub fn uniform_int(rng: &mut dyn RandomSource, low: i64, high: i64) -> i64 {
    if high <= low {
        return low;
    }
    #[allow(clippy::cast_precision_loss)]
    let span = (high - low + 1) as f64;
    #[allow(clippy::cast_possible_truncation)]
    let offset = (rng.next_f64() * span).floor() as i64;
    (low + offset).min(high)
}

/// Uniform index into a collection of `len` elements. `len` must be non-zero.
pub fn uniform_index(rng: &mut dyn RandomSource, len: usize) -> usize {
    #[allow(clippy::cast_precision_loss)]
    let scaled = rng.next_f64() * len as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = scaled.floor() as usize;
    index.min(len.saturating_sub(1))
}
