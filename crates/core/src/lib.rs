#![forbid(unsafe_code)]

pub mod calendar;
pub mod model;
pub mod random;
pub mod registry;
pub mod session;
pub mod time;
pub mod timer;

pub use random::{Entropy, RandomSource};
pub use time::Clock;
