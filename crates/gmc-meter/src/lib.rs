#![no_std]

mod ambient;
mod classify;
mod pulse;
mod rate;

pub use ambient::AmbientFilter;
pub use classify::classify;
pub use pulse::PulseAccumulator;
pub use rate::{RateCalculator, RateSample};
