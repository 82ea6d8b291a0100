#![no_std]
#![forbid(unsafe_code)]

mod aggregate;
mod indicator;

pub use aggregate::{network_ok, HealthMonitor, HealthState};
pub use indicator::{ChannelLevels, LampMode, StatusLamp};
