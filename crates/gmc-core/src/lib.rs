#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod config;

pub use config::{
    AmbientLimits, BandThresholds, Credentials, Endpoint, Identity, NodeConfig, RetryPolicy,
    Secret,
};

pub type GmcResult<T> = Result<T, GmcError>;

#[derive(Debug)]
pub enum GmcError {
    InvalidConfig(&'static str),
    LinkDown,
    LinkClosed,
    HalError,
}

impl core::fmt::Display for GmcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GmcError::InvalidConfig(why) => write!(f, "InvalidConfig: {}", why),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GmcError {}

/// Ordered radiation-rate classification. The derive order IS the severity
/// order: Low < Normal < Warn < Danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeverityBand {
    Low,
    Normal,
    Warn,
    Danger,
}

impl SeverityBand {
    /// Name as it appears in the heartbeat query string.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SeverityBand::Low => "LOW",
            SeverityBand::Normal => "NORM",
            SeverityBand::Warn => "WARN",
            SeverityBand::Danger => "DANGER",
        }
    }
}

impl core::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// Outcome of the most recent network attempt. Exactly one value is active at
/// a time; every attempt overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailReason {
    #[default]
    None,
    ConnectFailed,
    ResponseNotOk,
    AddressAcquisitionFailed,
}

impl FailReason {
    /// Name as it appears in the heartbeat query string.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FailReason::None => "NONE",
            FailReason::ConnectFailed => "CONNECT",
            FailReason::ResponseNotOk => "NO_OK",
            FailReason::AddressAcquisitionFailed => "DHCP",
        }
    }
}

impl core::fmt::Display for FailReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_order_tracks_severity() {
        assert!(SeverityBand::Low < SeverityBand::Normal);
        assert!(SeverityBand::Normal < SeverityBand::Warn);
        assert!(SeverityBand::Warn < SeverityBand::Danger);
    }

    #[test]
    fn wire_names_match_reporting_contract() {
        assert_eq!(SeverityBand::Normal.wire_name(), "NORM");
        assert_eq!(SeverityBand::Danger.wire_name(), "DANGER");
        assert_eq!(FailReason::ResponseNotOk.wire_name(), "NO_OK");
        assert_eq!(FailReason::AddressAcquisitionFailed.wire_name(), "DHCP");
    }
}
