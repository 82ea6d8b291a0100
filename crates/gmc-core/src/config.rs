//! Build-time knobs of the original firmware, lifted into one validated
//! structure constructed at startup and passed down by reference.

use alloc::string::String;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{GmcError, GmcResult};

/// Shared secret wrapper. Wiped from memory on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Secret(***)")
    }
}

/// Rate banding thresholds, events per minute.
#[derive(Debug, Clone, Copy)]
pub struct BandThresholds {
    pub normal_min: u32,
    pub normal_max: u32,
    pub warn: u32,
    pub danger: u32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            normal_min: 20,
            normal_max: 40,
            warn: 100,
            danger: 275,
        }
    }
}

/// Interior climate limits. The floor/ceiling pair is the plausible physical
/// envelope; readings outside it are discarded, not clamped.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLimits {
    pub temp_warn_c: f32,
    pub temp_crit_c: f32,
    pub rh_warn_pct: f32,
    pub temp_floor_c: f32,
    pub temp_ceil_c: f32,
}

impl Default for AmbientLimits {
    fn default() -> Self {
        Self {
            temp_warn_c: 40.0,
            temp_crit_c: 55.0,
            rh_warn_pct: 85.0,
            temp_floor_c: -40.0,
            temp_ceil_c: 85.0,
        }
    }
}

/// Address-acquisition retry discipline: a short burst at boot, then slow
/// periodic attempts while running degraded.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub immediate_retries: u32,
    pub retry_pause_ms: u32,
    pub slow_retry_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            immediate_retries: 3,
            retry_pause_ms: 2_000,
            slow_retry_ms: 600_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Submitter credentials for the public aggregation service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: Secret,
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub device_id: String,
    pub serial: String,
    pub secret: Secret,
    pub firmware: String,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub window_ms: u32,
    pub max_plausible_cpm: u32,
    pub usv_per_cpm: f32,
    pub bands: BandThresholds,
    pub ambient: AmbientLimits,
    pub staleness_ms: u32,
    pub fault_streak: u32,
    pub flash_period_ms: u32,
    pub response_wait_ms: u32,
    pub watchdog_ms: u32,
    pub retry: RetryPolicy,
    pub primary: Endpoint,
    pub primary_auth: Credentials,
    pub heartbeat: Endpoint,
    pub identity: Identity,
}

impl NodeConfig {
    /// Defaults for everything that is not endpoint or identity shaped.
    pub fn new(
        primary: Endpoint,
        primary_auth: Credentials,
        heartbeat: Endpoint,
        identity: Identity,
    ) -> Self {
        Self {
            window_ms: 60_000,
            max_plausible_cpm: 60_000,
            usv_per_cpm: 0.0057,
            bands: BandThresholds::default(),
            ambient: AmbientLimits::default(),
            staleness_ms: 900_000,
            fault_streak: 3,
            flash_period_ms: 500,
            response_wait_ms: 5_000,
            watchdog_ms: 8_000,
            retry: RetryPolicy::default(),
            primary,
            primary_auth,
            heartbeat,
            identity,
        }
    }

    /// Rejects nonsense instead of letting it compile away silently.
    pub fn check(&self) -> GmcResult<()> {
        if self.window_ms == 0 {
            return Err(GmcError::InvalidConfig("window_ms must be non-zero"));
        }
        // The per-minute multiplier is precomputed as an exact integer.
        if self.window_ms > 60_000 || 60_000 % self.window_ms != 0 {
            return Err(GmcError::InvalidConfig("window_ms must divide 60000"));
        }
        if self.bands.normal_min > self.bands.normal_max {
            return Err(GmcError::InvalidConfig("normal band is inverted"));
        }
        if self.bands.normal_max >= self.bands.warn {
            return Err(GmcError::InvalidConfig("warn must sit above normal_max"));
        }
        if self.bands.warn >= self.bands.danger {
            return Err(GmcError::InvalidConfig("danger must sit above warn"));
        }
        if self.max_plausible_cpm <= self.bands.danger {
            return Err(GmcError::InvalidConfig(
                "plausibility ceiling must sit above the danger band",
            ));
        }
        if !self.usv_per_cpm.is_finite() || self.usv_per_cpm < 0.0 {
            return Err(GmcError::InvalidConfig("usv_per_cpm must be finite and >= 0"));
        }
        if self.ambient.temp_floor_c >= self.ambient.temp_ceil_c {
            return Err(GmcError::InvalidConfig("ambient envelope is inverted"));
        }
        if self.ambient.temp_warn_c >= self.ambient.temp_crit_c {
            return Err(GmcError::InvalidConfig(
                "ambient critical must sit above ambient warn",
            ));
        }
        if self.fault_streak == 0 {
            return Err(GmcError::InvalidConfig("fault_streak must be >= 1"));
        }
        if self.flash_period_ms == 0 {
            return Err(GmcError::InvalidConfig("flash_period_ms must be non-zero"));
        }
        if self.staleness_ms == 0 {
            return Err(GmcError::InvalidConfig("staleness_ms must be non-zero"));
        }
        if self.response_wait_ms == 0 {
            return Err(GmcError::InvalidConfig("response_wait_ms must be non-zero"));
        }
        // A full legal response wait must never trip the watchdog on its own.
        if self.watchdog_ms <= self.response_wait_ms {
            return Err(GmcError::InvalidConfig(
                "watchdog_ms must exceed response_wait_ms",
            ));
        }
        if self.retry.immediate_retries == 0 {
            return Err(GmcError::InvalidConfig("immediate_retries must be >= 1"));
        }
        if self.retry.slow_retry_ms == 0 {
            return Err(GmcError::InvalidConfig("slow_retry_ms must be non-zero"));
        }
        if self.primary.host.is_empty() || self.heartbeat.host.is_empty() {
            return Err(GmcError::InvalidConfig("endpoint host is empty"));
        }
        if !self.primary.path.starts_with('/') || !self.heartbeat.path.starts_with('/') {
            return Err(GmcError::InvalidConfig("endpoint path must start with '/'"));
        }
        Ok(())
    }
}
