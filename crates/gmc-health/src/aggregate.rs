use gmc_core::{FailReason, SeverityBand};

/// Aggregated device severity plus the flags that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthState {
    /// 0 nominal .. 3 critical.
    pub level: u8,
    pub sensor_fault: bool,
    pub ambient_warn: bool,
    pub ambient_critical: bool,
    pub network_stale: bool,
}

/// Folds the per-window signals into one level. Owns the zero-rate streak
/// that stands in for "is the tube still attached".
pub struct HealthMonitor {
    zero_streak: u32,
    streak_limit: u32,
}

impl HealthMonitor {
    pub fn new(streak_limit: u32) -> Self {
        Self {
            zero_streak: 0,
            streak_limit,
        }
    }

    /// Feed one window's rate. Any zero window counts toward the streak; any
    /// non-zero window clears it on that same cycle.
    pub fn observe_rate(&mut self, cpm: u32) {
        if cpm == 0 {
            self.zero_streak = self.zero_streak.saturating_add(1);
        } else {
            self.zero_streak = 0;
        }
    }

    pub fn zero_streak(&self) -> u32 {
        self.zero_streak
    }

    pub fn sensor_fault(&self) -> bool {
        self.zero_streak >= self.streak_limit
    }

    /// Level is the maximum over independently triggered floors; no floor can
    /// lower what another raised.
    pub fn assess(
        &self,
        band: SeverityBand,
        ambient_warn: bool,
        ambient_critical: bool,
        network_ok: bool,
    ) -> HealthState {
        let sensor_fault = self.sensor_fault();

        let mut level = 0u8;
        if !network_ok {
            level = level.max(1);
        }
        if sensor_fault || ambient_warn || band == SeverityBand::Warn {
            level = level.max(2);
        }
        if ambient_critical || band == SeverityBand::Danger {
            level = level.max(3);
        }

        HealthState {
            level,
            sensor_fault,
            ambient_warn,
            ambient_critical,
            network_stale: !network_ok,
        }
    }
}

/// Reachability rule: the network counts as healthy only while the last
/// successful primary report is recent enough. Never-succeeded and
/// address-acquisition failure are both hard negatives.
pub fn network_ok(
    now_ms: u64,
    last_success_ms: Option<u64>,
    staleness_ms: u32,
    last_fail: FailReason,
) -> bool {
    if last_fail == FailReason::AddressAcquisitionFailed {
        return false;
    }
    match last_success_ms {
        Some(at) => now_ms.saturating_sub(at) <= staleness_ms as u64,
        None => false,
    }
}
