use gmc_core::SeverityBand;
use gmc_health::HealthState;
use gmc_meter::RateSample;

/// The device's mutable facts in one place: owned by the kernel, mutated only
/// by the main loop, alive for the whole process.
#[derive(Debug, Clone, Copy)]
pub struct NodeState {
    pub rate: RateSample,
    pub band: SeverityBand,
    pub health: HealthState,
    /// Captured from the hardware register before any other initialization.
    pub reset_cause: u8,
    pub boot_ms: u64,
    pub windows_run: u64,
}

impl NodeState {
    pub fn new(boot_ms: u64, reset_cause: u8) -> Self {
        Self {
            rate: RateSample {
                cpm: 0,
                usv_h: 0.0,
                forced_zero: false,
            },
            band: SeverityBand::Low,
            health: HealthState::default(),
            reset_cause,
            boot_ms,
            windows_run: 0,
        }
    }

    pub fn uptime_s(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.boot_ms) / 1_000
    }
}
