use gmc_core::RetryPolicy;
use gmc_hal::{AddressControl, PlatformClock, Watchdog};
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Reconnecting,
}

/// Address-acquisition supervisor: a bounded burst of immediate retries at
/// boot, then slow periodic attempts while the node runs degraded. Upload
/// failures never land here; only losing the address itself does.
pub struct ReconnectSupervisor {
    policy: RetryPolicy,
    state: LinkState,
    next_retry_ms: u64,
}

impl ReconnectSupervisor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: LinkState::Reconnecting,
            next_retry_ms: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Boot bring-up. Returns true once an address is held; false means the
    /// node enters degraded operation with the slow retry scheduled.
    pub fn bring_up(
        &mut self,
        net: &mut dyn AddressControl,
        wd: &mut dyn Watchdog,
        clock: &dyn PlatformClock,
    ) -> bool {
        let attempts = self.policy.immediate_retries;
        for attempt in 1..=attempts {
            if net.acquire().is_ok() {
                self.state = LinkState::Connected;
                info!("[NET] address acquired (attempt {}/{})", attempt, attempts);
                return true;
            }
            warn!("[NET] address acquisition failed (attempt {}/{})", attempt, attempts);
            if attempt < attempts {
                guarded_pause(wd, clock, self.policy.retry_pause_ms);
            }
        }

        self.state = LinkState::Reconnecting;
        self.next_retry_ms = clock.now_ms() + self.policy.slow_retry_ms as u64;
        warn!(
            "[NET] running degraded; next attempt in {}s",
            self.policy.slow_retry_ms / 1_000
        );
        false
    }

    /// Degraded-mode pass. A cheap no-op until the slow retry is due; returns
    /// true on the tick that re-acquires the address.
    pub fn poll(&mut self, now_ms: u64, net: &mut dyn AddressControl) -> bool {
        if self.state == LinkState::Connected || now_ms < self.next_retry_ms {
            return false;
        }
        if net.acquire().is_ok() {
            self.state = LinkState::Connected;
            info!("[NET] address re-acquired");
            true
        } else {
            self.next_retry_ms = now_ms + self.policy.slow_retry_ms as u64;
            false
        }
    }
}

// Pause in slices, feeding the watchdog well inside its window so the retry
// burst can never be mistaken for a hang.
fn guarded_pause(wd: &mut dyn Watchdog, clock: &dyn PlatformClock, total_ms: u32) {
    const SLICE_MS: u32 = 250;
    let mut left = total_ms;
    while left > 0 {
        wd.feed();
        let step = left.min(SLICE_MS);
        clock.pause_ms(step);
        left -= step;
    }
    wd.feed();
}
