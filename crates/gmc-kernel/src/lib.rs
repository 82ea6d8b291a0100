#![no_std]
extern crate alloc;
use alloc::boxed::Box;

use log::{debug, info, warn};

use gmc_core::{FailReason, GmcResult, NodeConfig};
use gmc_hal::{
    AddressControl, AmbientSensor, IndicatorPins, PlatformClock, StatusLink, Watchdog,
};
use gmc_health::{network_ok, ChannelLevels, HealthMonitor, HealthState, StatusLamp};
use gmc_meter::{classify, AmbientFilter, PulseAccumulator, RateCalculator};
use gmc_uplink::{Heartbeat, ReconnectSupervisor, UploadManager};

pub mod state;
pub use state::NodeState;

/// The platform, as the kernel sees it.
pub struct Platform {
    pub clock: Box<dyn PlatformClock>,
    pub watchdog: Box<dyn Watchdog>,
    pub link: Box<dyn StatusLink>,
    pub net: Box<dyn AddressControl>,
    pub ambient: Box<dyn AmbientSensor>,
    pub lamp: Box<dyn IndicatorPins>,
}

/// Single cooperative control loop. The only other context in the system is
/// the detector interrupt, and the only thing it shares with us is the pulse
/// accumulator.
pub struct GmcKernel {
    cfg: NodeConfig,
    hw: Platform,
    pulses: &'static PulseAccumulator,

    rate: RateCalculator,
    ambient: AmbientFilter,
    monitor: HealthMonitor,
    lamp: StatusLamp,
    uplink: UploadManager,
    reconnect: ReconnectSupervisor,

    state: NodeState,
    next_window_ms: u64,
}

impl GmcKernel {
    /// Validates the configuration and assembles the component machines.
    /// `reset_cause` must have been captured before any other initialization
    /// ran; the kernel only receives the value.
    pub fn new(
        cfg: NodeConfig,
        hw: Platform,
        pulses: &'static PulseAccumulator,
        reset_cause: u8,
    ) -> GmcResult<Self> {
        cfg.check()?;
        let now = hw.clock.now_ms();
        info!(
            ">>> [KERNEL] gmc node starting (reset cause {:#04x}, window {}ms)",
            reset_cause, cfg.window_ms
        );

        let rate = RateCalculator::new(cfg.window_ms, cfg.max_plausible_cpm, cfg.usv_per_cpm);
        let ambient = AmbientFilter::new(cfg.ambient);
        let monitor = HealthMonitor::new(cfg.fault_streak);
        let lamp = StatusLamp::new(cfg.flash_period_ms);
        let uplink = UploadManager::new(cfg.response_wait_ms);
        let reconnect = ReconnectSupervisor::new(cfg.retry);
        let next_window_ms = now + cfg.window_ms as u64;

        Ok(Self {
            cfg,
            hw,
            pulses,
            rate,
            ambient,
            monitor,
            lamp,
            uplink,
            reconnect,
            state: NodeState::new(now, reset_cause),
            next_window_ms,
        })
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn is_degraded(&self) -> bool {
        !self.reconnect.is_connected()
    }

    pub fn fail_reason(&self) -> FailReason {
        self.uplink.fail_reason()
    }

    /// Boot sequence: arm the watchdog, bring the network up with the bounded
    /// retry burst, light the lamp. Measurement starts either way; a dead
    /// network only degrades reporting.
    pub fn start(&mut self) {
        self.hw.watchdog.arm(self.cfg.watchdog_ms);
        if !self
            .reconnect
            .bring_up(&mut *self.hw.net, &mut *self.hw.watchdog, &*self.hw.clock)
        {
            self.uplink.note_address_lost();
        }
        let now = self.hw.clock.now_ms();
        self.refresh_health(now);
        // First light regardless of whether the level moved from its default.
        let out = self.lamp.set_level(self.state.health.level, now);
        apply(&mut *self.hw.lamp, out);
    }

    /// High-frequency pass. Flash phase and degraded-mode retry run here so
    /// they stay responsive regardless of the measurement cadence; a due
    /// window runs the full cycle. Returns true when a cycle ran.
    pub fn tick(&mut self) -> bool {
        self.hw.watchdog.feed();
        let now = self.hw.clock.now_ms();

        if let Some(out) = self.lamp.tick(now) {
            apply(&mut *self.hw.lamp, out);
        }

        if !self.reconnect.is_connected() && self.reconnect.poll(now, &mut *self.hw.net) {
            // Fresh recency so the staleness rule starts from the recovery,
            // not from the outage.
            self.uplink.note_address_recovered(now);
        }

        if now >= self.next_window_ms {
            self.run_cycle(now);
            // Fixed cadence; windows missed while blocked collapse instead of
            // queueing a burst.
            while self.next_window_ms <= now {
                self.next_window_ms += self.cfg.window_ms as u64;
            }
            self.hw.watchdog.feed();
            return true;
        }
        false
    }

    // One measurement window, in the fixed order: drain, rate, classify,
    // ambient, aggregate, indicator, uploads. Uploads block (bounded) and
    // never overlap the next drain.
    fn run_cycle(&mut self, now: u64) {
        let raw = self.pulses.drain();
        let sample = self.rate.compute(raw);
        if sample.forced_zero {
            warn!("[METER] implausible tally {} forced to zero", raw);
        }

        let band = classify(sample.cpm, &self.cfg.bands);
        self.monitor.observe_rate(sample.cpm);

        match self.hw.ambient.sample() {
            Ok(s) => {
                if !self.ambient.ingest(s) {
                    debug!("[METER] ambient sample rejected as implausible");
                }
            }
            Err(_) => debug!("[METER] ambient read failed; smoothed value kept"),
        }

        self.state.rate = sample;
        self.state.band = band;
        self.state.windows_run += 1;

        let health = self.refresh_health(now);
        info!(
            "[CYCLE] cpm={} ({:.3} uSv/h) band={} lvl={} streak={} fail={}",
            sample.cpm,
            sample.usv_h,
            band,
            health.level,
            self.monitor.zero_streak(),
            self.uplink.fail_reason()
        );

        if self.reconnect.is_connected() {
            self.uplink
                .send_primary(&mut *self.hw.link, &*self.hw.clock, &self.cfg, sample.cpm);
            self.hw.watchdog.feed();

            let hb = self.heartbeat_snapshot(self.hw.clock.now_ms());
            self.uplink
                .send_heartbeat(&mut *self.hw.link, &*self.hw.clock, &self.cfg, &hb);
            self.hw.watchdog.feed();
        } else {
            debug!("[UPLINK] degraded; reports skipped this window");
        }
    }

    // Re-evaluates the aggregate level and moves the lamp when it changes.
    fn refresh_health(&mut self, now: u64) -> HealthState {
        let net_ok = network_ok(
            now,
            self.uplink.last_success_ms(),
            self.cfg.staleness_ms,
            self.uplink.fail_reason(),
        );
        let health = self.monitor.assess(
            self.state.band,
            self.ambient.warn(),
            self.ambient.critical(),
            net_ok,
        );
        if health.level != self.state.health.level {
            info!(
                "[HEALTH] level {} -> {}",
                self.state.health.level, health.level
            );
            let out = self.lamp.set_level(health.level, now);
            apply(&mut *self.hw.lamp, out);
        }
        self.state.health = health;
        health
    }

    fn heartbeat_snapshot(&self, now: u64) -> Heartbeat {
        Heartbeat {
            uptime_s: self.state.uptime_s(now),
            cpm: self.state.rate.cpm,
            band: self.state.band,
            level: self.state.health.level,
            last_primary_status: self.uplink.last_primary_status(),
            temp_c: self.ambient.temperature_c(),
            rh_pct: self.ambient.humidity_pct(),
            zero_streak: self.monitor.zero_streak(),
            fail: self.uplink.fail_reason(),
            reset_cause: self.state.reset_cause,
        }
    }
}

fn apply(pins: &mut dyn IndicatorPins, out: ChannelLevels) {
    pins.set(out.red, out.green, out.blue);
}
