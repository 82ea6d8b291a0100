//! Host implementations of the platform traits, so the node runs unattended
//! on a workstation with a simulated detector tube.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use colored::Colorize;
use log::{info, warn};
use rand::Rng;

use gmc_core::{GmcError, GmcResult};
use gmc_hal::{
    reset, AddressControl, AmbientSample, AmbientSensor, BootInfo, IndicatorPins, PlatformClock,
    StatusLink, Watchdog,
};
use gmc_meter::PulseAccumulator;

/// Plain TCP client stream. Reads are non-blocking; orderly EOF maps to
/// `LinkClosed` per the trait contract.
pub struct TcpLink {
    stream: Option<TcpStream>,
    connect_timeout_ms: u32,
}

impl TcpLink {
    pub fn new(connect_timeout_ms: u32) -> Self {
        Self {
            stream: None,
            connect_timeout_ms,
        }
    }
}

impl StatusLink for TcpLink {
    fn open(&mut self, host: &str, port: u16) -> GmcResult<()> {
        self.stream = None;
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|_| GmcError::LinkDown)?;
        let timeout = Duration::from_millis(self.connect_timeout_ms as u64);
        for addr in addrs {
            if let Ok(stream) = TcpStream::connect_timeout(&addr, timeout) {
                let _ = stream.set_nodelay(true);
                stream.set_nonblocking(true).map_err(|_| GmcError::LinkDown)?;
                self.stream = Some(stream);
                return Ok(());
            }
        }
        Err(GmcError::LinkDown)
    }

    fn send(&mut self, bytes: &[u8]) -> nb::Result<usize, GmcError> {
        let stream = match self.stream.as_mut() {
            Some(s) => s,
            None => return Err(nb::Error::Other(GmcError::LinkClosed)),
        };
        match stream.write(bytes) {
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => Err(nb::Error::WouldBlock),
            Err(_) => Err(nb::Error::Other(GmcError::LinkDown)),
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> nb::Result<usize, GmcError> {
        let stream = match self.stream.as_mut() {
            Some(s) => s,
            None => return Err(nb::Error::Other(GmcError::LinkClosed)),
        };
        match stream.read(buf) {
            Ok(0) => Err(nb::Error::Other(GmcError::LinkClosed)),
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => Err(nb::Error::WouldBlock),
            Err(_) => Err(nb::Error::Other(GmcError::LinkClosed)),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

pub struct HostClock(Instant);

impl HostClock {
    pub fn new() -> Self {
        Self(Instant::now())
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformClock for HostClock {
    fn now_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
    fn pause_ms(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Stand-in for the hardware watchdog: it cannot reset the host, so it logs
/// the gaps that would have.
pub struct SoftWatchdog {
    timeout_ms: u32,
    last_feed: Instant,
    armed: bool,
}

impl SoftWatchdog {
    pub fn new() -> Self {
        Self {
            timeout_ms: 0,
            last_feed: Instant::now(),
            armed: false,
        }
    }
}

impl Default for SoftWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog for SoftWatchdog {
    fn arm(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms;
        self.armed = true;
        self.last_feed = Instant::now();
    }

    fn feed(&mut self) {
        if self.armed {
            let gap = self.last_feed.elapsed().as_millis() as u64;
            if gap >= self.timeout_ms as u64 {
                warn!("[WD] starved for {}ms; hardware would have reset", gap);
            }
        }
        self.last_feed = Instant::now();
    }

    fn disable(&mut self) {
        self.armed = false;
    }
}

/// Renders the three channels as a coloured swatch, once per change.
pub struct ConsoleLamp {
    last: Option<(bool, bool, bool)>,
}

impl ConsoleLamp {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for ConsoleLamp {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPins for ConsoleLamp {
    fn set(&mut self, red: bool, green: bool, blue: bool) {
        if self.last == Some((red, green, blue)) {
            return;
        }
        self.last = Some((red, green, blue));
        let swatch = match (red, green, blue) {
            (true, true, false) => "● YELLOW".yellow().bold(),
            (true, false, false) => "● RED".red().bold(),
            (false, true, false) => "● GREEN".green(),
            (false, false, true) => "● BLUE".blue(),
            (false, false, false) => "○ off".dimmed(),
            _ => "● WHITE".white(),
        };
        info!("[LAMP] {}", swatch);
    }
}

/// The host OS already holds an address; acquisition is a no-op success.
pub struct HostNet;

impl AddressControl for HostNet {
    fn acquire(&mut self) -> GmcResult<()> {
        Ok(())
    }
}

/// Slow-wandering plausible interior climate.
pub struct HostAmbient {
    temp_c: f32,
    rh_pct: f32,
}

impl HostAmbient {
    pub fn new(temp_c: f32, rh_pct: f32) -> Self {
        Self { temp_c, rh_pct }
    }
}

impl AmbientSensor for HostAmbient {
    fn sample(&mut self) -> GmcResult<AmbientSample> {
        let mut rng = rand::thread_rng();
        self.temp_c = (self.temp_c + rng.gen_range(-0.2..0.2)).clamp(-10.0, 60.0);
        self.rh_pct = (self.rh_pct + rng.gen_range(-0.5..0.5)).clamp(5.0, 99.0);
        Ok(AmbientSample {
            temp_c: self.temp_c,
            rh_pct: self.rh_pct,
        })
    }
}

pub struct HostBoot;

impl BootInfo for HostBoot {
    fn reset_cause(&mut self) -> u8 {
        // A fresh process is a power-on as far as the report is concerned.
        reset::POWER_ON
    }
}

/// Background thread playing the detector interrupt: pulses at `mean_cpm`
/// with uniform jitter, driving the shared accumulator exactly the way the
/// ISR would.
pub fn spawn_sim_tube(pulses: &'static PulseAccumulator, mean_cpm: u32) {
    let mean_cpm = mean_cpm.max(1);
    info!("[TUBE] simulated detector at ~{} cpm", mean_cpm);
    std::thread::spawn(move || {
        let period_ms = 60_000.0 / mean_cpm as f64;
        loop {
            let jitter = rand::thread_rng().gen_range(0.5..1.5);
            std::thread::sleep(Duration::from_millis((period_ms * jitter) as u64));
            pulses.record_pulse();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_tube_feeds_the_accumulator() {
        let acc: &'static PulseAccumulator = Box::leak(Box::new(PulseAccumulator::new()));
        // 60000 cpm -> one pulse every ~1ms; a generous wait avoids flaking.
        spawn_sim_tube(acc, 60_000);
        std::thread::sleep(Duration::from_millis(300));
        assert!(acc.drain() > 0, "tube produced no pulses");
    }

    #[test]
    fn host_clock_is_monotonic() {
        let clock = HostClock::new();
        let a = clock.now_ms();
        clock.pause_ms(15);
        let b = clock.now_ms();
        assert!(b >= a + 10);
    }

    #[test]
    fn ambient_stays_plausible() {
        let mut amb = HostAmbient::new(21.5, 40.0);
        for _ in 0..500 {
            let s = amb.sample().unwrap();
            assert!((-40.0..=85.0).contains(&s.temp_c));
            assert!((0.0..=100.0).contains(&s.rh_pct));
        }
    }
}
