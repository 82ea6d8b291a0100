#![no_std]
extern crate alloc;

mod http;
mod reconnect;
mod report;

pub use http::StatusLineParser;
pub use reconnect::{LinkState, ReconnectSupervisor};
pub use report::{build_request, heartbeat_query, is_success, primary_query, Heartbeat};

use gmc_core::{FailReason, GmcError, NodeConfig};
use gmc_hal::{PlatformClock, StatusLink};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// One of the designated success codes.
    Accepted(u16),
    /// Connected, but the endpoint said no.
    Rejected(u16),
    /// Connected, no parseable status line inside the wait bound.
    NoResponse,
    /// Transport never came up.
    LinkDown,
}

/// Sends the two per-window reports and keeps the recency bookkeeping the
/// health model reads. Only the primary report's outcome feeds the fault
/// model; the heartbeat is best-effort.
pub struct UploadManager {
    response_wait_ms: u32,
    last_primary_status: u16,
    last_success_ms: Option<u64>,
    fail_reason: FailReason,
}

impl UploadManager {
    pub fn new(response_wait_ms: u32) -> Self {
        Self {
            response_wait_ms,
            last_primary_status: 0,
            last_success_ms: None,
            fail_reason: FailReason::None,
        }
    }

    pub fn last_primary_status(&self) -> u16 {
        self.last_primary_status
    }

    pub fn last_success_ms(&self) -> Option<u64> {
        self.last_success_ms
    }

    pub fn fail_reason(&self) -> FailReason {
        self.fail_reason
    }

    /// Address loss outranks any single failed upload.
    pub fn note_address_lost(&mut self) {
        self.fail_reason = FailReason::AddressAcquisitionFailed;
    }

    /// A re-acquired address counts as the most recent network attempt and
    /// restarts the staleness clock.
    pub fn note_address_recovered(&mut self, now_ms: u64) {
        self.fail_reason = FailReason::None;
        self.last_success_ms = Some(now_ms);
    }

    pub fn send_primary(
        &mut self,
        link: &mut dyn StatusLink,
        clock: &dyn PlatformClock,
        cfg: &NodeConfig,
        cpm: u32,
    ) -> UploadOutcome {
        let query = report::primary_query(cfg, cpm);
        let code = match exchange(
            link,
            clock,
            &cfg.primary.host,
            cfg.primary.port,
            &query,
            self.response_wait_ms,
            false,
        ) {
            Ok(code) => code,
            Err(e) => {
                warn!("[UPLINK] primary transport failed: {}", e);
                self.last_primary_status = 0;
                self.fail_reason = FailReason::ConnectFailed;
                return UploadOutcome::LinkDown;
            }
        };

        self.last_primary_status = code;
        if report::is_success(code) {
            self.fail_reason = FailReason::None;
            self.last_success_ms = Some(clock.now_ms());
            debug!("[UPLINK] primary accepted ({})", code);
            UploadOutcome::Accepted(code)
        } else {
            self.fail_reason = FailReason::ResponseNotOk;
            if code == 0 {
                warn!("[UPLINK] primary: no response inside wait bound");
                UploadOutcome::NoResponse
            } else {
                warn!("[UPLINK] primary rejected ({})", code);
                UploadOutcome::Rejected(code)
            }
        }
    }

    /// Heartbeat outcome never touches the fail reason or recency.
    pub fn send_heartbeat(
        &mut self,
        link: &mut dyn StatusLink,
        clock: &dyn PlatformClock,
        cfg: &NodeConfig,
        hb: &Heartbeat,
    ) -> UploadOutcome {
        let query = report::heartbeat_query(cfg, hb);
        match exchange(
            link,
            clock,
            &cfg.heartbeat.host,
            cfg.heartbeat.port,
            &query,
            self.response_wait_ms,
            true,
        ) {
            Ok(code) if report::is_success(code) => UploadOutcome::Accepted(code),
            Ok(0) => UploadOutcome::NoResponse,
            Ok(code) => UploadOutcome::Rejected(code),
            Err(e) => {
                debug!("[UPLINK] heartbeat transport failed: {}", e);
                UploadOutcome::LinkDown
            }
        }
    }
}

// Polling cadence while the link has nothing for us yet.
const RECV_POLL_MS: u32 = 5;

/// One bounded GET exchange: connect, write the request, scan for a status
/// line until the wall-clock deadline, optionally drain the body, close.
/// Code 0 means nothing parseable arrived in time.
fn exchange(
    link: &mut dyn StatusLink,
    clock: &dyn PlatformClock,
    host: &str,
    port: u16,
    path_query: &str,
    wait_ms: u32,
    drain_body: bool,
) -> Result<u16, GmcError> {
    link.open(host, port)?;
    let request = report::build_request(host, path_query);
    let deadline = clock.now_ms() + wait_ms as u64;

    let mut sent = 0;
    let bytes = request.as_bytes();
    while sent < bytes.len() {
        match link.send(&bytes[sent..]) {
            Ok(n) => sent += n,
            Err(nb::Error::WouldBlock) => {
                if clock.now_ms() >= deadline {
                    link.close();
                    return Ok(0);
                }
                clock.pause_ms(RECV_POLL_MS);
            }
            Err(nb::Error::Other(e)) => {
                link.close();
                return Err(e);
            }
        }
    }

    let mut parser = StatusLineParser::new();
    let mut buf = [0u8; 256];
    let mut code = 0u16;
    loop {
        match link.recv(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if let Some(found) = parser.feed(&buf[..n]) {
                    code = found;
                    break;
                }
            }
            Err(nb::Error::WouldBlock) => {
                if clock.now_ms() >= deadline {
                    break;
                }
                clock.pause_ms(RECV_POLL_MS);
            }
            // A drop before the status line is indistinguishable from no
            // response.
            Err(nb::Error::Other(_)) => break,
        }
        if clock.now_ms() >= deadline {
            break;
        }
    }

    if drain_body && code != 0 {
        drain(link, clock, deadline, &mut buf);
    }

    link.close();
    Ok(code)
}

// Discard whatever body follows, inside the same bounded window.
fn drain(
    link: &mut dyn StatusLink,
    clock: &dyn PlatformClock,
    deadline: u64,
    buf: &mut [u8],
) {
    loop {
        match link.recv(buf) {
            Ok(0) => return,
            Ok(_) => {}
            Err(nb::Error::WouldBlock) => {
                if clock.now_ms() >= deadline {
                    return;
                }
                clock.pause_ms(RECV_POLL_MS);
            }
            Err(nb::Error::Other(_)) => return,
        }
        if clock.now_ms() >= deadline {
            return;
        }
    }
}
