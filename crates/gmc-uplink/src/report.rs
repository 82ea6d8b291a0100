//! Report assembly for the two upstream endpoints.

use alloc::string::String;
use core::fmt::Write;

use gmc_core::{FailReason, NodeConfig, SeverityBand};

/// The only primary-report codes that count as delivered.
pub const SUCCESS_CODES: [u16; 2] = [200, 204];

pub fn is_success(code: u16) -> bool {
    SUCCESS_CODES.contains(&code)
}

/// Everything the heartbeat carries, snapshotted by the kernel once per
/// window.
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    pub uptime_s: u64,
    pub cpm: u32,
    pub band: SeverityBand,
    pub level: u8,
    pub last_primary_status: u16,
    pub temp_c: Option<f32>,
    pub rh_pct: Option<f32>,
    pub zero_streak: u32,
    pub fail: FailReason,
    pub reset_cause: u8,
}

/// Minimal rate submission for the public aggregation service.
pub fn primary_query(cfg: &NodeConfig, cpm: u32) -> String {
    let mut q = String::new();
    let _ = write!(
        q,
        "{}?function=submit&user={}&password={}&value={}&unit=CPM",
        cfg.primary.path,
        cfg.primary_auth.user,
        cfg.primary_auth.password.reveal(),
        cpm
    );
    q
}

/// Full heartbeat query. Ambient fields are omitted while unknown, never sent
/// as zero.
pub fn heartbeat_query(cfg: &NodeConfig, hb: &Heartbeat) -> String {
    let mut q = String::new();
    let _ = write!(
        q,
        "{}?id={}&sn={}&key={}&fw={}&up={}&cpm={}&band={}&lvl={}&pst={}",
        cfg.heartbeat.path,
        cfg.identity.device_id,
        cfg.identity.serial,
        cfg.identity.secret.reveal(),
        cfg.identity.firmware,
        hb.uptime_s,
        hb.cpm,
        hb.band.wire_name(),
        hb.level,
        hb.last_primary_status
    );
    if let Some(t) = hb.temp_c {
        let _ = write!(q, "&t={:.1}", t);
    }
    if let Some(h) = hb.rh_pct {
        let _ = write!(q, "&h={}", (h + 0.5) as u32);
    }
    let _ = write!(
        q,
        "&streak={}&fail={}&rst={:02X}",
        hb.zero_streak,
        hb.fail.wire_name(),
        hb.reset_cause
    );
    q
}

pub fn build_request(host: &str, path_query: &str) -> String {
    let mut r = String::new();
    let _ = write!(
        r,
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: gmc-node\r\nConnection: close\r\n\r\n",
        path_query, host
    );
    r
}
