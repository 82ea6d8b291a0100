use core::sync::atomic::{AtomicU32, Ordering};

/// Tally shared between the detector interrupt and the control loop. The only
/// concurrently-touched cell in the system.
///
/// The drain is a single atomic exchange: a pulse lands either in the old
/// window's tally or the new one, never in both and never in neither. There is
/// no wider critical section.
pub struct PulseAccumulator(AtomicU32);

impl PulseAccumulator {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Interrupt context. One bounded atomic increment, no blocking.
    #[inline]
    pub fn record_pulse(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Main context, once per window. Returns the tally and resets it to zero
    /// in the same exchange.
    pub fn drain(&self) -> u32 {
        self.0.swap(0, Ordering::AcqRel)
    }

    /// Non-destructive read, for diagnostics only.
    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for PulseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
