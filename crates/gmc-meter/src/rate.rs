/// One window's computed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Events per minute. Zero when the window was empty or the reading was
    /// forced down by the plausibility ceiling.
    pub cpm: u32,
    /// Informational dose rate, µSv/h. Logged, never branched on.
    pub usv_h: f32,
    /// True when the ceiling fired. Marks the anti-runaway clamp, not a real
    /// low reading.
    pub forced_zero: bool,
}

/// Converts a window's raw tally into a per-minute rate.
pub struct RateCalculator {
    per_minute: u32,
    ceiling_cpm: u32,
    usv_per_cpm: f32,
}

impl RateCalculator {
    /// `window_ms` must divide 60000 (enforced by config validation); the
    /// multiplier is computed once here.
    pub fn new(window_ms: u32, ceiling_cpm: u32, usv_per_cpm: f32) -> Self {
        Self {
            per_minute: 60_000 / window_ms,
            ceiling_cpm,
            usv_per_cpm,
        }
    }

    pub fn compute(&self, raw: u32) -> RateSample {
        let cpm = raw.saturating_mul(self.per_minute);
        if cpm > self.ceiling_cpm {
            // A tally this high is a glitching tube or a floating input, not
            // radiation. Force zero and let the fault streak see it.
            return RateSample {
                cpm: 0,
                usv_h: 0.0,
                forced_zero: true,
            };
        }
        RateSample {
            cpm,
            usv_h: cpm as f32 * self.usv_per_cpm,
            forced_zero: false,
        }
    }
}
