use gmc_core::AmbientLimits;
use gmc_hal::AmbientSample;

// Relative humidity is physically bounded; the envelope is not configurable.
const RH_FLOOR: f32 = 0.0;
const RH_CEIL: f32 = 100.0;

/// Smoothed interior climate. Unknown until the first valid sample; samples
/// outside the plausible envelope are discarded, never zeroed, so a dying
/// sensor leaves the last good smoothed value in place.
pub struct AmbientFilter {
    limits: AmbientLimits,
    temp_c: Option<f32>,
    rh_pct: Option<f32>,
}

impl AmbientFilter {
    pub fn new(limits: AmbientLimits) -> Self {
        Self {
            limits,
            temp_c: None,
            rh_pct: None,
        }
    }

    /// Folds one sample in at quarter weight. Returns whether it was accepted.
    pub fn ingest(&mut self, sample: AmbientSample) -> bool {
        let temp_ok = sample.temp_c.is_finite()
            && sample.temp_c >= self.limits.temp_floor_c
            && sample.temp_c <= self.limits.temp_ceil_c;
        let rh_ok =
            sample.rh_pct.is_finite() && sample.rh_pct >= RH_FLOOR && sample.rh_pct <= RH_CEIL;
        if !temp_ok || !rh_ok {
            return false;
        }
        self.temp_c = Some(smooth(self.temp_c, sample.temp_c));
        self.rh_pct = Some(smooth(self.rh_pct, sample.rh_pct));
        true
    }

    pub fn temperature_c(&self) -> Option<f32> {
        self.temp_c
    }

    pub fn humidity_pct(&self) -> Option<f32> {
        self.rh_pct
    }

    /// Warm or humid enough to flag. Unknown readings flag nothing.
    pub fn warn(&self) -> bool {
        let hot = self.temp_c.map_or(false, |t| t >= self.limits.temp_warn_c);
        let damp = self.rh_pct.map_or(false, |h| h >= self.limits.rh_warn_pct);
        hot || damp
    }

    pub fn critical(&self) -> bool {
        self.temp_c.map_or(false, |t| t >= self.limits.temp_crit_c)
    }
}

fn smooth(prev: Option<f32>, sample: f32) -> f32 {
    match prev {
        Some(p) => p + (sample - p) * 0.25,
        None => sample,
    }
}
