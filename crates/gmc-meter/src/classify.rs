use gmc_core::{BandThresholds, SeverityBand};

/// Bands a rate. Total over all of u32, checked in severity order.
///
/// Rates strictly between `normal_max` and `warn` are Low: the gap is part of
/// the banding contract and is not rounded up.
pub fn classify(cpm: u32, bands: &BandThresholds) -> SeverityBand {
    if cpm >= bands.danger {
        SeverityBand::Danger
    } else if cpm >= bands.warn {
        SeverityBand::Warn
    } else if cpm >= bands.normal_min && cpm <= bands.normal_max {
        SeverityBand::Normal
    } else {
        SeverityBand::Low
    }
}
