use gmc_core::{AmbientLimits, BandThresholds, SeverityBand};
use gmc_hal::AmbientSample;
use gmc_meter::{classify, AmbientFilter, PulseAccumulator, RateCalculator};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn test_band_partition() {
    let bands = BandThresholds::default();

    // Every rate falls in exactly one band; spot-check the boundaries.
    assert_eq!(classify(0, &bands), SeverityBand::Low);
    assert_eq!(classify(19, &bands), SeverityBand::Low);
    assert_eq!(classify(20, &bands), SeverityBand::Normal);
    assert_eq!(classify(40, &bands), SeverityBand::Normal);
    assert_eq!(classify(99, &bands), SeverityBand::Low);
    assert_eq!(classify(100, &bands), SeverityBand::Warn);
    assert_eq!(classify(274, &bands), SeverityBand::Warn);
    assert_eq!(classify(275, &bands), SeverityBand::Danger);
    assert_eq!(classify(u32::MAX, &bands), SeverityBand::Danger);
}

#[test]
fn test_band_gap_is_low() {
    // The (normal_max, warn) gap maps to Low by contract, not Normal or Warn.
    let bands = BandThresholds::default();
    assert_eq!(classify(41, &bands), SeverityBand::Low);
    assert_eq!(classify(50, &bands), SeverityBand::Low);
}

#[test]
fn test_ceiling_forces_zero() {
    let rc = RateCalculator::new(60_000, 60_000, 0.0057);

    let ok = rc.compute(275);
    assert_eq!(ok.cpm, 275);
    assert!(!ok.forced_zero);
    assert!((ok.usv_h - 275.0 * 0.0057).abs() < 1e-4);

    let glitch = rc.compute(60_001);
    assert_eq!(glitch.cpm, 0, "implausible tally must read as zero");
    assert_eq!(glitch.usv_h, 0.0);
    assert!(glitch.forced_zero);
}

#[test]
fn test_sub_minute_window_scaling() {
    // 15s window -> x4 multiplier.
    let rc = RateCalculator::new(15_000, 60_000, 0.0057);
    assert_eq!(rc.compute(10).cpm, 40);
}

#[test]
fn test_accumulator_drain_is_exact() {
    let acc = PulseAccumulator::new();
    for _ in 0..42 {
        acc.record_pulse();
    }
    assert_eq!(acc.peek(), 42, "peek must not touch the tally");
    assert_eq!(acc.drain(), 42);
    assert_eq!(acc.drain(), 0, "drain must reset the tally");
}

#[test]
fn test_accumulator_loses_nothing_under_contention() {
    // A second thread plays the interrupt context while the main thread
    // drains mid-burst. Total across drains must equal total recorded.
    const PULSES: u32 = 200_000;
    let acc = Arc::new(PulseAccumulator::new());
    let stop = Arc::new(AtomicBool::new(false));

    let producer = {
        let acc = Arc::clone(&acc);
        std::thread::spawn(move || {
            for _ in 0..PULSES {
                acc.record_pulse();
            }
        })
    };

    let mut collected = 0u64;
    while !stop.load(Ordering::Relaxed) {
        collected += acc.drain() as u64;
        if producer.is_finished() {
            stop.store(true, Ordering::Relaxed);
        }
    }
    producer.join().unwrap();
    collected += acc.drain() as u64;

    assert_eq!(collected, PULSES as u64, "pulses lost or double-counted");
}

#[test]
fn test_ambient_rejects_implausible() {
    let mut f = AmbientFilter::new(AmbientLimits::default());
    assert_eq!(f.temperature_c(), None, "unknown before first valid read");

    assert!(!f.ingest(AmbientSample {
        temp_c: 180.0,
        rh_pct: 50.0
    }));
    assert_eq!(f.temperature_c(), None, "rejected sample must not seed state");

    assert!(f.ingest(AmbientSample {
        temp_c: 21.0,
        rh_pct: 40.0
    }));
    assert_eq!(f.temperature_c(), Some(21.0));

    // A later glitch leaves the smoothed value in place.
    assert!(!f.ingest(AmbientSample {
        temp_c: -100.0,
        rh_pct: 40.0
    }));
    assert_eq!(f.temperature_c(), Some(21.0));
}

#[test]
fn test_ambient_smoothing_and_flags() {
    let mut f = AmbientFilter::new(AmbientLimits::default());
    f.ingest(AmbientSample {
        temp_c: 20.0,
        rh_pct: 40.0,
    });
    f.ingest(AmbientSample {
        temp_c: 24.0,
        rh_pct: 40.0,
    });
    // Quarter weight: 20 + (24-20)/4 = 21.
    assert!((f.temperature_c().unwrap() - 21.0).abs() < 1e-5);
    assert!(!f.warn());

    let mut hot = AmbientFilter::new(AmbientLimits::default());
    hot.ingest(AmbientSample {
        temp_c: 60.0,
        rh_pct: 30.0,
    });
    assert!(hot.warn());
    assert!(hot.critical());

    let mut damp = AmbientFilter::new(AmbientLimits::default());
    damp.ingest(AmbientSample {
        temp_c: 20.0,
        rh_pct: 95.0,
    });
    assert!(damp.warn(), "high humidity alone must warn");
    assert!(!damp.critical());
}
