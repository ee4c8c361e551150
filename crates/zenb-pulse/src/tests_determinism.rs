//! Identical sample sequences must replay to bit-identical results.

use crate::buffer::SignalSnapshot;
use crate::config::ScanConfig;
use crate::controller::{ScanController, ScanObserver, ScanPhase};
use crate::error::ScanError;
use crate::pipeline::PulsePipeline;
use crate::tests_support::SyntheticPulse;
use crate::types::HeartRateResult;

#[derive(Default)]
struct Collect {
    realtime: Vec<(u32, u32)>,
    result: Option<HeartRateResult>,
    error: Option<ScanError>,
}

impl ScanObserver for Collect {
    fn on_realtime_estimate(&mut self, bpm: u32, coverage: f32) {
        self.realtime.push((bpm, coverage.to_bits()));
    }

    fn on_complete(&mut self, result: HeartRateResult) {
        self.result = Some(result);
    }

    fn on_failed(&mut self, error: ScanError) {
        self.error = Some(error);
    }
}

fn run_scan(pulse: &SyntheticPulse) -> Collect {
    let mut controller = ScanController::new(Collect::default());
    controller.start(ScanConfig::default()).unwrap();
    for s in pulse.samples(1800) {
        controller.push_sample(s);
    }
    assert!(controller.phase().is_terminal());
    controller.into_observer()
}

#[test]
fn test_independent_scans_are_bit_identical() {
    let pulse = SyntheticPulse {
        bpm: 84.0,
        seed: 1234,
        ..Default::default()
    };
    let a = run_scan(&pulse);
    let b = run_scan(&pulse);

    let (ra, rb) = (a.result.unwrap(), b.result.unwrap());
    assert_eq!(ra, rb);
    assert_eq!(ra.signal_to_noise_ratio.to_bits(), rb.signal_to_noise_ratio.to_bits());
    assert_eq!(ra.coverage.to_bits(), rb.coverage.to_bits());
    assert_eq!(a.realtime, b.realtime);
}

#[test]
fn test_pipeline_pass_is_pure() {
    let snapshot = SignalSnapshot::from_samples(SyntheticPulse::default().samples(450));
    let mut pipeline = PulsePipeline::new(ScanConfig::default());
    let first = pipeline.analyze(&snapshot, 300).unwrap();
    let second = pipeline.analyze(&snapshot, 300).unwrap();
    assert_eq!(first.peaks, second.peaks);
    assert_eq!(first.intervals, second.intervals);
    assert_eq!(first.score, second.score);

    let fresh = PulsePipeline::new(ScanConfig::default()).analyze(&snapshot, 300).unwrap();
    assert_eq!(first.score.confidence.to_bits(), fresh.score.confidence.to_bits());
}

#[test]
fn test_different_noise_still_terminates() {
    for seed in [1u64, 2, 3] {
        let pulse = SyntheticPulse {
            seed,
            ..Default::default()
        };
        let mut controller = ScanController::new(Collect::default());
        controller.start(ScanConfig::default()).unwrap();
        for s in pulse.samples(1800) {
            controller.push_sample(s);
        }
        assert_eq!(controller.phase(), ScanPhase::Complete, "seed {}", seed);
    }
}
