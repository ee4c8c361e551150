use proptest::prelude::*;

use crate::buffer::{SignalBuffer, SignalSnapshot};
use crate::config::{IntervalConfig, ScanConfig};
use crate::coverage::{is_covered, CoverageEstimator};
use crate::intervals::IntervalValidator;
use crate::pipeline::PulsePipeline;
use crate::tests_support::SyntheticPulse;
use crate::types::{bpm_in_range, Sample};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn buffer_keeps_exactly_capacity_newest(capacity in 1usize..120, pushed in 0usize..600) {
        let mut buffer = SignalBuffer::new(capacity);
        for i in 0..pushed {
            buffer.add_sample(Sample::from_rgb(i as f32, 0.0, 0.0, i as u64));
        }
        prop_assert_eq!(buffer.len(), pushed.min(capacity));

        let snap = buffer.snapshot();
        let first_kept = pushed.saturating_sub(capacity);
        for (k, s) in snap.samples().iter().enumerate() {
            prop_assert_eq!(s.red, (first_kept + k) as f32);
        }
    }

    #[test]
    fn clean_intervals_subset_of_raw(gaps in prop::collection::vec(5usize..80, 2..40)) {
        let mut peaks = vec![0usize];
        for g in &gaps {
            let next = peaks[peaks.len() - 1] + g;
            peaks.push(next);
        }
        let set = IntervalValidator::new(IntervalConfig::default()).validate(&peaks);
        prop_assert_eq!(set.raw.len(), gaps.len());
        let mut raw_iter = set.raw.iter();
        for c in &set.clean {
            prop_assert!(raw_iter.any(|r| r == c), "clean is not a subsequence of raw");
        }
        prop_assert!(set.irregularity_percent <= 100);
    }

    #[test]
    fn coverage_is_a_fraction(channels in prop::collection::vec((-10.0f32..400.0, -10.0f32..400.0, -10.0f32..400.0), 0..80)) {
        let samples: Vec<Sample> = channels
            .iter()
            .enumerate()
            .map(|(i, (r, g, b))| Sample::from_rgb(*r, *g, *b, i as u64))
            .collect();
        let c = CoverageEstimator::new().coverage(&samples);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn reported_bpm_always_in_range(bpm in 20.0f32..260.0, seed in 0u64..1000) {
        let pulse = SyntheticPulse { bpm, seed, ..Default::default() };
        let snapshot = SignalSnapshot::from_samples(pulse.samples(450));
        let mut pipeline = PulsePipeline::new(ScanConfig::default());
        if let Ok(analysis) = pipeline.analyze(&snapshot, 300) {
            prop_assert!(bpm_in_range(analysis.bpm));
            prop_assert!(is_covered(analysis.coverage));
            if let Ok(result) = analysis.into_result() {
                prop_assert!(bpm_in_range(result.bpm));
                prop_assert!(result.confidence_percent <= 100);
                prop_assert!(result.quality.is_reportable());
            }
        }
    }
}
