//! One full analysis pass over a buffer snapshot.
//!
//! green channel -> band filter -> adaptive peaks -> clean intervals ->
//! confidence. The pass is pure with respect to its input: the same snapshot
//! always yields the same [`Analysis`].

use crate::buffer::SignalSnapshot;
use crate::confidence::{ConfidenceScorer, Score};
use crate::config::ScanConfig;
use crate::coverage::{is_covered, CoverageEstimator};
use crate::dsp::BandpassFilter;
use crate::error::ScanError;
use crate::intervals::{hrv_metrics, IntervalSet, IntervalValidator};
use crate::peaks::PeakDetector;
use crate::types::{HeartRateResult, MAX_BPM, MIN_BPM};

/// Timestamp-derived rates outside this range are ignored in favour of the
/// configured nominal rate.
const PLAUSIBLE_RATE_HZ: (f32, f32) = (5.0, 240.0);

/// Everything one pass learned about the window.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub bpm: u32,
    pub score: Score,
    pub intervals: IntervalSet,
    pub peaks: Vec<usize>,
    pub coverage: f32,
    pub sample_rate: f32,
    pub sample_count: usize,
    pub timestamp_millis: u64,
}

impl Analysis {
    pub fn is_reportable(&self) -> bool {
        self.score.quality.is_reportable()
    }

    /// Package as a caller-facing result; below Fair is `LowConfidence`.
    pub fn into_result(self) -> Result<HeartRateResult, ScanError> {
        if !self.is_reportable() {
            return Err(ScanError::LowConfidence);
        }
        let hrv = hrv_metrics(&self.intervals.clean, self.sample_rate);
        Ok(HeartRateResult {
            bpm: self.bpm,
            confidence_percent: self.score.confidence_percent(),
            signal_to_noise_ratio: self.score.snr.snr_db,
            irregularity_percent: self.intervals.irregularity_percent,
            quality: self.score.quality,
            sample_count: self.sample_count as u32,
            timestamp_millis: self.timestamp_millis,
            coverage: self.coverage,
            hrv,
        })
    }
}

pub struct PulsePipeline {
    config: ScanConfig,
    coverage: CoverageEstimator,
    validator: IntervalValidator,
    scorer: ConfidenceScorer,
}

impl PulsePipeline {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            coverage: CoverageEstimator::with_config(config.coverage.clone()),
            validator: IntervalValidator::new(config.intervals.clone()),
            scorer: ConfidenceScorer::new(config.filter.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Sample rate to analyse `snapshot` at.
    pub fn sample_rate_for(&self, snapshot: &SignalSnapshot) -> f32 {
        snapshot
            .effective_sample_rate()
            .filter(|fs| fs.is_finite() && *fs >= PLAUSIBLE_RATE_HZ.0 && *fs <= PLAUSIBLE_RATE_HZ.1)
            .unwrap_or(self.config.sample_rate_hz)
    }

    /// Run the full pass. `min_samples` is the floor for this kind of pass
    /// (live display or final result).
    pub fn analyze(&mut self, snapshot: &SignalSnapshot, min_samples: usize) -> Result<Analysis, ScanError> {
        let coverage = self.coverage.coverage(snapshot.samples());
        if !is_covered(coverage) {
            return Err(ScanError::InsufficientCoverage);
        }
        if snapshot.len() < min_samples.max(5) {
            return Err(ScanError::InsufficientPeaks);
        }

        let fs = self.sample_rate_for(snapshot);
        let filtered = BandpassFilter::new(self.config.filter.clone(), fs).filter(&snapshot.green());
        let peaks = PeakDetector::new(self.config.peaks.clone(), fs).detect_peaks(&filtered);
        if peaks.len() < 3 {
            log::debug!("pass over {} samples found only {} peaks", snapshot.len(), peaks.len());
            return Err(ScanError::InsufficientPeaks);
        }

        let intervals = self.validator.validate(&peaks);
        if intervals.clean.len() < self.validator.min_clean_intervals() {
            log::debug!(
                "only {} of {} intervals survived outlier rejection",
                intervals.clean.len(),
                intervals.raw.len()
            );
            return Err(ScanError::InsufficientPeaks);
        }

        let mean_interval = intervals.mean_clean_interval();
        let bpm = (60.0 * fs / mean_interval).round();
        if !bpm.is_finite() || bpm < MIN_BPM as f32 || bpm > MAX_BPM as f32 {
            log::debug!("discarding implausible rate {:.1} BPM", bpm);
            return Err(ScanError::PhysiologicallyImplausible);
        }

        let score = self.scorer.score(&filtered, &intervals.clean, coverage, fs);
        log::debug!(
            "pass: {} samples @ {:.2} Hz, {} peaks, {} BPM, snr {:.1} dB, stability {:.2}, confidence {:.2} ({:?})",
            snapshot.len(),
            fs,
            peaks.len(),
            bpm,
            score.snr.snr_db,
            score.stability,
            score.confidence,
            score.quality
        );

        Ok(Analysis {
            bpm: bpm as u32,
            score,
            intervals,
            peaks,
            coverage,
            sample_rate: fs,
            sample_count: snapshot.len(),
            timestamp_millis: snapshot.last_timestamp().unwrap_or(0),
        })
    }
}
