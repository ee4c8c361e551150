//! Confidence model: SNR, rhythm stability and finger coverage.

use ndarray::Array1;

use crate::config::FilterConfig;
use crate::dsp::{SpectralAnalyzer, SpectralSnr};
use crate::dsp::stats;
use crate::types::QualityLabel;

const SNR_WEIGHT: f32 = 0.4;
const STABILITY_WEIGHT: f32 = 0.4;
const COVERAGE_WEIGHT: f32 = 0.2;

/// Map SNR [-5, 10] dB to [0, 1].
pub fn snr_term(snr_db: f32) -> f32 {
    if !snr_db.is_finite() {
        return 0.0;
    }
    ((snr_db + 5.0) / 15.0).clamp(0.0, 1.0)
}

/// `1 - CV`, floored at 0. Empty input is unstable.
pub fn stability(clean_intervals: &[f32]) -> f32 {
    if clean_intervals.is_empty() {
        return 0.0;
    }
    (1.0 - stats::coefficient_of_variation(clean_intervals)).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub snr: SpectralSnr,
    pub snr_term: f32,
    pub stability: f32,
    /// Weighted sum clamped to [0, 1].
    pub confidence: f32,
    pub quality: QualityLabel,
}

impl Score {
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

pub struct ConfidenceScorer {
    spectral: SpectralAnalyzer,
}

impl ConfidenceScorer {
    pub fn new(band: FilterConfig) -> Self {
        Self {
            spectral: SpectralAnalyzer::new(band),
        }
    }

    pub fn score(
        &mut self,
        filtered: &Array1<f32>,
        clean_intervals: &[f32],
        coverage: f32,
        sample_rate: f32,
    ) -> Score {
        let snr = self.spectral.snr(filtered, sample_rate);
        let snr_term = if snr.defined { snr_term(snr.snr_db) } else { 0.0 };
        let stability = stability(clean_intervals);
        let coverage = if coverage.is_finite() { coverage.clamp(0.0, 1.0) } else { 0.0 };

        let confidence = (SNR_WEIGHT * snr_term + STABILITY_WEIGHT * stability + COVERAGE_WEIGHT * coverage)
            .clamp(0.0, 1.0);

        Score {
            snr,
            snr_term,
            stability,
            confidence,
            quality: QualityLabel::from_confidence(confidence),
        }
    }
}
