//! Beat-to-beat interval validation.
//!
//! Converts a peak set to intervals, drops the ones that stray too far from
//! the median (missed or doubled beats, motion spikes) and measures how
//! irregular the remaining rhythm is.

use crate::config::IntervalConfig;
use crate::dsp::stats;
use crate::types::HrvMetrics;

/// Intervals in samples. `clean` is always a subsequence of `raw`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    pub raw: Vec<f32>,
    pub clean: Vec<f32>,
    /// Coefficient of variation of `clean`, as a 0-100 percentage.
    pub irregularity_percent: u32,
}

impl IntervalSet {
    pub fn mean_clean_interval(&self) -> f32 {
        stats::mean(&self.clean)
    }

    pub fn rejected(&self) -> usize {
        self.raw.len() - self.clean.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalValidator {
    config: IntervalConfig,
}

impl IntervalValidator {
    pub fn new(config: IntervalConfig) -> Self {
        Self { config }
    }

    pub fn min_clean_intervals(&self) -> usize {
        self.config.min_clean_intervals
    }

    /// Validate a strictly increasing peak set. Fewer than 3 peaks yields an
    /// empty set.
    pub fn validate(&self, peaks: &[usize]) -> IntervalSet {
        if peaks.len() < 3 {
            return IntervalSet::default();
        }

        let raw: Vec<f32> = peaks
            .windows(2)
            .map(|w| w[1].saturating_sub(w[0]) as f32)
            .collect();

        let median = stats::median(&raw);
        let tolerance = self.config.outlier_tolerance * median;
        let clean: Vec<f32> = raw
            .iter()
            .copied()
            .filter(|x| (x - median).abs() <= tolerance)
            .collect();

        let cv = stats::coefficient_of_variation(&clean);
        let irregularity_percent = (cv * 100.0).round().clamp(0.0, 100.0) as u32;

        IntervalSet {
            raw,
            clean,
            irregularity_percent,
        }
    }
}

/// SDNN and RMSSD of the clean intervals at `sample_rate` Hz.
///
/// Needs at least 3 intervals; returns `None` otherwise.
pub fn hrv_metrics(clean: &[f32], sample_rate: f32) -> Option<HrvMetrics> {
    if clean.len() < 3 || !sample_rate.is_finite() || sample_rate <= 0.0 {
        return None;
    }
    let ibi_ms: Vec<f32> = clean.iter().map(|x| x / sample_rate * 1000.0).collect();

    let mean_ibi_ms = stats::mean(&ibi_ms);
    let sdnn_ms = stats::std(&ibi_ms);

    let mut diffsq_sum = 0.0f32;
    for w in ibi_ms.windows(2) {
        let d = w[1] - w[0];
        diffsq_sum += d * d;
    }
    let rmssd_ms = (diffsq_sum / (ibi_ms.len() - 1) as f32).sqrt();

    Some(HrvMetrics {
        mean_ibi_ms,
        sdnn_ms,
        rmssd_ms,
    })
}
