//! Systolic peak detection with a locally adaptive threshold.
//!
//! The pulse amplitude drifts over a 10-15 s window as finger pressure and
//! exposure change, so each candidate is judged against the mean and spread
//! of its own neighbourhood rather than a single global level.

use ndarray::Array1;

use crate::config::PeakConfig;

#[derive(Debug, Clone)]
pub struct PeakDetector {
    config: PeakConfig,
    sample_rate: f32,
}

impl PeakDetector {
    pub fn new(config: PeakConfig, sample_rate: f32) -> Self {
        Self {
            config,
            sample_rate,
        }
    }

    /// Half-width of the local statistics window, in samples.
    pub fn half_window(&self) -> usize {
        let width = (self.config.window_secs * self.sample_rate).round().max(2.0) as usize;
        width / 2
    }

    /// Minimum index distance between accepted peaks.
    pub fn min_spacing(&self) -> usize {
        (self.config.min_spacing_secs * self.sample_rate).round().max(1.0) as usize
    }

    /// Indices of accepted peaks, strictly increasing.
    pub fn detect_peaks(&self, filtered: &Array1<f32>) -> Vec<usize> {
        let n = filtered.len();
        if n < 5 {
            return Vec::new();
        }

        let half = self.half_window();
        let min_spacing = self.min_spacing();
        let mut peaks = Vec::new();
        let mut last_peak: Option<usize> = None;

        for i in 2..n - 2 {
            let x = filtered[i];
            let is_local_max = x > filtered[i - 2]
                && x > filtered[i - 1]
                && x > filtered[i + 1]
                && x > filtered[i + 2];
            if !is_local_max {
                continue;
            }

            if let Some(lp) = last_peak {
                if i - lp < min_spacing {
                    continue;
                }
            }

            let lo = i.saturating_sub(half);
            let hi = (i + half).min(n - 1);
            let (mean, std) = local_stats(filtered, lo, hi);
            if x > mean + self.config.threshold_k * std {
                peaks.push(i);
                last_peak = Some(i);
            }
        }

        log::trace!("peak detection: {} peaks over {} samples", peaks.len(), n);
        peaks
    }
}

/// Mean and population std of `signal[lo..=hi]`.
fn local_stats(signal: &Array1<f32>, lo: usize, hi: usize) -> (f32, f32) {
    let count = (hi - lo + 1) as f32;
    let mut sum = 0.0f32;
    for i in lo..=hi {
        sum += signal[i];
    }
    let mean = sum / count;
    let mut var = 0.0f32;
    for i in lo..=hi {
        var += (signal[i] - mean).powi(2);
    }
    (mean, (var / count).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn detector() -> PeakDetector {
        PeakDetector::new(PeakConfig::default(), 30.0)
    }

    fn sine(freq: f32, n: usize) -> Array1<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / 30.0).sin())
            .collect()
    }

    #[test]
    fn test_window_geometry() {
        let d = detector();
        assert_eq!(d.half_window(), 6);
        assert_eq!(d.min_spacing(), 15);
    }

    #[test]
    fn test_regular_sine_peaks() {
        // 1.2 Hz at 30 Hz = one peak every 25 samples
        let peaks = detector().detect_peaks(&sine(1.2, 300));
        assert!(peaks.len() >= 11, "found {:?}", peaks);
        for w in peaks.windows(2) {
            assert_eq!(w[1] - w[0], 25);
        }
    }

    #[test]
    fn test_strictly_increasing_and_spaced() {
        let signal: Array1<f32> = (0..300)
            .map(|i| {
                let t = i as f32 / 30.0;
                (2.0 * PI * 1.0 * t).sin() + 0.3 * (2.0 * PI * 3.7 * t).sin()
            })
            .collect();
        let d = detector();
        let peaks = d.detect_peaks(&signal);
        for w in peaks.windows(2) {
            assert!(w[1] > w[0]);
            assert!(w[1] - w[0] >= d.min_spacing());
        }
    }

    #[test]
    fn test_amplitude_drift_tolerated() {
        // Amplitude grows 10x across the window; a global threshold would
        // miss the early beats.
        let signal: Array1<f32> = (0..450)
            .map(|i| {
                let gain = 0.2 + 1.8 * i as f32 / 450.0;
                gain * (2.0 * PI * 1.2 * i as f32 / 30.0).sin()
            })
            .collect();
        let peaks = detector().detect_peaks(&signal);
        assert!(peaks.len() >= 16, "found {}", peaks.len());
        assert!(peaks[0] < 30);
    }

    #[test]
    fn test_flat_signal_has_no_peaks() {
        assert!(detector().detect_peaks(&Array1::zeros(300)).is_empty());
        assert!(detector().detect_peaks(&Array1::from(vec![1.0, 2.0, 1.0])).is_empty());
    }
}
