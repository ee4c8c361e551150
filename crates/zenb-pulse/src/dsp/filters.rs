//! Pulse band filter.
//!
//! Mean removal followed by a first-order high-pass (baseline drift) and a
//! first-order low-pass (sensor and compression noise). Cheap, causal, and
//! good enough for a finger-on-lens signal where the pulse dominates.

use ndarray::Array1;
use std::f32::consts::PI;

use crate::config::FilterConfig;

#[derive(Debug, Clone)]
pub struct BandpassFilter {
    config: FilterConfig,
    sample_rate: f32,
}

impl BandpassFilter {
    pub fn new(config: FilterConfig, sample_rate: f32) -> Self {
        Self {
            config,
            sample_rate,
        }
    }

    /// High-pass coefficient for `y[i] = a * (y[i-1] + x[i] - x[i-1])`.
    pub fn high_pass_alpha(&self) -> f32 {
        let rc = 1.0 / (2.0 * PI * self.config.low_cutoff_hz.max(0.01));
        let dt = 1.0 / self.sample_rate.max(1e-3);
        rc / (rc + dt)
    }

    /// Smoothing coefficient for `y[i] = a * y[i-1] + (1 - a) * x[i]`.
    pub fn low_pass_alpha(&self) -> f32 {
        let rc = 1.0 / (2.0 * PI * self.config.high_cutoff_hz.max(0.1));
        let dt = 1.0 / self.sample_rate.max(1e-3);
        rc / (rc + dt)
    }

    /// Filter a raw channel series. Output has the same length as the input.
    pub fn filter(&self, raw: &Array1<f32>) -> Array1<f32> {
        let mut filtered = detrend(&sanitize(raw)).to_vec();
        let n = filtered.len();
        if n < 2 {
            return Array1::from(filtered);
        }

        // High-pass
        let hp_alpha = self.high_pass_alpha();
        let mut hp_prev_in = filtered[0];
        let mut hp_prev_out = 0.0;
        filtered[0] = 0.0;
        for x in filtered.iter_mut().skip(1) {
            let hp_out = hp_alpha * (hp_prev_out + *x - hp_prev_in);
            hp_prev_in = *x;
            hp_prev_out = hp_out;
            *x = hp_out;
        }

        // Low-pass
        let lp_alpha = self.low_pass_alpha();
        let mut lp_prev = filtered[0];
        for x in filtered.iter_mut().skip(1) {
            let lp_out = lp_alpha * lp_prev + (1.0 - lp_alpha) * *x;
            lp_prev = lp_out;
            *x = lp_out;
        }

        Array1::from(filtered)
    }
}

/// Remove the series mean.
pub fn detrend(signal: &Array1<f32>) -> Array1<f32> {
    let mean = signal.mean().unwrap_or(0.0);
    signal.mapv(|x| x - mean)
}

/// Replace non-finite values with the mean of the finite ones.
fn sanitize(signal: &Array1<f32>) -> Array1<f32> {
    if signal.iter().all(|x| x.is_finite()) {
        return signal.clone();
    }
    let (sum, count) = signal
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0f32, 0usize), |(s, c), &x| (s + x, c + 1));
    let fill = if count > 0 { sum / count as f32 } else { 0.0 };
    signal.mapv(|x| if x.is_finite() { x } else { fill })
}
