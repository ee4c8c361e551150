//! Spectral signal-to-noise estimate.
//!
//! Treats the dominant in-band spectral line (plus its Hamming main lobe) as
//! cardiac content and everything else inside the pulse band as noise.

use ndarray::Array1;
use num_complex::Complex32;
use rustfft::FftPlanner;
use std::f32::consts::PI;

use crate::config::FilterConfig;

/// Fewer samples than this give no usable frequency resolution.
pub const MIN_SNR_SAMPLES: usize = 60;

/// Bins on each side of the peak counted as signal (Hamming main lobe).
const MAIN_LOBE_BINS: usize = 2;

/// Reported when the band holds no measurable noise at all.
const MAX_SNR_DB: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralSnr {
    /// 10*log10(signal / noise); 0 when undefined.
    pub snr_db: f32,
    /// Frequency of the dominant in-band line (Hz).
    pub peak_hz: f32,
    pub signal_power: f32,
    pub noise_power: f32,
    /// False when the estimate fell back to 0 (too short, flat, no band).
    pub defined: bool,
}

impl SpectralSnr {
    const NONE: Self = Self {
        snr_db: 0.0,
        peak_hz: 0.0,
        signal_power: 0.0,
        noise_power: 0.0,
        defined: false,
    };
}

pub struct SpectralAnalyzer {
    band: FilterConfig,
    fft_planner: FftPlanner<f32>,
}

impl SpectralAnalyzer {
    pub fn new(band: FilterConfig) -> Self {
        Self {
            band,
            fft_planner: FftPlanner::new(),
        }
    }

    pub fn hamming_window(size: usize) -> Array1<f32> {
        if size < 2 {
            return Array1::ones(size);
        }
        (0..size)
            .map(|i| 0.54 - 0.46 * ((2.0 * PI * i as f32) / ((size - 1) as f32)).cos())
            .collect()
    }

    /// In-band SNR of `signal` sampled at `fs` Hz.
    pub fn snr(&mut self, signal: &Array1<f32>, fs: f32) -> SpectralSnr {
        let n = signal.len();
        if n < MIN_SNR_SAMPLES || !fs.is_finite() || fs <= 0.0 {
            return SpectralSnr::NONE;
        }

        let window = Self::hamming_window(n);
        let mut buffer: Vec<Complex32> = signal
            .iter()
            .zip(window.iter())
            .map(|(s, w)| Complex32::new(s * w, 0.0))
            .collect();
        let fft = self.fft_planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let half_n = n / 2;
        let bin_res = fs / n as f32;
        let min_bin = ((self.band.low_cutoff_hz / bin_res).ceil() as usize).max(1);
        let max_bin = ((self.band.high_cutoff_hz / bin_res).floor() as usize).min(half_n.saturating_sub(1));
        if min_bin >= max_bin {
            return SpectralSnr::NONE;
        }

        let power: Vec<f32> = buffer[..=max_bin].iter().map(|c| c.norm_sqr()).collect();

        let mut peak_bin = min_bin;
        for i in min_bin..=max_bin {
            if power[i] > power[peak_bin] {
                peak_bin = i;
            }
        }

        let lobe_lo = peak_bin.saturating_sub(MAIN_LOBE_BINS).max(min_bin);
        let lobe_hi = (peak_bin + MAIN_LOBE_BINS).min(max_bin);
        let total: f32 = power[min_bin..=max_bin].iter().sum();
        let signal_power: f32 = power[lobe_lo..=lobe_hi].iter().sum();
        let noise_power = total - signal_power;

        if !(signal_power > 0.0 && signal_power.is_finite()) {
            return SpectralSnr::NONE;
        }
        let snr_db = if noise_power > 0.0 {
            (10.0 * (signal_power / noise_power).log10()).min(MAX_SNR_DB)
        } else {
            MAX_SNR_DB
        };

        SpectralSnr {
            snr_db,
            peak_hz: peak_bin as f32 * bin_res,
            signal_power,
            noise_power,
            defined: true,
        }
    }
}
