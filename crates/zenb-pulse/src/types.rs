//! Core data types shared across the PPG pipeline.

use serde::{Deserialize, Serialize};

/// One color/brightness measurement of the region of interest.
///
/// Produced by the capture loop once per frame. Channel values are
/// nominally 0-255 but nothing here enforces it; out-of-range values
/// simply fail the coverage test downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub brightness: f32,
    pub timestamp_millis: u64,
}

impl Sample {
    pub fn new(red: f32, green: f32, blue: f32, brightness: f32, timestamp_millis: u64) -> Self {
        Self {
            red,
            green,
            blue,
            brightness,
            timestamp_millis,
        }
    }

    /// Build a sample whose brightness is the mean of the three channels.
    pub fn from_rgb(red: f32, green: f32, blue: f32, timestamp_millis: u64) -> Self {
        Self::new(red, green, blue, (red + green + blue) / 3.0, timestamp_millis)
    }
}

/// Quality verdict attached to every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityLabel {
    pub const EXCELLENT_MIN: f32 = 0.85;
    pub const GOOD_MIN: f32 = 0.75;
    pub const FAIR_MIN: f32 = 0.65;

    /// Map a confidence in [0, 1] to a label.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= Self::EXCELLENT_MIN {
            Self::Excellent
        } else if confidence >= Self::GOOD_MIN {
            Self::Good
        } else if confidence >= Self::FAIR_MIN {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Only Fair or better is ever surfaced to the caller.
    pub fn is_reportable(self) -> bool {
        self >= Self::Fair
    }
}

/// Time-domain heart-rate variability over the clean intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    pub mean_ibi_ms: f32,
    pub sdnn_ms: f32,
    pub rmssd_ms: f32,
}

/// Final output of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateResult {
    /// Always within [`MIN_BPM`, `MAX_BPM`].
    pub bpm: u32,
    pub confidence_percent: u32,
    /// In-band spectral SNR (dB).
    pub signal_to_noise_ratio: f32,
    pub irregularity_percent: u32,
    pub quality: QualityLabel,
    pub sample_count: u32,
    /// Timestamp of the newest sample that went into the analysis.
    pub timestamp_millis: u64,
    pub coverage: f32,
    pub hrv: Option<HrvMetrics>,
}

pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 200;

/// Whether a BPM value is physiologically plausible.
pub fn bpm_in_range(bpm: u32) -> bool {
    (MIN_BPM..=MAX_BPM).contains(&bpm)
}
