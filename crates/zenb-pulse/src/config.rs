//! Scan configuration.
//!
//! All sections default to the canonical engine values, so an empty TOML
//! document (or `ScanConfig::default()`) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Nominal capture rate; used when sample timestamps cannot be trusted.
    pub sample_rate_hz: f32,
    /// Rolling window length in samples (450 = 15 s at 30 Hz).
    pub buffer_capacity: usize,
    /// Samples required before a final result may be produced.
    pub min_samples: usize,
    /// Samples required before a live estimate is attempted.
    pub realtime_min_samples: usize,
    /// Target scan duration on the sample clock.
    pub scan_duration_ms: u64,
    /// Minimum spacing between two analysis passes.
    pub analysis_interval_ms: u64,
    /// Failed final passes tolerated before the scan fails.
    pub max_retries: u32,
    /// How much longer to collect after a failed final pass.
    pub retry_extension_ms: u64,
    /// Finish early once the window is full and a live pass reached Fair.
    pub complete_on_saturation: bool,
    pub coverage: CoverageConfig,
    pub filter: FilterConfig,
    pub peaks: PeakConfig,
    pub intervals: IntervalConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 30.0,
            buffer_capacity: 450,
            min_samples: 300,
            realtime_min_samples: 90,
            scan_duration_ms: 60_000,
            analysis_interval_ms: 250,
            max_retries: 3,
            retry_extension_ms: 10_000,
            complete_on_saturation: true,
            coverage: CoverageConfig::default(),
            filter: FilterConfig::default(),
            peaks: PeakConfig::default(),
            intervals: IntervalConfig::default(),
        }
    }
}

/// Finger-placement heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Number of most recent samples inspected (~1 s).
    pub window: usize,
    pub min_brightness: f32,
    pub max_brightness: f32,
    /// Red must exceed this to rule out underexposed frames.
    pub min_red: f32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            window: 30,
            min_brightness: 60.0,
            max_brightness: 230.0,
            min_red: 100.0,
        }
    }
}

/// Band limits for the pulse filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// High-pass corner (0.7 Hz = 42 BPM).
    pub low_cutoff_hz: f32,
    /// Low-pass corner (4.0 Hz = 240 BPM).
    pub high_cutoff_hz: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_cutoff_hz: 0.7,
            high_cutoff_hz: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Width of the centered window used for the local threshold.
    pub window_secs: f32,
    /// Threshold = local mean + k * local std.
    pub threshold_k: f32,
    /// Refractory period between accepted peaks.
    pub min_spacing_secs: f32,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            window_secs: 0.4,
            threshold_k: 0.5,
            min_spacing_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    /// Relative distance from the median beyond which an interval is an outlier.
    pub outlier_tolerance: f32,
    /// Clean intervals required to compute a rate.
    pub min_clean_intervals: usize,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            outlier_tolerance: 0.30,
            min_clean_intervals: 3,
        }
    }
}

impl ScanConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.realtime_min_samples == 0 {
            return Err(ConfigError::Validation(
                "realtime_min_samples must be at least 1".into(),
            ));
        }
        if self.realtime_min_samples > self.min_samples {
            return Err(ConfigError::Validation(format!(
                "realtime_min_samples ({}) exceeds min_samples ({})",
                self.realtime_min_samples, self.min_samples
            )));
        }
        if self.min_samples > self.buffer_capacity {
            return Err(ConfigError::Validation(format!(
                "min_samples ({}) exceeds buffer_capacity ({})",
                self.min_samples, self.buffer_capacity
            )));
        }
        if self.scan_duration_ms == 0 {
            return Err(ConfigError::Validation(
                "scan_duration_ms must be non-zero".into(),
            ));
        }

        let nyquist = self.sample_rate_hz / 2.0;
        let f = &self.filter;
        if !(f.low_cutoff_hz > 0.0 && f.low_cutoff_hz < f.high_cutoff_hz && f.high_cutoff_hz < nyquist) {
            return Err(ConfigError::Validation(format!(
                "filter band must satisfy 0 < {} < {} < {}",
                f.low_cutoff_hz, f.high_cutoff_hz, nyquist
            )));
        }

        let c = &self.coverage;
        if c.window == 0 {
            return Err(ConfigError::Validation("coverage.window must be at least 1".into()));
        }
        if c.min_brightness > c.max_brightness {
            return Err(ConfigError::Validation(format!(
                "coverage brightness range is empty: [{}, {}]",
                c.min_brightness, c.max_brightness
            )));
        }

        let p = &self.peaks;
        if p.window_secs <= 0.0 || p.min_spacing_secs <= 0.0 || p.threshold_k < 0.0 {
            return Err(ConfigError::Validation(
                "peak window, spacing must be positive and threshold_k non-negative".into(),
            ));
        }

        let i = &self.intervals;
        if !(i.outlier_tolerance > 0.0 && i.outlier_tolerance < 1.0) {
            return Err(ConfigError::Validation(format!(
                "intervals.outlier_tolerance must be in (0, 1), got {}",
                i.outlier_tolerance
            )));
        }
        if i.min_clean_intervals < 2 {
            return Err(ConfigError::Validation(
                "intervals.min_clean_intervals must be at least 2".into(),
            ));
        }

        Ok(())
    }
}
