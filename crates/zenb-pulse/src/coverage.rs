//! Finger placement detection.
//!
//! A fingertip pressed over lens and flash produces a bright, strongly red
//! frame. Anything else (an open lens, a partial cover, an underexposed
//! frame) fails at least one of the per-sample checks below.

use crate::config::CoverageConfig;
use crate::types::Sample;

/// Below this fraction of good samples the finger is treated as not placed.
pub const COVERAGE_THRESHOLD: f32 = 0.7;

/// Whether a coverage value means the finger is properly placed.
pub fn is_covered(coverage: f32) -> bool {
    coverage >= COVERAGE_THRESHOLD
}

#[derive(Debug, Clone, Default)]
pub struct CoverageEstimator {
    config: CoverageConfig,
}

impl CoverageEstimator {
    pub fn new() -> Self {
        Self::with_config(CoverageConfig::default())
    }

    pub fn with_config(config: CoverageConfig) -> Self {
        Self { config }
    }

    pub fn window(&self) -> usize {
        self.config.window
    }

    /// Fraction of the most recent `window` samples that look covered.
    ///
    /// Accepts any number of samples; only the tail is inspected. Empty
    /// input yields 0.
    pub fn coverage<'a, I>(&self, samples: I) -> f32
    where
        I: IntoIterator<Item = &'a Sample>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = samples.into_iter();
        let skip = iter.len().saturating_sub(self.config.window);
        let mut total = 0usize;
        let mut good = 0usize;
        for s in iter.skip(skip) {
            total += 1;
            if self.is_good_sample(s) {
                good += 1;
            }
        }
        if total == 0 {
            return 0.0;
        }
        good as f32 / total as f32
    }

    pub fn is_good_sample(&self, s: &Sample) -> bool {
        let finite = s.red.is_finite()
            && s.green.is_finite()
            && s.blue.is_finite()
            && s.brightness.is_finite();
        finite
            && s.brightness >= self.config.min_brightness
            && s.brightness <= self.config.max_brightness
            && s.red > s.green
            && s.red > s.blue
            && s.red > self.config.min_red
    }
}
