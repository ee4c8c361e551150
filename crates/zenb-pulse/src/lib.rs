//! # zenb-pulse
//!
//! Contact photoplethysmography (PPG) heart-rate estimation for ZenB.
//!
//! A fingertip pressed over the camera lens with the flash on modulates the
//! reflected light with every heartbeat. This crate turns the per-frame color
//! averages of that region into a heart rate with a confidence score:
//!
//! - **Coverage**: is the finger actually on the lens?
//! - **DSP**: detrend and band-limit the green channel to 0.7-4 Hz
//! - **Peaks**: adaptive-threshold systolic peak picking
//! - **Intervals**: median-based outlier rejection and irregularity
//! - **Confidence**: spectral SNR, rhythm stability and coverage
//! - **Controller**: scan state machine with live estimates and retries
//!
//! ## Example
//!
//! ```ignore
//! use zenb_pulse::{HeartRateResult, ScanConfig, ScanController, ScanError, ScanObserver};
//!
//! struct Display;
//!
//! impl ScanObserver for Display {
//!     fn on_realtime_estimate(&mut self, bpm: u32, coverage: f32) {
//!         println!("~{} BPM (coverage {:.0}%)", bpm, coverage * 100.0);
//!     }
//!     fn on_complete(&mut self, result: HeartRateResult) {
//!         println!("{} BPM ({:?})", result.bpm, result.quality);
//!     }
//!     fn on_failed(&mut self, error: ScanError) {
//!         println!("scan failed: {}", error);
//!     }
//! }
//!
//! let mut controller = ScanController::new(Display);
//! controller.start(ScanConfig::default())?;
//! for frame in camera_frames {
//!     controller.push_sample(frame.into());
//! }
//! ```

pub mod buffer;
pub mod confidence;
pub mod config;
pub mod controller;
pub mod coverage;
pub mod dsp;
pub mod error;
pub mod intervals;
pub mod peaks;
pub mod pipeline;
pub mod tracker;
pub mod types;

pub use buffer::{SignalBuffer, SignalSnapshot};
pub use confidence::{ConfidenceScorer, Score};
pub use config::{CoverageConfig, FilterConfig, IntervalConfig, PeakConfig, ScanConfig};
pub use controller::{IterSource, SampleSource, ScanController, ScanObserver, ScanPhase, StopHandle};
pub use coverage::{is_covered, CoverageEstimator, COVERAGE_THRESHOLD};
pub use dsp::BandpassFilter;
pub use error::{ConfigError, ScanError};
pub use intervals::{IntervalSet, IntervalValidator};
pub use peaks::PeakDetector;
pub use pipeline::{Analysis, PulsePipeline};
pub use tracker::{HrTrackedValue, HrTracker, HrTrackerConfig};
pub use types::{HeartRateResult, HrvMetrics, QualityLabel, Sample, MAX_BPM, MIN_BPM};

#[cfg(test)]
mod tests_support;
#[cfg(test)]
mod tests_determinism;
#[cfg(test)]
mod tests_proptest;
