//! DSP building blocks for the pulse pipeline.
//!
//! - `BandpassFilter` - detrend + first-order high/low-pass
//! - `SpectralAnalyzer` - in-band SNR via FFT
//! - `stats` - NaN-free descriptive statistics

mod filters;
mod spectral;
pub mod stats;

pub use filters::{detrend, BandpassFilter};
pub use spectral::{SpectralAnalyzer, SpectralSnr, MIN_SNR_SAMPLES};
