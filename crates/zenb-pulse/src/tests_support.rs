//! Synthetic finger-on-lens sample streams for tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

use crate::types::Sample;

#[derive(Debug, Clone)]
pub struct SyntheticPulse {
    pub bpm: f32,
    pub sample_rate: f32,
    /// Pulse amplitude on the green channel.
    pub amplitude: f32,
    /// Half-width of the uniform noise added to green.
    pub noise: f32,
    pub seed: u64,
    pub start_millis: u64,
}

impl Default for SyntheticPulse {
    fn default() -> Self {
        Self {
            bpm: 72.0,
            sample_rate: 30.0,
            amplitude: 3.0,
            // std = 1/sqrt(3); ~11 dB below the pulse
            noise: 1.0,
            seed: 42,
            start_millis: 1_000,
        }
    }
}

impl SyntheticPulse {
    pub fn timestamp(&self, i: usize) -> u64 {
        self.start_millis + (i as f64 * 1000.0 / self.sample_rate as f64).round() as u64
    }

    /// `n` covered samples with a sinusoidal pulse on green.
    pub fn samples(&self, n: usize) -> Vec<Sample> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let freq = self.bpm / 60.0;
        (0..n)
            .map(|i| {
                let t = i as f32 / self.sample_rate;
                let pulse = self.amplitude * (2.0 * PI * freq * t).sin();
                let noise = if self.noise > 0.0 {
                    rng.gen_range(-self.noise..self.noise)
                } else {
                    0.0
                };
                Sample::from_rgb(180.0, 100.0 + pulse + noise, 60.0, self.timestamp(i))
            })
            .collect()
    }
}

/// Samples of an uncovered lens: bluish room light.
pub fn uncovered_samples(n: usize, sample_rate: f32) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let ts = 1_000 + (i as f64 * 1000.0 / sample_rate as f64).round() as u64;
            Sample::from_rgb(90.0, 110.0, 140.0 + (i % 7) as f32, ts)
        })
        .collect()
}
