//! Kalman-style smoothing of live BPM estimates.
//!
//! Live passes over a short, growing window jitter by a few BPM from one
//! cadence tick to the next. The tracker keeps a [hr, dhr] state and gates
//! out jumps no heart makes in a quarter of a second. Only the live display
//! path uses it; final results come straight from the pipeline.

#[derive(Debug, Clone)]
pub struct HrTrackerConfig {
    /// Measurement variance (BPM^2) at confidence 1.0.
    pub meas_var_base: f32,
    /// Process variance for HR (BPM^2 per second).
    pub process_var_hr: f32,
    /// Process variance for dHR (BPM^2 per second).
    pub process_var_dhr: f32,
    /// Hard gate on implausible jumps (BPM).
    pub max_jump_bpm: f32,
    /// Innovation gate in sigma units.
    pub gate_sigma: f32,
    pub min_meas_confidence: f32,
}

impl Default for HrTrackerConfig {
    fn default() -> Self {
        Self {
            meas_var_base: 4.0,
            process_var_hr: 1.0,
            process_var_dhr: 0.5,
            max_jump_bpm: 25.0,
            gate_sigma: 3.5,
            min_meas_confidence: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HrTrackedValue {
    pub bpm: f32,
    /// Tracker's own stability estimate (0..1).
    pub stability_confidence: f32,
    pub accepted_measurement: bool,
}

#[derive(Debug, Clone)]
pub struct HrTracker {
    cfg: HrTrackerConfig,
    x_hr: f32,
    x_dhr: f32,
    p00: f32,
    p01: f32,
    p10: f32,
    p11: f32,
    initialized: bool,
    consecutive_rejects: u32,
}

/// After this many gated measurements in a row the tracker re-seeds from the
/// next one; the finger was likely repositioned.
const MAX_CONSECUTIVE_REJECTS: u32 = 4;

impl HrTracker {
    pub fn new() -> Self {
        Self::with_config(HrTrackerConfig::default())
    }

    pub fn with_config(cfg: HrTrackerConfig) -> Self {
        Self {
            cfg,
            x_hr: 0.0,
            x_dhr: 0.0,
            p00: 100.0,
            p01: 0.0,
            p10: 0.0,
            p11: 25.0,
            initialized: false,
            consecutive_rejects: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::with_config(self.cfg.clone());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Feed one measurement taken `dt_sec` after the previous one.
    pub fn update(&mut self, bpm_meas: f32, confidence: f32, dt_sec: f32) -> HrTrackedValue {
        let dt = dt_sec.clamp(1e-3, 5.0);
        let usable = bpm_meas.is_finite() && confidence >= self.cfg.min_meas_confidence;

        if usable && (!self.initialized || self.consecutive_rejects >= MAX_CONSECUTIVE_REJECTS) {
            self.seed(bpm_meas);
            return HrTrackedValue {
                bpm: self.x_hr,
                stability_confidence: 0.5,
                accepted_measurement: true,
            };
        }

        // Predict with F = [[1, dt], [0, 1]]
        let x_hr_pred = self.x_hr + self.x_dhr * dt;
        let x_dhr_pred = self.x_dhr;
        let p00_pred = self.p00 + dt * (self.p10 + self.p01) + dt * dt * self.p11 + self.cfg.process_var_hr * dt;
        let p01_pred = self.p01 + dt * self.p11;
        let p10_pred = self.p10 + dt * self.p11;
        let p11_pred = self.p11 + self.cfg.process_var_dhr * dt;

        let r = self.cfg.meas_var_base / (confidence.max(1e-3) * confidence.max(1e-3));
        let y = bpm_meas - x_hr_pred;
        let s = p00_pred + r;
        let sigma = s.sqrt().max(1e-6);

        let gated = !usable || y.abs() > self.cfg.max_jump_bpm || (y / sigma).abs() > self.cfg.gate_sigma;
        if gated {
            self.x_hr = x_hr_pred;
            self.x_dhr = x_dhr_pred;
            self.p00 = p00_pred;
            self.p01 = p01_pred;
            self.p10 = p10_pred;
            self.p11 = p11_pred;
            if usable {
                self.consecutive_rejects += 1;
            }
            return HrTrackedValue {
                bpm: self.x_hr,
                stability_confidence: Self::stability_from_sigma(p00_pred.sqrt()),
                accepted_measurement: false,
            };
        }

        // K = P H^T / S with H = [1, 0]
        let k0 = p00_pred / s;
        let k1 = p10_pred / s;

        self.x_hr = x_hr_pred + k0 * y;
        self.x_dhr = x_dhr_pred + k1 * y;
        self.p00 = (1.0 - k0) * p00_pred;
        self.p01 = (1.0 - k0) * p01_pred;
        self.p10 = p10_pred - k1 * p00_pred;
        self.p11 = p11_pred - k1 * p01_pred;
        self.consecutive_rejects = 0;

        HrTrackedValue {
            bpm: self.x_hr,
            stability_confidence: Self::stability_from_sigma(self.p00.sqrt()),
            accepted_measurement: true,
        }
    }

    fn seed(&mut self, bpm: f32) {
        self.x_hr = bpm;
        self.x_dhr = 0.0;
        self.p00 = 25.0;
        self.p01 = 0.0;
        self.p10 = 0.0;
        self.p11 = 9.0;
        self.initialized = true;
        self.consecutive_rejects = 0;
    }

    #[inline]
    fn stability_from_sigma(sigma_bpm: f32) -> f32 {
        1.0 / (1.0 + (sigma_bpm / 4.0).max(0.0))
    }
}

impl Default for HrTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_measurement_seeds() {
        let mut t = HrTracker::new();
        let v = t.update(72.0, 0.9, 0.25);
        assert_eq!(v.bpm, 72.0);
        assert!(v.accepted_measurement);
        assert!(t.is_initialized());
    }

    #[test]
    fn test_smooths_jitter() {
        let mut t = HrTracker::new();
        t.update(72.0, 0.9, 0.25);
        for (i, m) in [74.0, 70.0, 73.0, 71.0, 72.0].iter().enumerate() {
            let v = t.update(*m, 0.9, 0.25);
            assert!(v.accepted_measurement, "step {}", i);
            assert!((v.bpm - 72.0).abs() < 2.0);
        }
    }

    #[test]
    fn test_rejects_jump() {
        let mut t = HrTracker::new();
        t.update(72.0, 0.9, 0.25);
        let v = t.update(144.0, 0.9, 0.25);
        assert!(!v.accepted_measurement);
        assert!((v.bpm - 72.0).abs() < 1.0);
    }

    #[test]
    fn test_stability_follows_uncertainty() {
        let mut t = HrTracker::new();
        let seeded = t.update(72.0, 0.9, 0.25);
        assert_eq!(seeded.stability_confidence, 0.5);

        let mut settled = seeded;
        for _ in 0..10 {
            settled = t.update(72.0, 0.9, 0.25);
        }
        assert!(settled.stability_confidence > 0.6, "{:?}", settled);

        // a gated jump only predicts, so uncertainty grows
        let jump = t.update(140.0, 0.9, 0.25);
        assert!(!jump.accepted_measurement);
        assert!(jump.stability_confidence < settled.stability_confidence);
    }

    #[test]
    fn test_reseeds_after_repeated_rejects() {
        let mut t = HrTracker::new();
        t.update(72.0, 0.9, 0.25);
        for _ in 0..MAX_CONSECUTIVE_REJECTS {
            assert!(!t.update(120.0, 0.9, 0.25).accepted_measurement);
        }
        let v = t.update(120.0, 0.9, 0.25);
        assert!(v.accepted_measurement);
        assert_eq!(v.bpm, 120.0);
    }

    #[test]
    fn test_unusable_measurement_predicts() {
        let mut t = HrTracker::new();
        t.update(72.0, 0.9, 0.25);
        let v = t.update(f32::NAN, 0.9, 0.25);
        assert!(!v.accepted_measurement);
        assert!(v.bpm.is_finite());

        t.reset();
        assert!(!t.is_initialized());
    }
}
