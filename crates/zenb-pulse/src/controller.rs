//! Scan session state machine.
//!
//! ```text
//! Idle -> Collecting -> Analyzing -> Complete
//!              ^            |
//!              +-- retry ---+--> Failed (retry budget exhausted)
//!
//! any state --stop()--> Aborted
//! ```
//!
//! The controller owns the buffer and all per-scan state exclusively and
//! does its work on the caller's thread inside `push_sample`. Time is taken
//! from sample timestamps, never from a wall clock, so a recorded sample
//! sequence always replays to the same outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::buffer::SignalBuffer;
use crate::config::ScanConfig;
use crate::coverage::{is_covered, CoverageEstimator};
use crate::error::{ConfigError, ScanError};
use crate::pipeline::{Analysis, PulsePipeline};
use crate::tracker::HrTracker;
use crate::types::{bpm_in_range, HeartRateResult, QualityLabel, Sample};

/// Receives scan output. Realtime estimates are for live display only.
pub trait ScanObserver {
    fn on_realtime_estimate(&mut self, _bpm: u32, _coverage: f32) {}
    /// Fired exactly once per successful scan.
    fn on_complete(&mut self, result: HeartRateResult);
    /// Fired once when the retry budget is exhausted.
    fn on_failed(&mut self, error: ScanError);
}

/// Pull-style sample producer, e.g. a camera frame queue.
pub trait SampleSource {
    /// Next available sample; `None` once the source is exhausted.
    fn poll_sample(&mut self) -> Option<Sample>;
    /// Drop the subscription. Called once the scan no longer needs samples.
    fn release(&mut self) {}
}

/// Adapts any sample iterator into a [`SampleSource`].
#[derive(Debug, Clone)]
pub struct IterSource<I>(pub I);

impl<I: Iterator<Item = Sample>> SampleSource for IterSource<I> {
    fn poll_sample(&mut self) -> Option<Sample> {
        self.0.next()
    }
}

/// Cross-thread stop request, honoured before the next sample is processed.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Collecting,
    Analyzing,
    Complete,
    Failed,
    Aborted,
}

impl ScanPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Aborted)
    }
}

/// Per-scan state; rebuilt by `start`, dropped on any terminal transition.
#[derive(Debug)]
struct ScanState {
    buffer: SignalBuffer,
    tracker: HrTracker,
    coverage: f32,
    deadline_millis: Option<u64>,
    last_pass_millis: Option<u64>,
    last_realtime: Option<(u64, QualityLabel)>,
    retries: u32,
}

impl ScanState {
    fn new(config: &ScanConfig) -> Self {
        Self {
            buffer: SignalBuffer::new(config.buffer_capacity),
            tracker: HrTracker::new(),
            coverage: 0.0,
            deadline_millis: None,
            last_pass_millis: None,
            last_realtime: None,
            retries: 0,
        }
    }
}

pub struct ScanController<O: ScanObserver> {
    observer: O,
    phase: ScanPhase,
    config: ScanConfig,
    pipeline: PulsePipeline,
    coverage: CoverageEstimator,
    state: Option<ScanState>,
    stop: StopHandle,
}

impl<O: ScanObserver> ScanController<O> {
    pub fn new(observer: O) -> Self {
        let config = ScanConfig::default();
        Self {
            observer,
            phase: ScanPhase::Idle,
            pipeline: PulsePipeline::new(config.clone()),
            coverage: CoverageEstimator::with_config(config.coverage.clone()),
            config,
            state: None,
            stop: StopHandle::default(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Handle that can abort the scan from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Coverage over the most recent window; 0 outside a scan.
    pub fn coverage(&self) -> f32 {
        self.state.as_ref().map_or(0.0, |s| s.coverage)
    }

    pub fn buffered_samples(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.buffer.len())
    }

    pub fn retries(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.retries)
    }

    /// Begin a new scan, discarding any previous one.
    pub fn start(&mut self, config: ScanConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.pipeline = PulsePipeline::new(config.clone());
        self.coverage = CoverageEstimator::with_config(config.coverage.clone());
        self.state = Some(ScanState::new(&config));
        self.config = config;
        self.stop.clear();
        self.transition(ScanPhase::Collecting);
        Ok(())
    }

    /// Abort the scan. Buffer and scan state are discarded.
    pub fn stop(&mut self) {
        self.state = None;
        self.transition(ScanPhase::Aborted);
    }

    /// Ingest one sample. Ignored unless collecting.
    pub fn push_sample(&mut self, sample: Sample) {
        if self.stop.is_stop_requested() && self.phase != ScanPhase::Aborted {
            self.stop();
            return;
        }
        if self.phase != ScanPhase::Collecting {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if !state.buffer.add_sample(sample) {
            log::trace!("dropped out-of-order sample at {} ms", sample.timestamp_millis);
            return;
        }
        let now = sample.timestamp_millis;
        let deadline = *state
            .deadline_millis
            .get_or_insert(now.saturating_add(self.config.scan_duration_ms));
        state.coverage = self.coverage.coverage(state.buffer.iter());

        if now >= deadline {
            self.final_pass(true);
            return;
        }

        let due = state
            .last_pass_millis
            .map_or(true, |t| now.saturating_sub(t) >= self.config.analysis_interval_ms);
        if !due {
            return;
        }
        state.last_pass_millis = Some(now);

        if state.buffer.len() >= self.config.realtime_min_samples && is_covered(state.coverage) {
            self.realtime_pass(now);
        }

        if self.saturated_with_quality() {
            self.final_pass(true);
        }
    }

    /// No more samples will arrive: make one last attempt without retry.
    pub fn finish(&mut self) {
        if self.phase == ScanPhase::Collecting {
            self.final_pass(false);
        }
    }

    /// Drain `source` into the scan until it ends, then release the source.
    pub fn run<S: SampleSource>(&mut self, source: &mut S) -> ScanPhase {
        while self.phase == ScanPhase::Collecting {
            if self.stop.is_stop_requested() {
                self.stop();
                break;
            }
            match source.poll_sample() {
                Some(sample) => self.push_sample(sample),
                None => self.finish(),
            }
        }
        source.release();
        self.phase
    }

    fn saturated_with_quality(&self) -> bool {
        if !self.config.complete_on_saturation {
            return false;
        }
        let Some(state) = self.state.as_ref() else {
            return false;
        };
        state.buffer.is_full()
            && state.buffer.len() >= self.config.min_samples
            && is_covered(state.coverage)
            && state
                .last_realtime
                .map_or(false, |(_, quality)| quality.is_reportable())
    }

    fn realtime_pass(&mut self, now: u64) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let snapshot = state.buffer.snapshot();
        match self.pipeline.analyze(&snapshot, self.config.realtime_min_samples) {
            Ok(analysis) => {
                let dt_sec = state
                    .last_realtime
                    .map_or(self.config.analysis_interval_ms, |(t, _)| now.saturating_sub(t))
                    as f32
                    / 1000.0;
                state.last_realtime = Some((now, analysis.score.quality));
                let tracked = state
                    .tracker
                    .update(analysis.bpm as f32, analysis.score.confidence, dt_sec);
                let bpm = tracked.bpm.round();
                if bpm.is_finite() && bpm >= 0.0 && bpm_in_range(bpm as u32) {
                    self.observer.on_realtime_estimate(bpm as u32, state.coverage);
                }
            }
            Err(err) => {
                state.last_realtime = None;
                log::trace!("realtime pass skipped: {}", err);
            }
        }
    }

    fn final_pass(&mut self, allow_retry: bool) {
        let Some(snapshot) = self.state.as_ref().map(|s| s.buffer.snapshot()) else {
            return;
        };
        self.transition(ScanPhase::Analyzing);

        let outcome = self
            .pipeline
            .analyze(&snapshot, self.config.min_samples)
            .and_then(Analysis::into_result);

        match outcome {
            Ok(result) => {
                log::info!(
                    "scan complete: {} BPM, confidence {}% ({:?})",
                    result.bpm,
                    result.confidence_percent,
                    result.quality
                );
                self.state = None;
                self.transition(ScanPhase::Complete);
                self.observer.on_complete(result);
            }
            Err(err) => self.attempt_failed(err, allow_retry, snapshot.last_timestamp().unwrap_or(0)),
        }
    }

    fn attempt_failed(&mut self, err: ScanError, allow_retry: bool, now: u64) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.retries += 1;

        if allow_retry && state.retries <= self.config.max_retries {
            log::warn!(
                "analysis attempt {} failed ({}), collecting {} ms more",
                state.retries,
                err,
                self.config.retry_extension_ms
            );
            state.deadline_millis = Some(now.saturating_add(self.config.retry_extension_ms));
            state.last_realtime = None;
            self.transition(ScanPhase::Collecting);
            return;
        }

        log::warn!("scan failed after {} attempts: {}", state.retries, err);
        self.state = None;
        self.transition(ScanPhase::Failed);
        self.observer.on_failed(err);
    }

    fn transition(&mut self, next: ScanPhase) {
        if self.phase != next {
            log::info!("scan: {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }
}
