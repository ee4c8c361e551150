//! Rolling sample window.
//!
//! Holds the most recent `capacity` samples in arrival order. Analysis never
//! reads the live buffer directly; it works on a [`SignalSnapshot`] copied
//! out of it, so the producer can keep appending while a pass runs.

use ndarray::Array1;
use std::collections::VecDeque;

use crate::types::Sample;

#[derive(Debug, Clone)]
pub struct SignalBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
    dropped_out_of_order: u64,
}

impl SignalBuffer {
    /// Create a buffer holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            dropped_out_of_order: 0,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    ///
    /// A sample older than the newest retained one is dropped; returns
    /// whether the sample was stored.
    pub fn add_sample(&mut self, sample: Sample) -> bool {
        if let Some(last) = self.samples.back() {
            if sample.timestamp_millis < last.timestamp_millis {
                self.dropped_out_of_order += 1;
                return false;
            }
        }

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn dropped_out_of_order(&self) -> u64 {
        self.dropped_out_of_order
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// The last `n` samples (or fewer), oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Sample> + '_ {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.dropped_out_of_order = 0;
    }

    /// Copy the current contents out for analysis.
    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            samples: self.samples.iter().copied().collect(),
        }
    }
}

/// Immutable copy of the buffer contents at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    samples: Vec<Sample>,
}

impl SignalSnapshot {
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn green(&self) -> Array1<f32> {
        self.samples.iter().map(|s| s.green).collect()
    }

    pub fn first_timestamp(&self) -> Option<u64> {
        self.samples.first().map(|s| s.timestamp_millis)
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.samples.last().map(|s| s.timestamp_millis)
    }

    /// Sample rate implied by the timestamps, in Hz.
    ///
    /// `None` with fewer than two samples or a zero time span.
    pub fn effective_sample_rate(&self) -> Option<f32> {
        let (first, last) = (self.first_timestamp()?, self.last_timestamp()?);
        let span_ms = last.saturating_sub(first);
        if self.samples.len() < 2 || span_ms == 0 {
            return None;
        }
        Some((self.samples.len() - 1) as f32 * 1000.0 / span_ms as f32)
    }
}
