/// Temporal Smoother
///
/// Simple moving average over the last `window_size` metric samples. The
/// mean is recomputed from the buffer on every read.

use crate::config::SmoothingConfig;
use crate::models::PostureMetrics;
use std::collections::VecDeque;

/// Upper bound on the up-front buffer allocation; larger windows grow on demand
const PREALLOCATED_SAMPLES: usize = 64;

#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window_size: usize,
    /// History buffer, oldest first
    history: VecDeque<PostureMetrics>,
}

impl TemporalSmoother {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            history: VecDeque::with_capacity(window_size.min(PREALLOCATED_SAMPLES)),
        }
    }

    pub fn with_config(config: &SmoothingConfig) -> Self {
        Self::new(config.window_size)
    }

    /// Push a sample, evicting the oldest once the window is full.
    /// Unavailable samples are dropped.
    pub fn add_metrics(&mut self, metrics: Option<PostureMetrics>) {
        let Some(metrics) = metrics else {
            return;
        };

        self.history.push_back(metrics);
        while self.history.len() > self.window_size {
            self.history.pop_front();
        }
    }

    /// Field-wise mean over the window, `None` when empty
    pub fn smoothed_metrics(&self) -> Option<PostureMetrics> {
        if self.history.is_empty() {
            return None;
        }

        let mut sum = PostureMetrics::default();
        for metrics in &self.history {
            sum.accumulate(metrics);
        }

        Some(sum.scaled_down(self.history.len() as f64))
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Reset temporal smoothing state
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::with_config(&SmoothingConfig::default())
    }
}
