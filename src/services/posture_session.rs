/// Posture Session
///
/// Owns all per-session state (smoothing window, baseline, alert timer,
/// counters) and runs one extraction -> smoothing -> scoring cycle per frame.
/// The baseline is only written here, and only from a successful calibration.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::PostureConfig;
use crate::models::{Baseline, CalibrationResult, PoseFrame, PostureMetrics, ScoreResult, ScoringMode};
use crate::services::alert_scheduler::{AlertScheduler, AlertState, AlertTimer, TimerId};
use crate::services::feedback::{MessagePicker, RandomPicker};
use crate::services::metrics_extractor::MetricsExtractor;
use crate::services::posture_scorer::PostureScorer;
use crate::services::reference_calibrator::{ReferenceCalibrator, CALIBRATION_ACCEPTED_MESSAGE};
use crate::services::temporal_smoother::TemporalSmoother;

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub timestamp_ms: u64,
    /// Raw metrics for this frame, before smoothing
    pub metrics: Option<PostureMetrics>,
    pub result: ScoreResult,
    pub mode: ScoringMode,
    pub alert_state: AlertState,
}

/// Session counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub frames_processed: u64,
    pub frames_without_metrics: u64,
    pub calibrations_accepted: u64,
    pub calibrations_rejected: u64,
    pub alerts_fired: u64,
    /// Time spent at or above the bad-posture threshold
    pub good_posture_ms: u64,
}

pub struct PostureSession<T: AlertTimer, P: MessagePicker = RandomPicker> {
    id: Uuid,
    started_at: DateTime<Utc>,
    active: bool,
    extractor: MetricsExtractor,
    smoother: TemporalSmoother,
    calibrator: ReferenceCalibrator,
    scorer: PostureScorer,
    baseline: Option<Baseline>,
    alerts: AlertScheduler<T>,
    picker: P,
    bad_posture_threshold: u8,
    stats: SessionStats,
    /// Timestamp and score of the previous frame, for the good-posture stopwatch
    last_frame: Option<(u64, Option<u8>)>,
}

impl<T: AlertTimer> PostureSession<T, RandomPicker> {
    /// Create a session with randomized feedback wording
    pub fn new(config: &PostureConfig, timer: T) -> Self {
        Self::with_picker(config, timer, RandomPicker::from_entropy())
    }
}

impl<T: AlertTimer, P: MessagePicker> PostureSession<T, P> {
    pub fn with_picker(config: &PostureConfig, timer: T, picker: P) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session_id = %id, window_size = config.smoothing.window_size, "Posture session started");

        Self {
            id,
            started_at: Utc::now(),
            active: true,
            extractor: MetricsExtractor::with_config(&config.detection),
            smoother: TemporalSmoother::with_config(&config.smoothing),
            calibrator: ReferenceCalibrator::new(config.calibration.clone()),
            scorer: PostureScorer::new(config.scoring.clone()),
            baseline: None,
            alerts: AlertScheduler::new(timer, &config.alert),
            picker,
            bad_posture_threshold: config.alert.bad_posture_threshold,
            stats: SessionStats::default(),
            last_frame: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> ScoringMode {
        PostureScorer::mode(self.baseline.as_ref())
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn alert_state(&self) -> AlertState {
        self.alerts.state()
    }

    pub fn smoothed_metrics(&self) -> Option<PostureMetrics> {
        self.smoother.smoothed_metrics()
    }

    pub fn timer_mut(&mut self) -> &mut T {
        self.alerts.timer_mut()
    }

    /// Run one full cycle for a frame. Inactive sessions ignore frames.
    pub fn process_frame(&mut self, frame: &PoseFrame) -> Option<FrameOutcome> {
        if !self.active {
            return None;
        }

        let metrics = self.extractor.extract(&frame.landmarks);
        self.smoother.add_metrics(metrics);

        let smoothed = self.smoother.smoothed_metrics();
        let result = self
            .scorer
            .score(smoothed.as_ref(), self.baseline.as_ref(), &mut self.picker);
        let alert_state = self.alerts.observe(&result);

        self.record_frame(frame.timestamp_ms, metrics.is_some(), result.score);

        tracing::debug!(
            session_id = %self.id,
            timestamp_ms = frame.timestamp_ms,
            score = ?result.score,
            ?alert_state,
            "Frame scored"
        );

        Some(FrameOutcome {
            timestamp_ms: frame.timestamp_ms,
            metrics,
            result,
            mode: self.mode(),
            alert_state,
        })
    }

    /// Try to make the current smoothed posture the baseline
    pub fn calibrate(&mut self) -> CalibrationResult {
        let smoothed = self.smoother.smoothed_metrics();

        match self.calibrator.calibrate(smoothed.as_ref()) {
            Ok(baseline) => {
                self.baseline = Some(baseline);
                self.stats.calibrations_accepted += 1;
                tracing::info!(session_id = %self.id, "Baseline posture calibrated");
                CalibrationResult {
                    is_valid: true,
                    message: CALIBRATION_ACCEPTED_MESSAGE.to_string(),
                }
            }
            Err(rejection) => {
                self.stats.calibrations_rejected += 1;
                tracing::warn!(session_id = %self.id, reason = %rejection, "Calibration rejected");
                CalibrationResult {
                    is_valid: false,
                    message: rejection.to_string(),
                }
            }
        }
    }

    /// Forward a timer completion; `true` when the alert fired
    pub fn on_timer_elapsed(&mut self, id: TimerId) -> bool {
        let fired = self.alerts.on_timer_elapsed(id);
        if fired {
            self.stats.alerts_fired += 1;
        }
        fired
    }

    /// Cancel any pending alert and drop smoothing history and baseline
    pub fn reset(&mut self) {
        self.alerts.reset();
        self.smoother.clear();
        self.baseline = None;
        self.last_frame = None;
        tracing::info!(session_id = %self.id, "Posture session reset");
    }

    /// Reset and ignore frames until re-activated
    pub fn deactivate(&mut self) {
        self.reset();
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    fn record_frame(&mut self, timestamp_ms: u64, had_metrics: bool, score: Option<u8>) {
        self.stats.frames_processed += 1;
        if !had_metrics {
            self.stats.frames_without_metrics += 1;
        }

        if let Some((previous_ms, Some(previous_score))) = self.last_frame {
            if previous_score >= self.bad_posture_threshold {
                self.stats.good_posture_ms += timestamp_ms.saturating_sub(previous_ms);
            }
        }
        self.last_frame = Some((timestamp_ms, score));
    }
}
