/// Posture metrics and scoring results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geometric posture metrics derived from one frame (or a smoothed window)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PostureMetrics {
    /// Ear midpoint offset from the shoulder midpoint (x/z plane), in shoulder widths
    pub head_forward_offset: f64,
    /// Shoulder line angle from horizontal, degrees
    pub shoulder_tilt_angle: f64,
    /// Ear line angle from horizontal, degrees
    pub head_tilt_angle: f64,
    /// Shoulder depth difference over shoulder width
    pub shoulder_twist_ratio: f64,
    /// Vertical ear-to-nose distance over ear separation
    pub head_bow_ratio: f64,
    /// Shoulder separation in the image plane
    pub shoulder_width: f64,
    /// Image units per centimeter, from the inner-eye distance
    pub pixels_per_cm: f64,
}

impl PostureMetrics {
    /// Field-wise sum
    pub fn accumulate(&mut self, other: &PostureMetrics) {
        self.head_forward_offset += other.head_forward_offset;
        self.shoulder_tilt_angle += other.shoulder_tilt_angle;
        self.head_tilt_angle += other.head_tilt_angle;
        self.shoulder_twist_ratio += other.shoulder_twist_ratio;
        self.head_bow_ratio += other.head_bow_ratio;
        self.shoulder_width += other.shoulder_width;
        self.pixels_per_cm += other.pixels_per_cm;
    }

    /// Field-wise division
    pub fn scaled_down(mut self, divisor: f64) -> PostureMetrics {
        self.head_forward_offset /= divisor;
        self.shoulder_tilt_angle /= divisor;
        self.head_tilt_angle /= divisor;
        self.shoulder_twist_ratio /= divisor;
        self.head_bow_ratio /= divisor;
        self.shoulder_width /= divisor;
        self.pixels_per_cm /= divisor;
        self
    }
}

/// Reference posture captured by a successful calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub metrics: PostureMetrics,
    pub captured_at: DateTime<Utc>,
}

impl Baseline {
    pub fn new(metrics: PostureMetrics) -> Self {
        Self {
            metrics,
            captured_at: Utc::now(),
        }
    }
}

/// Scoring mode, selected by whether a baseline is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Uncalibrated,
    Calibrated,
}

/// Score and feedback for one smoothing cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Posture score 0-100, `None` when metrics were unavailable
    pub score: Option<u8>,
    /// Human-readable feedback, never empty
    pub feedback: String,
}

impl ScoreResult {
    pub fn scored(score: u8, feedback: impl Into<String>) -> Self {
        Self {
            score: Some(score.min(100)),
            feedback: feedback.into(),
        }
    }

    pub fn unavailable(feedback: impl Into<String>) -> Self {
        Self {
            score: None,
            feedback: feedback.into(),
        }
    }
}

/// Outcome of a calibration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub is_valid: bool,
    pub message: String,
}
