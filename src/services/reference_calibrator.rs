/// Reference Calibrator
///
/// Checks a smoothed snapshot against absolute bounds before it may become
/// the baseline. The checks never look at a previous baseline.

use thiserror::Error;

use crate::config::CalibrationBounds;
use crate::models::{Baseline, PostureMetrics};

/// Why a snapshot was refused as baseline; the message is shown to the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationRejection {
    #[error("Insufficient data: posture could not be read. Make sure your face and shoulders are visible.")]
    InsufficientData,

    #[error("Your shoulders are tilted too far ({angle:.1}°). Straighten up and try again.")]
    ShoulderTilt { angle: f64 },

    #[error("Your head is tilted too far ({angle:.1}°). Straighten up and try again.")]
    HeadTilt { angle: f64 },

    #[error("Your neck is too far forward. Pull your head back over your shoulders and try again.")]
    HeadForward { offset: f64 },

    #[error("Your body is turned too far. Face the camera and try again.")]
    ShoulderTwist { ratio: f64 },
}

pub const CALIBRATION_ACCEPTED_MESSAGE: &str =
    "Reference posture saved! Your posture is now compared against it.";

#[derive(Debug, Clone, Default)]
pub struct ReferenceCalibrator {
    bounds: CalibrationBounds,
}

impl ReferenceCalibrator {
    pub fn new(bounds: CalibrationBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &CalibrationBounds {
        &self.bounds
    }

    /// Validate metrics against the absolute bounds, first violation wins
    pub fn validate(&self, metrics: &PostureMetrics) -> Result<(), CalibrationRejection> {
        if metrics.shoulder_tilt_angle.abs() > self.bounds.max_shoulder_tilt_degrees {
            return Err(CalibrationRejection::ShoulderTilt {
                angle: metrics.shoulder_tilt_angle,
            });
        }
        if metrics.head_tilt_angle.abs() > self.bounds.max_head_tilt_degrees {
            return Err(CalibrationRejection::HeadTilt {
                angle: metrics.head_tilt_angle,
            });
        }
        if metrics.head_forward_offset > self.bounds.max_head_forward_offset {
            return Err(CalibrationRejection::HeadForward {
                offset: metrics.head_forward_offset,
            });
        }
        if metrics.shoulder_twist_ratio > self.bounds.max_shoulder_twist_ratio {
            return Err(CalibrationRejection::ShoulderTwist {
                ratio: metrics.shoulder_twist_ratio,
            });
        }

        Ok(())
    }

    /// Build a baseline from the current smoothed snapshot
    pub fn calibrate(
        &self,
        smoothed: Option<&PostureMetrics>,
    ) -> Result<Baseline, CalibrationRejection> {
        let metrics = smoothed.ok_or(CalibrationRejection::InsufficientData)?;
        self.validate(metrics)?;
        Ok(Baseline::new(*metrics))
    }
}
