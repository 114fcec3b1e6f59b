#![allow(dead_code)]

use posture_coach::config::PostureConfig;
use posture_coach::models::{Landmark, PoseFrame, PoseLandmark, POSE_LANDMARK_COUNT};
use posture_coach::services::{FixedPicker, ManualTimer, PostureSession};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

/// Synthetic pose parameters, all in normalized image units
#[derive(Debug, Clone, Copy)]
pub struct PoseSpec {
    /// Shoulder line rotation in degrees
    pub shoulder_tilt_degrees: f64,
    /// Ear depth relative to the shoulders; negative leans toward the camera
    pub ear_depth: f64,
    /// Depth difference between the two shoulders
    pub shoulder_depth_gap: f64,
    /// Nose drop below ear height
    pub nose_drop: f64,
}

impl Default for PoseSpec {
    fn default() -> Self {
        Self {
            shoulder_tilt_degrees: 0.0,
            ear_depth: 0.0,
            shoulder_depth_gap: 0.0,
            nose_drop: 0.0,
        }
    }
}

pub const SHOULDER_HALF_WIDTH: f64 = 0.15;

/// Build a full 33-landmark frame, labeled the way a mirrored camera reports it
pub fn pose_frame(timestamp_ms: u64, pose: PoseSpec) -> PoseFrame {
    let mut landmarks = vec![Landmark::new(0.5, 0.8, 0.0).with_visibility(0.9); POSE_LANDMARK_COUNT];
    let mut set = |which: PoseLandmark, x: f64, y: f64, z: f64| {
        landmarks[which.index()] = Landmark::new(x, y, z).with_visibility(0.95);
    };

    let theta = pose.shoulder_tilt_degrees.to_radians();
    let dx = SHOULDER_HALF_WIDTH * theta.cos();
    let dy = SHOULDER_HALF_WIDTH * theta.sin();

    // The model's "left" shoulder appears on the image right
    set(PoseLandmark::RightShoulder, 0.5 - dx, 0.5 - dy, -pose.shoulder_depth_gap / 2.0);
    set(PoseLandmark::LeftShoulder, 0.5 + dx, 0.5 + dy, pose.shoulder_depth_gap / 2.0);
    set(PoseLandmark::RightEar, 0.44, 0.30, pose.ear_depth);
    set(PoseLandmark::LeftEar, 0.56, 0.30, pose.ear_depth);
    set(PoseLandmark::RightEyeInner, 0.48, 0.27, pose.ear_depth - 0.3);
    set(PoseLandmark::LeftEyeInner, 0.52, 0.27, pose.ear_depth - 0.3);
    set(PoseLandmark::Nose, 0.5, 0.30 + pose.nose_drop, pose.ear_depth - 0.3);

    PoseFrame::new(timestamp_ms, landmarks)
}

pub fn upright_frame(timestamp_ms: u64) -> PoseFrame {
    pose_frame(timestamp_ms, PoseSpec::default())
}

/// Uncalibrated score 20: severe forward head plus a 20 degree shoulder tilt
pub fn slumped_frame(timestamp_ms: u64) -> PoseFrame {
    pose_frame(
        timestamp_ms,
        PoseSpec {
            shoulder_tilt_degrees: 20.0,
            ear_depth: -0.2,
            ..Default::default()
        },
    )
}

pub fn test_session(config: &PostureConfig) -> PostureSession<ManualTimer, FixedPicker> {
    PostureSession::with_picker(config, ManualTimer::new(), FixedPicker(0))
}
