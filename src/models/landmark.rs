/// Landmark models
///
/// Per-frame body landmarks as produced by an upstream pose model, in the
/// model's fixed index order.

use serde::{Deserialize, Serialize};

/// A single tracked body point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (normalized 0-1)
    pub x: f64,
    /// Y coordinate (normalized 0-1, grows downward)
    pub y: f64,
    /// Relative depth; smaller is closer to the camera
    #[serde(default)]
    pub z: f64,
    /// Visibility (0-1), absent when the model does not report it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    /// Create a landmark without a visibility score
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    /// Attach a visibility score
    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Check if the landmark is usable: finite coordinates and, when reported,
    /// visibility at or above `min_visibility`
    pub fn is_usable(&self, min_visibility: f64) -> bool {
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return false;
        }
        self.visibility.map_or(true, |v| v >= min_visibility)
    }

    /// Euclidean distance to another landmark in the image (x/y) plane
    pub fn planar_distance_to(&self, other: &Landmark) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle in degrees of the vector from `self` to `other`
    pub fn angle_to_degrees(&self, other: &Landmark) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Midpoint between two landmarks (visibility dropped)
    pub fn midpoint(&self, other: &Landmark) -> Landmark {
        Landmark::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    /// Order a landmark pair so the one with the smaller x comes first
    pub fn ordered_by_x(a: Landmark, b: Landmark) -> (Landmark, Landmark) {
        if a.x < b.x {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// MediaPipe pose landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

/// Number of landmarks in a full MediaPipe pose
pub const POSE_LANDMARK_COUNT: usize = 33;

impl PoseLandmark {
    /// Index into the landmark sequence
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get landmark name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Landmarks the posture metrics are computed from
    pub fn posture_landmarks() -> [Self; 7] {
        [
            Self::Nose,
            Self::LeftEyeInner,
            Self::RightEyeInner,
            Self::LeftEar,
            Self::RightEar,
            Self::LeftShoulder,
            Self::RightShoulder,
        ]
    }
}

/// One frame of landmarks with its capture time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Frame timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Landmarks in model index order
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    /// Create a new pose frame
    pub fn new(timestamp_ms: u64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
        }
    }

    /// Get landmark by pose index
    pub fn landmark(&self, which: PoseLandmark) -> Option<&Landmark> {
        self.landmarks.get(which.index())
    }
}
