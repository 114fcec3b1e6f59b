/// Metrics Extractor
///
/// Turns one frame of pose landmarks into normalized posture metrics:
/// - Head forward offset (turtle neck) relative to shoulder width
/// - Shoulder and head tilt angles
/// - Shoulder twist (rotation out of the camera plane)
/// - Head bow (pitch) ratio
/// - Image-to-centimeter scale from the inner-eye distance
///
/// Left/right pairs are ordered by x so the result does not depend on how
/// the model labeled the two sides.

use crate::config::DetectionConfig;
use crate::models::{Landmark, PoseLandmark, PostureMetrics};

/// Metrics extraction service
#[derive(Debug, Clone)]
pub struct MetricsExtractor {
    /// Minimum visibility for a landmark to be used
    min_visibility: f64,
    /// Shoulder widths below this produce no metrics
    min_shoulder_width: f64,
    /// Assumed interpupillary distance in centimeters
    interpupillary_distance_cm: f64,
}

/// Landmarks needed for one extraction, already ordered left to right
struct PostureLandmarks {
    nose: Landmark,
    left_eye_inner: Landmark,
    right_eye_inner: Landmark,
    left_ear: Landmark,
    right_ear: Landmark,
    left_shoulder: Landmark,
    right_shoulder: Landmark,
}

impl MetricsExtractor {
    /// Create an extractor with default detection settings
    pub fn new() -> Self {
        Self::with_config(&DetectionConfig::default())
    }

    pub fn with_config(config: &DetectionConfig) -> Self {
        Self {
            min_visibility: config.min_visibility,
            min_shoulder_width: config.min_shoulder_width,
            interpupillary_distance_cm: config.interpupillary_distance_cm,
        }
    }

    /// Set minimum visibility threshold
    pub fn with_min_visibility(mut self, min_visibility: f64) -> Self {
        self.min_visibility = min_visibility.clamp(0.0, 1.0);
        self
    }

    /// Extract posture metrics from a landmark sequence
    ///
    /// Returns `None` when a required landmark is missing or not visible
    /// enough, or when the shoulders are too close together to normalize by.
    pub fn extract(&self, landmarks: &[Landmark]) -> Option<PostureMetrics> {
        let lm = self.collect_landmarks(landmarks)?;

        let shoulder_width = lm.left_shoulder.planar_distance_to(&lm.right_shoulder);
        if shoulder_width < self.min_shoulder_width {
            tracing::debug!(shoulder_width, "Shoulder width below minimum, skipping frame");
            return None;
        }

        let shoulder_mid = lm.left_shoulder.midpoint(&lm.right_shoulder);
        let ear_mid = lm.left_ear.midpoint(&lm.right_ear);

        // Forward lean shows up as ear/shoulder separation in x and depth
        let head_forward_offset =
            (shoulder_mid.x - ear_mid.x).hypot(shoulder_mid.z - ear_mid.z) / shoulder_width;

        let shoulder_tilt_angle = lm.left_shoulder.angle_to_degrees(&lm.right_shoulder);
        let head_tilt_angle = lm.left_ear.angle_to_degrees(&lm.right_ear);
        let shoulder_twist_ratio = (lm.left_shoulder.z - lm.right_shoulder.z).abs() / shoulder_width;

        let eye_distance = lm.left_eye_inner.planar_distance_to(&lm.right_eye_inner);
        let pixels_per_cm = if eye_distance > 0.0 {
            eye_distance / self.interpupillary_distance_cm
        } else {
            0.0
        };

        let ear_distance = lm.left_ear.planar_distance_to(&lm.right_ear);
        let head_bow_ratio = if ear_distance > 0.0 {
            (ear_mid.y - lm.nose.y) / ear_distance
        } else {
            0.0
        };

        Some(PostureMetrics {
            head_forward_offset,
            shoulder_tilt_angle,
            head_tilt_angle,
            shoulder_twist_ratio,
            head_bow_ratio,
            shoulder_width,
            pixels_per_cm,
        })
    }

    fn landmark(&self, landmarks: &[Landmark], which: PoseLandmark) -> Option<Landmark> {
        landmarks
            .get(which.index())
            .filter(|lm| lm.is_usable(self.min_visibility))
            .copied()
    }

    fn collect_landmarks(&self, landmarks: &[Landmark]) -> Option<PostureLandmarks> {
        let missing = PoseLandmark::posture_landmarks()
            .into_iter()
            .find(|which| self.landmark(landmarks, *which).is_none());
        if let Some(which) = missing {
            tracing::debug!("Landmark {} unavailable, skipping frame", which.name());
            return None;
        }

        let pair = |left: PoseLandmark, right: PoseLandmark| -> Option<(Landmark, Landmark)> {
            Some(Landmark::ordered_by_x(
                self.landmark(landmarks, left)?,
                self.landmark(landmarks, right)?,
            ))
        };

        let (left_eye_inner, right_eye_inner) =
            pair(PoseLandmark::LeftEyeInner, PoseLandmark::RightEyeInner)?;
        let (left_ear, right_ear) = pair(PoseLandmark::LeftEar, PoseLandmark::RightEar)?;
        let (left_shoulder, right_shoulder) =
            pair(PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder)?;

        Some(PostureLandmarks {
            nose: self.landmark(landmarks, PoseLandmark::Nose)?,
            left_eye_inner,
            right_eye_inner,
            left_ear,
            right_ear,
            left_shoulder,
            right_shoulder,
        })
    }
}

impl Default for MetricsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::POSE_LANDMARK_COUNT;

    fn set(landmarks: &mut [Landmark], which: PoseLandmark, x: f64, y: f64, z: f64) {
        landmarks[which.index()] = Landmark::new(x, y, z).with_visibility(0.99);
    }

    /// Upright, camera-facing pose
    fn create_test_landmarks() -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0).with_visibility(0.9); POSE_LANDMARK_COUNT];
        set(&mut landmarks, PoseLandmark::Nose, 0.5, 0.30, -0.3);
        set(&mut landmarks, PoseLandmark::LeftEyeInner, 0.52, 0.28, -0.3);
        set(&mut landmarks, PoseLandmark::RightEyeInner, 0.48, 0.28, -0.3);
        set(&mut landmarks, PoseLandmark::LeftEar, 0.56, 0.30, 0.0);
        set(&mut landmarks, PoseLandmark::RightEar, 0.44, 0.30, 0.0);
        set(&mut landmarks, PoseLandmark::LeftShoulder, 0.65, 0.50, 0.0);
        set(&mut landmarks, PoseLandmark::RightShoulder, 0.35, 0.50, 0.0);
        landmarks
    }

    #[test]
    fn test_upright_pose_metrics() {
        let extractor = MetricsExtractor::new();
        let metrics = extractor.extract(&create_test_landmarks()).unwrap();

        assert!((metrics.shoulder_width - 0.30).abs() < 1e-9);
        assert!(metrics.head_forward_offset.abs() < 1e-9);
        assert!(metrics.shoulder_tilt_angle.abs() < 1e-9);
        assert!(metrics.head_tilt_angle.abs() < 1e-9);
        assert!(metrics.shoulder_twist_ratio.abs() < 1e-9);
        assert!(metrics.head_bow_ratio.abs() < 1e-9);
        assert!((metrics.pixels_per_cm - 0.04 / 6.3).abs() < 1e-9);
    }

    #[test]
    fn test_forward_head_and_twist() {
        let extractor = MetricsExtractor::new();
        let mut landmarks = create_test_landmarks();
        set(&mut landmarks, PoseLandmark::LeftEar, 0.56, 0.30, -0.09);
        set(&mut landmarks, PoseLandmark::RightEar, 0.44, 0.30, -0.09);
        set(&mut landmarks, PoseLandmark::LeftShoulder, 0.65, 0.50, 0.03);

        let metrics = extractor.extract(&landmarks).unwrap();

        // Ear midpoint z = -0.09, shoulder midpoint z = 0.015
        assert!((metrics.head_forward_offset - 0.105 / 0.30).abs() < 1e-9);
        assert!((metrics.shoulder_twist_ratio - 0.03 / 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_head_bow_ratio_drops_when_nose_lowers() {
        let extractor = MetricsExtractor::new();
        let mut landmarks = create_test_landmarks();
        set(&mut landmarks, PoseLandmark::Nose, 0.5, 0.36, -0.3);

        let metrics = extractor.extract(&landmarks).unwrap();
        assert!((metrics.head_bow_ratio - (-0.06 / 0.12)).abs() < 1e-9);
    }

    #[test]
    fn test_swapped_labels_give_same_metrics() {
        let extractor = MetricsExtractor::new();
        let landmarks = create_test_landmarks();
        let mut swapped = landmarks.clone();
        swapped.swap(PoseLandmark::LeftShoulder.index(), PoseLandmark::RightShoulder.index());
        swapped.swap(PoseLandmark::LeftEar.index(), PoseLandmark::RightEar.index());

        assert_eq!(extractor.extract(&landmarks), extractor.extract(&swapped));
    }

    #[test]
    fn test_missing_landmark_is_unavailable() {
        let extractor = MetricsExtractor::new();
        let landmarks = create_test_landmarks();
        assert!(extractor.extract(&landmarks[..PoseLandmark::RightShoulder.index()]).is_none());
    }

    #[test]
    fn test_low_visibility_is_unavailable() {
        let extractor = MetricsExtractor::new();
        let mut landmarks = create_test_landmarks();
        landmarks[PoseLandmark::LeftEar.index()].visibility = Some(0.1);
        assert!(extractor.extract(&landmarks).is_none());
        assert!(extractor.clone().with_min_visibility(0.05).extract(&landmarks).is_some());
    }

    #[test]
    fn test_collapsed_shoulders_are_unavailable() {
        let extractor = MetricsExtractor::new();
        let mut landmarks = create_test_landmarks();
        set(&mut landmarks, PoseLandmark::LeftShoulder, 0.503, 0.50, 0.0);
        set(&mut landmarks, PoseLandmark::RightShoulder, 0.497, 0.50, 0.0);
        assert!(extractor.extract(&landmarks).is_none());
    }
}
