/// Posture Scorer
///
/// Scores smoothed metrics in one of two modes:
/// - Calibrated: deviation from the user's baseline, weighted by severity,
///   with direction-aware feedback for every problem found
/// - Uncalibrated: absolute guideline bands for head offset and shoulder tilt,
///   with a single feedback message for the most important issue
///
/// Both modes start from 100 and subtract penalties.

use crate::config::{DeviationRule, GuidelineBand, GuidelineConfig, RelativeScoringConfig, ScoringConfig};
use crate::models::{Baseline, PostureMetrics, ScoreResult, ScoringMode};
use crate::services::feedback::{self, GuidelineBucket, MessagePicker};

const PERFECT_SCORE: f64 = 100.0;

/// |diff| at `tolerance * SEVERITY_SPAN` is maximum severity
const SEVERITY_SPAN: f64 = 5.0;

/// Head bow saturates faster than the other deviations
const HEAD_BOW_SEVERITY_SPAN: f64 = 3.0;

/// Kind of deviation from the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    TurtleNeck,
    ShoulderTilt,
    HeadTilt,
    ShoulderTwist,
    HeadBow,
}

/// A deviation that exceeded its tolerance
#[derive(Debug, Clone, PartialEq)]
pub struct PostureProblem {
    pub kind: ProblemKind,
    /// Normalized magnitude in (0, 1]
    pub severity: f64,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct PostureScorer {
    config: ScoringConfig,
}

impl PostureScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn mode(baseline: Option<&Baseline>) -> ScoringMode {
        match baseline {
            Some(_) => ScoringMode::Calibrated,
            None => ScoringMode::Uncalibrated,
        }
    }

    /// Score the current smoothed metrics, against the baseline when one is set
    pub fn score(
        &self,
        current: Option<&PostureMetrics>,
        baseline: Option<&Baseline>,
        picker: &mut dyn MessagePicker,
    ) -> ScoreResult {
        let Some(current) = current else {
            return ScoreResult::unavailable(feedback::INSUFFICIENT_DATA_FEEDBACK);
        };

        match baseline {
            Some(baseline) => self.score_against_baseline(current, &baseline.metrics),
            None => self.score_against_guidelines(current, picker),
        }
    }

    /// Calibrated mode
    pub fn score_against_baseline(
        &self,
        current: &PostureMetrics,
        reference: &PostureMetrics,
    ) -> ScoreResult {
        let problems = find_problems(&self.config.relative, current, reference);

        let penalty: f64 = problems
            .iter()
            .map(|p| p.severity * rule_for(&self.config.relative, p.kind).severity_multiplier)
            .sum();

        let feedback = if problems.is_empty() {
            feedback::MAINTAINING_BASELINE_FEEDBACK.to_string()
        } else {
            problems
                .iter()
                .map(|p| p.message.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };

        tracing::debug!(problems = problems.len(), penalty, "Scored against baseline");

        ScoreResult::scored(finalize_score(PERFECT_SCORE - penalty), feedback)
    }

    /// Uncalibrated mode
    pub fn score_against_guidelines(
        &self,
        current: &PostureMetrics,
        picker: &mut dyn MessagePicker,
    ) -> ScoreResult {
        let guideline = &self.config.guideline;
        let head_offset = current.head_forward_offset;
        let shoulder_tilt = current.shoulder_tilt_angle.abs();

        let penalty = band_penalty(&guideline.head_offset, head_offset)
            + band_penalty(&guideline.shoulder_tilt, shoulder_tilt);

        let bucket = guideline_bucket(guideline, head_offset, shoulder_tilt);
        let message = feedback::pick_message(bucket, picker);

        tracing::debug!(?bucket, penalty, "Scored against guidelines");

        ScoreResult::scored(finalize_score(PERFECT_SCORE - penalty), message)
    }
}

/// Collect baseline deviations, most severe first
pub fn find_problems(
    rules: &RelativeScoringConfig,
    current: &PostureMetrics,
    reference: &PostureMetrics,
) -> Vec<PostureProblem> {
    let mut problems = Vec::new();

    let turtle_diff = current.head_forward_offset - reference.head_forward_offset;
    if let Some(severity) = two_sided_severity(turtle_diff, &rules.turtle_neck) {
        let message = if turtle_diff > 0.0 {
            feedback::turtle_neck_forward_feedback(forward_offset_cm(turtle_diff, current))
        } else {
            feedback::TURTLE_NECK_BACK_FEEDBACK.to_string()
        };
        problems.push(PostureProblem {
            kind: ProblemKind::TurtleNeck,
            severity,
            message,
        });
    }

    // Positive tilt: the image-right shoulder sits lower, which is the user's
    // left in a mirrored frame
    let shoulder_diff = current.shoulder_tilt_angle - reference.shoulder_tilt_angle;
    if let Some(severity) = two_sided_severity(shoulder_diff, &rules.shoulder_tilt) {
        let message = if shoulder_diff > 0.0 {
            feedback::LEFT_SHOULDER_LOW_FEEDBACK
        } else {
            feedback::RIGHT_SHOULDER_LOW_FEEDBACK
        };
        problems.push(PostureProblem {
            kind: ProblemKind::ShoulderTilt,
            severity,
            message: message.to_string(),
        });
    }

    let head_diff = current.head_tilt_angle - reference.head_tilt_angle;
    if let Some(severity) = two_sided_severity(head_diff, &rules.head_tilt) {
        let message = if head_diff > 0.0 {
            feedback::HEAD_TILTED_LEFT_FEEDBACK
        } else {
            feedback::HEAD_TILTED_RIGHT_FEEDBACK
        };
        problems.push(PostureProblem {
            kind: ProblemKind::HeadTilt,
            severity,
            message: message.to_string(),
        });
    }

    let twist_diff = current.shoulder_twist_ratio - reference.shoulder_twist_ratio;
    if let Some(severity) = two_sided_severity(twist_diff, &rules.shoulder_twist) {
        problems.push(PostureProblem {
            kind: ProblemKind::ShoulderTwist,
            severity,
            message: feedback::SHOULDER_TWIST_FEEDBACK.to_string(),
        });
    }

    // Only bowing further than the baseline counts
    let bow_diff = current.head_bow_ratio - reference.head_bow_ratio;
    let bow = &rules.head_bow;
    if bow_diff < -bow.tolerance {
        problems.push(PostureProblem {
            kind: ProblemKind::HeadBow,
            severity: severity(bow_diff, bow.tolerance * HEAD_BOW_SEVERITY_SPAN),
            message: feedback::HEAD_BOW_FEEDBACK.to_string(),
        });
    }

    // Stable sort keeps check order among equal severities
    problems.sort_by(|a, b| b.severity.total_cmp(&a.severity));
    problems
}

fn rule_for(rules: &RelativeScoringConfig, kind: ProblemKind) -> &DeviationRule {
    match kind {
        ProblemKind::TurtleNeck => &rules.turtle_neck,
        ProblemKind::ShoulderTilt => &rules.shoulder_tilt,
        ProblemKind::HeadTilt => &rules.head_tilt,
        ProblemKind::ShoulderTwist => &rules.shoulder_twist,
        ProblemKind::HeadBow => &rules.head_bow,
    }
}

fn two_sided_severity(diff: f64, rule: &DeviationRule) -> Option<f64> {
    (diff.abs() > rule.tolerance).then(|| severity(diff, rule.tolerance * SEVERITY_SPAN))
}

fn severity(diff: f64, span: f64) -> f64 {
    (diff.abs() / span).min(1.0)
}

/// Estimated forward displacement in centimeters, unknown without an eye scale
fn forward_offset_cm(diff: f64, current: &PostureMetrics) -> Option<f64> {
    (current.pixels_per_cm > 0.0)
        .then(|| (diff * current.shoulder_width / current.pixels_per_cm).abs())
}

/// Zero at or below `good`, linear up to `max_penalty` at `bad`, flat beyond
fn band_penalty(band: &GuidelineBand, value: f64) -> f64 {
    if value >= band.bad {
        band.max_penalty
    } else if value > band.good {
        (value - band.good) / (band.bad - band.good) * band.max_penalty
    } else {
        0.0
    }
}

fn guideline_bucket(guideline: &GuidelineConfig, head_offset: f64, shoulder_tilt: f64) -> GuidelineBucket {
    if head_offset >= guideline.head_offset.bad {
        GuidelineBucket::BadTurtleNeck
    } else if head_offset > guideline.head_offset.good {
        GuidelineBucket::MildTurtleNeck
    } else if shoulder_tilt >= guideline.shoulder_tilt.bad {
        GuidelineBucket::BadShoulderTilt
    } else if shoulder_tilt > guideline.shoulder_tilt.good {
        GuidelineBucket::MildShoulderTilt
    } else {
        GuidelineBucket::Good
    }
}

fn finalize_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, PERFECT_SCORE) as u8
}
