// Posture pipeline services

pub mod metrics_extractor;
pub mod temporal_smoother;
pub mod reference_calibrator;
pub mod feedback;
pub mod posture_scorer;
pub mod alert_scheduler;
pub mod posture_session;

pub use metrics_extractor::MetricsExtractor;
pub use temporal_smoother::TemporalSmoother;
pub use reference_calibrator::{CalibrationRejection, ReferenceCalibrator};
pub use feedback::{FixedPicker, GuidelineBucket, MessagePicker, RandomPicker};
pub use posture_scorer::{PostureProblem, PostureScorer, ProblemKind};
pub use alert_scheduler::{AlertScheduler, AlertState, AlertTimer, ManualTimer, TimerId, TokioTimer};
pub use posture_session::{FrameOutcome, PostureSession, SessionStats};
