/// Feedback messages and message selection
///
/// Guideline feedback has a few wordings per bucket; which one is shown is
/// decided by a `MessagePicker` so tests can pin it down.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const INSUFFICIENT_DATA_FEEDBACK: &str =
    "Insufficient data: make sure your face and shoulders are visible to the camera.";

pub const MAINTAINING_BASELINE_FEEDBACK: &str =
    "You're maintaining your reference posture. Keep it up!";

pub const TURTLE_NECK_BACK_FEEDBACK: &str =
    "Your neck is pulled back too far. Relax your shoulders and neck.";
pub const LEFT_SHOULDER_LOW_FEEDBACK: &str = "Your left shoulder has dropped.";
pub const RIGHT_SHOULDER_LOW_FEEDBACK: &str = "Your right shoulder has dropped.";
pub const HEAD_TILTED_LEFT_FEEDBACK: &str = "Your head is tilted to the left.";
pub const HEAD_TILTED_RIGHT_FEEDBACK: &str = "Your head is tilted to the right.";
pub const SHOULDER_TWIST_FEEDBACK: &str = "Your body is turned. Please face the screen.";
pub const HEAD_BOW_FEEDBACK: &str = "You're bowing your head too much. Look up at the screen!";

/// Forward head message with the estimated displacement, when one is known
pub fn turtle_neck_forward_feedback(offset_cm: Option<f64>) -> String {
    match offset_cm {
        Some(cm) => format!(
            "Your neck is about {:.1}cm further forward than your reference posture.",
            cm
        ),
        None => "Your neck is further forward than your reference posture.".to_string(),
    }
}

/// Guideline feedback buckets, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuidelineBucket {
    BadTurtleNeck,
    MildTurtleNeck,
    BadShoulderTilt,
    MildShoulderTilt,
    Good,
}

impl GuidelineBucket {
    pub fn messages(&self) -> &'static [&'static str] {
        match self {
            Self::BadTurtleNeck => &[
                "Severe turtle neck! Pull your head back over your shoulders.",
                "Your head is far in front of your shoulders. Sit back and tuck your chin.",
                "Your neck is carrying a lot of weight right now. Straighten up!",
            ],
            Self::MildTurtleNeck => &[
                "Your head is drifting forward. Tuck your chin slightly.",
                "A little turtle neck is creeping in. Bring your ears over your shoulders.",
            ],
            Self::BadShoulderTilt => &[
                "Your shoulders are clearly uneven. Level them out.",
                "You're leaning hard to one side. Sit up evenly.",
            ],
            Self::MildShoulderTilt => &[
                "Your shoulders are slightly tilted.",
                "Try to keep both shoulders at the same height.",
            ],
            Self::Good => &[
                "Great posture! Keep it up.",
                "Nice and upright. Well done!",
                "Your posture looks good.",
            ],
        }
    }
}

/// Chooses one of `choices` message variants
pub trait MessagePicker {
    /// Returns an index in `0..choices`; `choices` is never zero
    fn pick(&mut self, choices: usize) -> usize;
}

/// Uniform random selection
#[derive(Debug, Clone)]
pub struct RandomPicker<R = StdRng> {
    rng: R,
}

impl RandomPicker<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomPicker<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> MessagePicker for RandomPicker<R> {
    fn pick(&mut self, choices: usize) -> usize {
        self.rng.gen_range(0..choices.max(1))
    }
}

/// Always picks the same variant, clamped to the available range
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl MessagePicker for FixedPicker {
    fn pick(&mut self, choices: usize) -> usize {
        self.0.min(choices.saturating_sub(1))
    }
}

/// Pick a message for a guideline bucket
pub fn pick_message(bucket: GuidelineBucket, picker: &mut dyn MessagePicker) -> &'static str {
    let messages = bucket.messages();
    let index = picker.pick(messages.len()).min(messages.len() - 1);
    messages[index]
}
