use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PostureError, Result};

/// Full posture pipeline configuration (`~/.posture-coach/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostureConfig {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub calibration: CalibrationBounds,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub alert: AlertConfig,
}

/// Landmark acceptance and geometry constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Landmarks reporting a lower visibility count as missing
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f64,

    /// Shoulder separations below this produce no metrics
    #[serde(default = "default_min_shoulder_width")]
    pub min_shoulder_width: f64,

    /// Assumed adult interpupillary distance
    #[serde(default = "default_interpupillary_distance_cm")]
    pub interpupillary_distance_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Number of recent samples averaged
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

/// Absolute bounds a pose must satisfy to become the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBounds {
    #[serde(default = "default_max_tilt_degrees")]
    pub max_shoulder_tilt_degrees: f64,

    #[serde(default = "default_max_tilt_degrees")]
    pub max_head_tilt_degrees: f64,

    #[serde(default = "default_max_head_forward")]
    pub max_head_forward_offset: f64,

    #[serde(default = "default_max_shoulder_twist")]
    pub max_shoulder_twist_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub relative: RelativeScoringConfig,

    #[serde(default)]
    pub guideline: GuidelineConfig,
}

/// Allowed deviation from the baseline and its score weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationRule {
    pub tolerance: f64,
    pub severity_multiplier: f64,
}

/// Per-metric rules for calibrated scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeScoringConfig {
    #[serde(default = "default_deviation_rule")]
    pub turtle_neck: DeviationRule,

    #[serde(default = "default_deviation_rule")]
    pub shoulder_tilt: DeviationRule,

    #[serde(default = "default_deviation_rule")]
    pub head_tilt: DeviationRule,

    #[serde(default = "default_deviation_rule")]
    pub shoulder_twist: DeviationRule,

    /// One-sided: only a lower head bow ratio than the baseline counts
    #[serde(default = "default_deviation_rule")]
    pub head_bow: DeviationRule,
}

/// Good/bad band with the penalty applied at or beyond `bad`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidelineBand {
    pub good: f64,
    pub bad: f64,
    pub max_penalty: f64,
}

/// Absolute bands for uncalibrated scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineConfig {
    #[serde(default = "default_head_offset_band")]
    pub head_offset: GuidelineBand,

    #[serde(default = "default_shoulder_tilt_band")]
    pub shoulder_tilt: GuidelineBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Scores below this arm the alert
    #[serde(default = "default_bad_posture_threshold")]
    pub bad_posture_threshold: u8,

    /// How long a low score must persist before alerting
    #[serde(default = "default_alert_delay_ms")]
    pub delay_ms: u64,
}

// Default value functions
fn default_min_visibility() -> f64 {
    0.5
}

fn default_min_shoulder_width() -> f64 {
    0.01
}

fn default_interpupillary_distance_cm() -> f64 {
    6.3
}

/// Largest accepted smoothing window (over a minute of frames at 30 fps)
pub const MAX_WINDOW_SIZE: usize = 2048;

fn default_window_size() -> usize {
    15
}

fn default_max_tilt_degrees() -> f64 {
    10.0
}

fn default_max_head_forward() -> f64 {
    1.0
}

fn default_max_shoulder_twist() -> f64 {
    0.15
}

fn default_deviation_rule() -> DeviationRule {
    DeviationRule {
        tolerance: 2.0,
        severity_multiplier: 30.0,
    }
}

fn default_head_offset_band() -> GuidelineBand {
    GuidelineBand {
        good: 0.08,
        bad: 0.15,
        max_penalty: 50.0,
    }
}

fn default_shoulder_tilt_band() -> GuidelineBand {
    GuidelineBand {
        good: 8.0,
        bad: 15.0,
        max_penalty: 30.0,
    }
}

fn default_bad_posture_threshold() -> u8 {
    50
}

fn default_alert_delay_ms() -> u64 {
    5000
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_visibility: default_min_visibility(),
            min_shoulder_width: default_min_shoulder_width(),
            interpupillary_distance_cm: default_interpupillary_distance_cm(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

impl Default for CalibrationBounds {
    fn default() -> Self {
        Self {
            max_shoulder_tilt_degrees: default_max_tilt_degrees(),
            max_head_tilt_degrees: default_max_tilt_degrees(),
            max_head_forward_offset: default_max_head_forward(),
            max_shoulder_twist_ratio: default_max_shoulder_twist(),
        }
    }
}

impl Default for RelativeScoringConfig {
    fn default() -> Self {
        Self {
            turtle_neck: default_deviation_rule(),
            shoulder_tilt: default_deviation_rule(),
            head_tilt: default_deviation_rule(),
            shoulder_twist: default_deviation_rule(),
            head_bow: default_deviation_rule(),
        }
    }
}

impl Default for GuidelineConfig {
    fn default() -> Self {
        Self {
            head_offset: default_head_offset_band(),
            shoulder_tilt: default_shoulder_tilt_band(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bad_posture_threshold: default_bad_posture_threshold(),
            delay_ms: default_alert_delay_ms(),
        }
    }
}

impl AlertConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl PostureConfig {
    /// Get config directory path (~/.posture-coach/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(PostureError::HomeDirNotFound)?;
        Ok(home.join(".posture-coach"))
    }

    /// Get config file path (~/.posture-coach/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| PostureError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: PostureConfig = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source| PostureError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(write_err)?;

        Ok(())
    }

    /// Apply `POSTURE_WINDOW_SIZE`, `POSTURE_BAD_THRESHOLD` and
    /// `POSTURE_ALERT_DELAY_MS` from the environment
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(window_size) = env_override("POSTURE_WINDOW_SIZE")? {
            self.smoothing.window_size = window_size;
        }
        if let Some(threshold) = env_override("POSTURE_BAD_THRESHOLD")? {
            self.alert.bad_posture_threshold = threshold;
        }
        if let Some(delay_ms) = env_override("POSTURE_ALERT_DELAY_MS")? {
            self.alert.delay_ms = delay_ms;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.min_visibility) {
            return Err(PostureError::InvalidConfig(format!(
                "detection.min_visibility must be within [0, 1], got {}",
                self.detection.min_visibility
            )));
        }
        // Negated comparisons so NaN is rejected too
        if !(self.detection.min_shoulder_width > 0.0) {
            return Err(PostureError::InvalidConfig(
                "detection.min_shoulder_width must be positive".to_string(),
            ));
        }
        if !(self.detection.interpupillary_distance_cm > 0.0) {
            return Err(PostureError::InvalidConfig(
                "detection.interpupillary_distance_cm must be positive".to_string(),
            ));
        }
        if !(1..=MAX_WINDOW_SIZE).contains(&self.smoothing.window_size) {
            return Err(PostureError::InvalidConfig(format!(
                "smoothing.window_size must be within [1, {MAX_WINDOW_SIZE}], got {}",
                self.smoothing.window_size
            )));
        }
        if self.alert.bad_posture_threshold > 100 {
            return Err(PostureError::InvalidConfig(format!(
                "alert.bad_posture_threshold must be within [0, 100], got {}",
                self.alert.bad_posture_threshold
            )));
        }

        let relative = &self.scoring.relative;
        for (name, rule) in [
            ("turtle_neck", relative.turtle_neck),
            ("shoulder_tilt", relative.shoulder_tilt),
            ("head_tilt", relative.head_tilt),
            ("shoulder_twist", relative.shoulder_twist),
            ("head_bow", relative.head_bow),
        ] {
            if !(rule.tolerance > 0.0) || !(rule.severity_multiplier >= 0.0) {
                return Err(PostureError::InvalidConfig(format!(
                    "scoring.relative.{name} needs a positive tolerance and a non-negative multiplier"
                )));
            }
        }

        let guideline = &self.scoring.guideline;
        for (name, band) in [
            ("head_offset", guideline.head_offset),
            ("shoulder_tilt", guideline.shoulder_tilt),
        ] {
            if !(band.bad > band.good) || !(band.max_penalty >= 0.0) {
                return Err(PostureError::InvalidConfig(format!(
                    "scoring.guideline.{name} needs good < bad and a non-negative max_penalty"
                )));
            }
        }

        Ok(())
    }
}

fn env_override<T: FromStr>(name: &'static str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PostureError::InvalidEnvOverride { name, value }),
        Err(_) => Ok(None),
    }
}
