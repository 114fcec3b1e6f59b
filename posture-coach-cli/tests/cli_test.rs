use assert_cmd::Command;
use posture_coach::models::{Landmark, PoseLandmark, POSE_LANDMARK_COUNT};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's config file and overrides
fn posture_coach(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("posture-coach").unwrap();
    cmd.env("POSTURE_COACH_CONFIG", dir.path().join("config.toml"))
        .env_remove("POSTURE_WINDOW_SIZE")
        .env_remove("POSTURE_BAD_THRESHOLD")
        .env_remove("POSTURE_ALERT_DELAY_MS")
        .env("NO_COLOR", "1");
    cmd
}

/// Frame event with the shoulders tilted and the head pushed toward the camera
fn frame_line(timestamp_ms: u64, tilt_degrees: f64, ear_depth: f64) -> String {
    let mut landmarks = vec![Landmark::new(0.5, 0.8, 0.0).with_visibility(0.9); POSE_LANDMARK_COUNT];
    let theta = tilt_degrees.to_radians();
    let (dx, dy) = (0.15 * theta.cos(), 0.15 * theta.sin());

    for (which, x, y, z) in [
        (PoseLandmark::RightShoulder, 0.5 - dx, 0.5 - dy, 0.0),
        (PoseLandmark::LeftShoulder, 0.5 + dx, 0.5 + dy, 0.0),
        (PoseLandmark::RightEar, 0.44, 0.30, ear_depth),
        (PoseLandmark::LeftEar, 0.56, 0.30, ear_depth),
        (PoseLandmark::RightEyeInner, 0.48, 0.27, ear_depth - 0.3),
        (PoseLandmark::LeftEyeInner, 0.52, 0.27, ear_depth - 0.3),
        (PoseLandmark::Nose, 0.5, 0.30, ear_depth - 0.3),
    ] {
        landmarks[which.index()] = Landmark::new(x, y, z).with_visibility(0.95);
    }

    serde_json::json!({
        "type": "frame",
        "timestamp_ms": timestamp_ms,
        "landmarks": landmarks,
    })
    .to_string()
}

fn write_recording(dir: &Path, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join("session.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    posture_coach(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Posture scoring"))
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("live"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    posture_coach(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let dir = TempDir::new().unwrap();
    posture_coach(&dir)
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_posture__coach"))
        .stdout(predicate::str::contains("complete -F"));
}

#[test]
fn test_replay_json_reports_scores_and_calibration() {
    let dir = TempDir::new().unwrap();
    let recording = write_recording(
        dir.path(),
        &[
            frame_line(0, 0.0, 0.0),
            frame_line(33, 0.0, 0.0),
            r#"{"type":"calibrate","timestamp_ms":40}"#.to_string(),
            frame_line(66, 0.0, 0.0),
        ],
    );

    posture_coach(&dir)
        .arg("replay")
        .arg(&recording)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"score""#))
        .stdout(predicate::str::contains(r#""score":100"#))
        .stdout(predicate::str::contains(r#""is_valid":true"#))
        .stdout(predicate::str::contains(r#""mode":"calibrated""#))
        .stdout(predicate::str::contains(r#""calibrations_accepted":1"#));
}

#[test]
fn test_replay_fires_alert_after_sustained_slump() {
    let dir = TempDir::new().unwrap();
    let lines: Vec<String> = (0..=60)
        .map(|i| frame_line(i * 100, 20.0, -0.2))
        .collect();
    let recording = write_recording(dir.path(), &lines);

    posture_coach(&dir)
        .arg("replay")
        .arg(&recording)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sit up straight"))
        .stdout(predicate::str::is_match(r"Alerts fired:\s+1\n").unwrap());
}

#[test]
fn test_replay_rejects_malformed_line() {
    let dir = TempDir::new().unwrap();
    let recording = write_recording(
        dir.path(),
        &[frame_line(0, 0.0, 0.0), "{not json".to_string()],
    );

    posture_coach(&dir)
        .arg("replay")
        .arg(&recording)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_replay_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    posture_coach(&dir)
        .arg("replay")
        .arg(dir.path().join("missing.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open recording"));
}

#[test]
fn test_live_reads_events_from_stdin() {
    let dir = TempDir::new().unwrap();
    let input = [
        frame_line(0, 0.0, 0.0),
        frame_line(33, 0.0, 0.0),
        r#"{"type":"calibrate","timestamp_ms":40}"#.to_string(),
    ]
    .join("\n");

    posture_coach(&dir)
        .arg("live")
        .arg("--quiet")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reference posture saved"))
        .stdout(predicate::str::is_match(r"Frames processed:\s+2\n").unwrap())
        .stdout(predicate::str::is_match(r"Calibrations:\s+1 accepted, 0 rejected").unwrap());
}

#[test]
fn test_oversized_window_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    let recording = write_recording(dir.path(), &[frame_line(0, 0.0, 0.0)]);

    posture_coach(&dir)
        .env("POSTURE_WINDOW_SIZE", "1000000000000")
        .arg("replay")
        .arg(&recording)
        .assert()
        .failure()
        .stderr(predicate::str::contains("smoothing.window_size must be within"));
}

#[test]
fn test_config_path_follows_env() {
    let dir = TempDir::new().unwrap();
    posture_coach(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    posture_coach(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(dir.path().join("config.toml").exists());

    posture_coach(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Use --force to overwrite"));

    posture_coach(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("window_size = 15"));
}
