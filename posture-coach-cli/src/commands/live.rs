use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use posture_coach::config::PostureConfig;
use posture_coach::services::{PostureSession, TokioTimer};

use super::apply_event;
use crate::recording::RecordedEvent;
use crate::report::Reporter;

#[derive(Args)]
pub struct LiveCommand {
    /// Print one JSON object per event instead of text
    #[arg(long)]
    json: bool,

    /// Only print calibrations, alerts and the summary
    #[arg(short, long)]
    quiet: bool,
}

impl LiveCommand {
    /// Score events from stdin until EOF or Ctrl-C
    pub async fn execute(self, config: PostureConfig) -> Result<()> {
        let mut reporter =
            Reporter::new(self.json, self.quiet, config.alert.bad_posture_threshold);
        run_live(&config, BufReader::new(tokio::io::stdin()), &mut reporter).await
    }
}

/// Score events read from `input` with real alert timers, then print the summary
pub async fn run_live<R, W>(
    config: &PostureConfig,
    input: R,
    reporter: &mut Reporter<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (timer, mut elapsed) = TokioTimer::new();
    let mut session = PostureSession::new(config, timer);

    let mut lines = input.lines();
    let mut line_number = 0;
    // Alerts are reported on the event clock, not wall time
    let mut last_timestamp_ms = 0;

    tracing::info!(session_id = %session.id(), "Reading landmark events");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read landmark events")? else {
                    break;
                };
                line_number += 1;
                if let Some(event) = RecordedEvent::parse_line(&line, line_number)? {
                    last_timestamp_ms = event.timestamp_ms();
                    apply_event(&mut session, event, reporter)?;
                }
            }
            Some(id) = elapsed.recv() => {
                if session.on_timer_elapsed(id) {
                    reporter.alert(last_timestamp_ms)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping");
                break;
            }
        }
    }

    session.deactivate();
    reporter.summary(session.id(), session.started_at(), session.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_coach::models::{Landmark, PoseLandmark, POSE_LANDMARK_COUNT};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    /// 20 degree shoulder tilt with the head pushed toward the camera
    fn slumped_line(timestamp_ms: u64) -> String {
        let mut landmarks = vec![Landmark::new(0.5, 0.8, 0.0).with_visibility(0.9); POSE_LANDMARK_COUNT];
        let theta = 20.0_f64.to_radians();
        let (dx, dy) = (0.15 * theta.cos(), 0.15 * theta.sin());

        for (which, x, y, z) in [
            (PoseLandmark::RightShoulder, 0.5 - dx, 0.5 - dy, 0.0),
            (PoseLandmark::LeftShoulder, 0.5 + dx, 0.5 + dy, 0.0),
            (PoseLandmark::RightEar, 0.44, 0.30, -0.2),
            (PoseLandmark::LeftEar, 0.56, 0.30, -0.2),
            (PoseLandmark::RightEyeInner, 0.48, 0.27, -0.5),
            (PoseLandmark::LeftEyeInner, 0.52, 0.27, -0.5),
            (PoseLandmark::Nose, 0.5, 0.30, -0.5),
        ] {
            landmarks[which.index()] = Landmark::new(x, y, z).with_visibility(0.95);
        }

        let event = RecordedEvent::Frame {
            timestamp_ms,
            landmarks,
        };
        format!("{}\n", serde_json::to_string(&event).unwrap())
    }

    fn json_lines(out: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_is_stamped_with_last_event_time() {
        let config = PostureConfig::default();
        let mut reporter = Reporter::with_writer(Vec::new(), true, true, 50);
        let (mut writer, reader) = tokio::io::duplex(1 << 16);

        // Keep the stream open past the 5s alert delay, then close it
        let feed = async move {
            for timestamp_ms in [1000, 1033] {
                writer.write_all(slumped_line(timestamp_ms).as_bytes()).await.unwrap();
            }
            tokio::time::sleep(Duration::from_secs(6)).await;
            drop(writer);
        };

        let (result, ()) = tokio::join!(
            run_live(&config, BufReader::new(reader), &mut reporter),
            feed
        );
        result.unwrap();

        let lines = json_lines(reporter.into_inner());
        let alert = lines.iter().find(|line| line["type"] == "alert").unwrap();
        assert_eq!(alert["timestamp_ms"], 1033);

        let summary = lines.last().unwrap();
        assert_eq!(summary["type"], "summary");
        assert_eq!(summary["stats"]["frames_processed"], 2);
        assert_eq!(summary["stats"]["alerts_fired"], 1);
    }

    #[tokio::test]
    async fn test_stops_at_end_of_input() {
        let config = PostureConfig::default();
        let mut reporter = Reporter::with_writer(Vec::new(), true, false, 50);
        let input = format!("{}{}\n", slumped_line(0), r#"{"type":"reset","timestamp_ms":10}"#);

        run_live(&config, BufReader::new(input.as_bytes()), &mut reporter)
            .await
            .unwrap();

        let types: Vec<String> = json_lines(reporter.into_inner())
            .iter()
            .map(|line| line["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(types, ["score", "reset", "summary"]);
    }
}
