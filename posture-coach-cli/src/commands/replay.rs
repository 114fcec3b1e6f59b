use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use posture_coach::config::PostureConfig;
use posture_coach::services::{ManualTimer, PostureSession};

use super::apply_event;
use crate::recording::read_recording;
use crate::report::Reporter;

#[derive(Args)]
pub struct ReplayCommand {
    /// JSON-lines recording of frame, calibrate and reset events
    file: PathBuf,

    /// Print one JSON object per event instead of text
    #[arg(long)]
    json: bool,

    /// Only print calibrations, alerts and the summary
    #[arg(short, long)]
    quiet: bool,
}

impl ReplayCommand {
    pub async fn execute(self, config: PostureConfig) -> Result<()> {
        let events = read_recording(&self.file)?;
        let mut reporter = Reporter::new(self.json, self.quiet, config.alert.bad_posture_threshold);

        // Alert delays run on recording time, not wall time
        let mut session = PostureSession::new(&config, ManualTimer::new());
        tracing::info!(
            session_id = %session.id(),
            events = events.len(),
            "Replaying {}",
            self.file.display()
        );

        for event in events {
            let timestamp_ms = event.timestamp_ms();
            let elapsed = session
                .timer_mut()
                .advance_to(Duration::from_millis(timestamp_ms));
            for id in elapsed {
                if session.on_timer_elapsed(id) {
                    reporter.alert(timestamp_ms)?;
                }
            }

            apply_event(&mut session, event, &mut reporter)?;
        }

        reporter.summary(session.id(), session.started_at(), session.stats())
    }
}
