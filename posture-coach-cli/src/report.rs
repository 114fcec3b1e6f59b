//! Terminal and JSON-lines output for session events

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Stdout, Write};

use posture_coach::models::{CalibrationResult, ScoringMode};
use posture_coach::services::{FrameOutcome, SessionStats};

const GOOD_SCORE: u8 = 80;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReportLine<'a> {
    Score(&'a FrameOutcome),
    Calibration {
        timestamp_ms: u64,
        #[serde(flatten)]
        result: &'a CalibrationResult,
    },
    Alert {
        timestamp_ms: u64,
    },
    Reset {
        timestamp_ms: u64,
    },
    Summary {
        session_id: String,
        started_at: DateTime<Utc>,
        stats: &'a SessionStats,
    },
}

pub struct Reporter<W: Write = Stdout> {
    out: W,
    json: bool,
    quiet: bool,
    bad_posture_threshold: u8,
}

impl Reporter<Stdout> {
    pub fn new(json: bool, quiet: bool, bad_posture_threshold: u8) -> Self {
        Self::with_writer(io::stdout(), json, quiet, bad_posture_threshold)
    }
}

impl<W: Write> Reporter<W> {
    pub fn with_writer(out: W, json: bool, quiet: bool, bad_posture_threshold: u8) -> Self {
        Self {
            out,
            json,
            quiet,
            bad_posture_threshold,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Per-frame score line, suppressed with `--quiet`
    pub fn frame(&mut self, outcome: &FrameOutcome) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.json {
            return self.emit(&ReportLine::Score(outcome));
        }

        let score = match outcome.result.score {
            Some(score) => self.colored_score(score),
            None => " --".dimmed().to_string(),
        };
        let mode = match outcome.mode {
            ScoringMode::Calibrated => "[calibrated]",
            ScoringMode::Uncalibrated => "[guideline] ",
        };

        writeln!(
            self.out,
            "{:>8}ms  {}  {}  {}",
            outcome.timestamp_ms,
            score,
            mode.dimmed(),
            outcome.result.feedback
        )?;
        Ok(())
    }

    pub fn calibration(&mut self, timestamp_ms: u64, result: &CalibrationResult) -> Result<()> {
        if self.json {
            return self.emit(&ReportLine::Calibration {
                timestamp_ms,
                result,
            });
        }

        let message = if result.is_valid {
            format!("✓ {}", result.message).green()
        } else {
            format!("✗ {}", result.message).red()
        };
        writeln!(self.out, "{:>8}ms  {}", timestamp_ms, message)?;
        Ok(())
    }

    pub fn alert(&mut self, timestamp_ms: u64) -> Result<()> {
        if self.json {
            return self.emit(&ReportLine::Alert { timestamp_ms });
        }

        writeln!(
            self.out,
            "{:>8}ms  {}",
            timestamp_ms,
            "⚠ Bad posture for too long. Sit up straight!".red().bold()
        )?;
        Ok(())
    }

    pub fn reset(&mut self, timestamp_ms: u64) -> Result<()> {
        if self.json {
            return self.emit(&ReportLine::Reset { timestamp_ms });
        }

        writeln!(self.out, "{:>8}ms  {}", timestamp_ms, "↺ Session reset".cyan())?;
        Ok(())
    }

    pub fn summary(
        &mut self,
        session_id: impl ToString,
        started_at: DateTime<Utc>,
        stats: &SessionStats,
    ) -> Result<()> {
        if self.json {
            return self.emit(&ReportLine::Summary {
                session_id: session_id.to_string(),
                started_at,
                stats,
            });
        }

        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "{}", "Session Summary".bold())?;
        writeln!(out, "────────────────────────────────")?;
        writeln!(out, "Started:               {}", started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "Frames processed:      {}", stats.frames_processed)?;
        writeln!(out, "Frames without metrics: {}", stats.frames_without_metrics)?;
        writeln!(
            out,
            "Calibrations:          {} accepted, {} rejected",
            stats.calibrations_accepted, stats.calibrations_rejected
        )?;
        writeln!(out, "Alerts fired:          {}", stats.alerts_fired)?;
        writeln!(
            out,
            "Good posture time:     {:.1}s",
            stats.good_posture_ms as f64 / 1000.0
        )?;
        Ok(())
    }

    fn emit(&mut self, line: &ReportLine<'_>) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string(line)?)?;
        Ok(())
    }

    fn colored_score(&self, score: u8) -> String {
        let text = format!("{:>3}", score);
        if score >= GOOD_SCORE {
            text.green().to_string()
        } else if score >= self.bad_posture_threshold {
            text.yellow().to_string()
        } else {
            text.red().to_string()
        }
    }
}
