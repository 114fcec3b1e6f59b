//! JSON-lines landmark recordings
//!
//! One event per line. Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use posture_coach::models::Landmark;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedEvent {
    /// Landmarks for one camera frame, in model index order
    Frame {
        timestamp_ms: u64,
        landmarks: Vec<Landmark>,
    },
    /// User asked to capture the current posture as the baseline
    Calibrate { timestamp_ms: u64 },
    /// User reset the session
    Reset { timestamp_ms: u64 },
}

impl RecordedEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            RecordedEvent::Frame { timestamp_ms, .. }
            | RecordedEvent::Calibrate { timestamp_ms }
            | RecordedEvent::Reset { timestamp_ms } => *timestamp_ms,
        }
    }

    /// Parse one recording line; `Ok(None)` for blank and comment lines
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let event = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid event on line {}", line_number))?;
        Ok(Some(event))
    }
}

/// Read a whole recording, failing on the first malformed line
pub fn read_recording(path: &Path) -> Result<Vec<RecordedEvent>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open recording {}", path.display()))?;

    let mut events = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if let Some(event) = RecordedEvent::parse_line(&line, index + 1)? {
            events.push(event);
        }
    }

    tracing::debug!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}
