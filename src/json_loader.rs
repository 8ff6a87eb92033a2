//! JSON loader for a day's meetings.
//!
//! Accepts either a bare array of meetings or a schedule object with a
//! `meetings` array, the two shapes the calendar adapter writes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ResearchError;
use crate::types::Meeting;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeetingsFile {
    List(Vec<Meeting>),
    Schedule {
        #[serde(default)]
        meetings: Vec<Meeting>,
    },
}

/// Parse meetings from JSON text.
pub fn parse_meetings(content: &str) -> Result<Vec<Meeting>, ResearchError> {
    let parsed: MeetingsFile = serde_json::from_str(content)
        .map_err(|e| ResearchError::Parse(format!("Failed to parse meetings: {}", e)))?;
    Ok(match parsed {
        MeetingsFile::List(meetings) => meetings,
        MeetingsFile::Schedule { meetings } => meetings,
    })
}

/// Load meetings from a JSON file.
pub fn load_meetings(path: &Path) -> Result<Vec<Meeting>, ResearchError> {
    let content = fs::read_to_string(path)?;
    let meetings = parse_meetings(&content)?;
    log::info!("Loaded {} meetings from {}", meetings.len(), path.display());
    Ok(meetings)
}
