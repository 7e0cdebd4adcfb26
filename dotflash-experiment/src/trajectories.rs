use std::path::Path;

use dotflash_core::MotionSample;
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, TrialError};

/// Task name of moving-dots records in a session export.
pub const SESSION_TASK: &str = "movingdots";
/// Records taken from each session export.
pub const RECORDS_PER_SESSION: usize = 20;

/// Recorded pointer traces to play back, one per past trial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectorySet {
    trajectories: Vec<Vec<MotionSample>>,
}

#[derive(Debug, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    mouse_data: Option<Vec<MotionSample>>,
}

impl TrajectorySet {
    pub fn new(trajectories: Vec<Vec<MotionSample>>) -> Self {
        Self { trajectories }
    }

    /// Parses a JSON array of traces. A `const name = [...];` script
    /// wrapper around the array is accepted too.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let body = strip_script_wrapper(text)?;
        let trajectories: Vec<Vec<MotionSample>> = serde_json::from_str(body)?;
        debug!(count = trajectories.len(), "trajectory set parsed");
        Ok(Self { trajectories })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Extracts traces from a raw session export: the `mouse_data` of the
    /// first moving-dots records.
    pub fn from_session_records(text: &str) -> Result<Self> {
        let records: Vec<SessionRecord> = serde_json::from_str(text)?;
        let trajectories = records
            .into_iter()
            .filter(|r| r.task.as_deref() == Some(SESSION_TASK))
            .take(RECORDS_PER_SESSION)
            .map(|r| r.mouse_data.unwrap_or_default())
            .collect();
        Ok(Self { trajectories })
    }

    /// Appends another set, keeping order.
    pub fn extend(&mut self, other: TrajectorySet) {
        self.trajectories.extend(other.trajectories);
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[MotionSample]> {
        self.trajectories.get(index).map(Vec::as_slice)
    }

    /// A uniformly random trace.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<(usize, &[MotionSample])> {
        if self.trajectories.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.trajectories.len());
        self.get(index).map(|t| (index, t))
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.trajectories)?)
    }
}

fn strip_script_wrapper(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        return Ok(trimmed);
    }
    let start = trimmed
        .find('[')
        .ok_or_else(|| TrialError::Trajectory("no JSON array found".into()))?;
    let end = trimmed
        .rfind(']')
        .filter(|end| *end > start)
        .ok_or_else(|| TrialError::Trajectory("unterminated JSON array".into()))?;
    Ok(&trimmed[start..=end])
}
