use serde::{Deserialize, Serialize};

use crate::motion::MotionSample;

/// Record handed to the completion callback when a trial ends
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrialOutput {
    /// Configured control change, reported verbatim.
    pub control_change: i32,
    /// One live pointer sample per rendered frame, oldest first.
    pub mouse_data: Vec<MotionSample>,
}

impl TrialOutput {
    pub fn frame_count(&self) -> usize {
        self.mouse_data.len()
    }
}
