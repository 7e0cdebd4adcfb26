use std::fmt;

use thiserror::Error;

pub type Result<T, E = TrialError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TrialError {
    #[error("{field} must be within 0..=100, got {value}")]
    InvalidLevel { field: &'static str, value: i32 },

    #[error("refresh rate must be a positive number of Hz, got {refresh_hz}")]
    InvalidRefreshRate { refresh_hz: f64 },

    #[error("playback has {available} samples but the trial may render up to {required} frames")]
    PlaybackTooShort { available: usize, required: usize },

    #[error("playback exhausted at frame {frame}")]
    PlaybackExhausted { frame: usize },

    #[error(
        "could not place dot {placed} within {max_distance} px of center while keeping the minimum separation"
    )]
    DotPlacement { placed: usize, max_distance: f64 },

    #[error("trajectory set: {0}")]
    Trajectory(String),

    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

/// Configuration the trial can run with but whose behavior is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Initial level other than 0 or 100: the flash dot's control is left alone.
    NoControlShift { initial_control_level: i32 },
    /// No indicator is defined for this pair: the panel stays dark.
    DarkSignalPanel {
        initial_control_level: i32,
        control_change_level: i32,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::NoControlShift {
                initial_control_level,
            } => write!(
                f,
                "initial_control_level {initial_control_level} has no control shift; the flash dot keeps its control"
            ),
            ConfigWarning::DarkSignalPanel {
                initial_control_level,
                control_change_level,
            } => write!(
                f,
                "no signal pattern for initial {initial_control_level} / change {control_change_level}; indicators stay dark"
            ),
        }
    }
}
