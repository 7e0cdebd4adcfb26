use std::path::Path;

use dotflash_core::{MotionSample, SignalPanel};
use serde::{Deserialize, Serialize};

use crate::dots::ControlShift;
use crate::error::{ConfigWarning, Result, TrialError};

/// Parameters of one moving-dots trial. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Maximum initial distance of a dot from screen center, in px.
    pub max_initial_distance: u32,
    pub flash_duration: u64,
    pub pre_flash_duration: u64,
    pub post_flash_duration: u64,
    pub initial_control_level: i32,
    pub control_change_level: i32,
    /// Bottom offsets of the three indicator boxes, in px.
    pub diode_heights: [i32; 3],
    pub practice_trial: bool,
    pub playback: Vec<MotionSample>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            max_initial_distance: 45,
            flash_duration: 200,
            pre_flash_duration: 2500,
            post_flash_duration: 1500,
            initial_control_level: 100,
            control_change_level: 30,
            diode_heights: [10, 70, 130],
            practice_trial: false,
            playback: Vec::new(),
        }
    }
}

impl TrialConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Total trial length in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.pre_flash_duration
            .saturating_add(self.post_flash_duration)
    }

    /// Upper bound on rendered frames at the given display rate.
    pub fn required_playback_frames(&self, refresh_hz: f64) -> usize {
        (self.total_duration_ms() as f64 * refresh_hz / 1000.0).ceil() as usize
    }

    /// Rejects configurations the trial cannot run with.
    pub fn validate(&self, refresh_hz: f64) -> Result<()> {
        for (field, value) in [
            ("initial_control_level", self.initial_control_level),
            ("control_change_level", self.control_change_level),
        ] {
            if !(0..=100).contains(&value) {
                return Err(TrialError::InvalidLevel { field, value });
            }
        }

        if !refresh_hz.is_finite() || refresh_hz <= 0.0 {
            return Err(TrialError::InvalidRefreshRate { refresh_hz });
        }

        let required = self.required_playback_frames(refresh_hz);
        if self.playback.len() < required {
            return Err(TrialError::PlaybackTooShort {
                available: self.playback.len(),
                required,
            });
        }
        Ok(())
    }

    /// Combinations the trial runs with but leaves undefined.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if ControlShift::for_initial_level(self.initial_control_level).is_none() {
            warnings.push(ConfigWarning::NoControlShift {
                initial_control_level: self.initial_control_level,
            });
        }
        let panel = SignalPanel::for_flash(
            self.practice_trial,
            self.initial_control_level,
            self.control_change_level,
        );
        if panel.is_dark() {
            warnings.push(ConfigWarning::DarkSignalPanel {
                initial_control_level: self.initial_control_level,
                control_change_level: self.control_change_level,
            });
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_playback(frames: usize) -> TrialConfig {
        TrialConfig {
            playback: vec![MotionSample::new(1, 0); frames],
            ..TrialConfig::default()
        }
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config = TrialConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TrialConfig::default());
        assert_eq!(config.total_duration_ms(), 4000);
        assert_eq!(config.diode_heights, [10, 70, 130]);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = TrialConfig::from_json_str(
            r#"{"initial_control_level": 0, "control_change_level": 70,
                "playback": [{"dx": 1, "dy": -2}]}"#,
        )
        .unwrap();
        assert_eq!(config.initial_control_level, 0);
        assert_eq!(config.control_change_level, 70);
        assert_eq!(config.playback, vec![MotionSample::new(1, -2)]);
        assert_eq!(config.pre_flash_duration, 2500);
    }

    #[test]
    fn negative_durations_are_rejected_by_parsing() {
        let err = TrialConfig::from_json_str(r#"{"flash_duration": -5}"#).unwrap_err();
        assert!(matches!(err, TrialError::Json(_)));
    }

    #[test]
    fn playback_must_cover_every_frame() {
        assert_eq!(with_playback(0).required_playback_frames(60.0), 240);
        assert!(with_playback(240).validate(60.0).is_ok());
        match with_playback(239).validate(60.0) {
            Err(TrialError::PlaybackTooShort {
                available,
                required,
            }) => {
                assert_eq!(available, 239);
                assert_eq!(required, 240);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_length_trial_needs_no_playback() {
        let config = TrialConfig {
            pre_flash_duration: 0,
            post_flash_duration: 0,
            ..TrialConfig::default()
        };
        assert!(config.validate(144.0).is_ok());
    }

    #[test]
    fn unusable_refresh_rates_are_rejected() {
        for refresh_hz in [0.0, -60.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    TrialConfig::default().validate(refresh_hz),
                    Err(TrialError::InvalidRefreshRate { .. })
                ),
                "{refresh_hz}"
            );
        }
    }

    #[test]
    fn huge_durations_do_not_overflow() {
        let config = TrialConfig {
            pre_flash_duration: u64::MAX - 1,
            post_flash_duration: 10,
            ..TrialConfig::default()
        };
        assert_eq!(config.total_duration_ms(), u64::MAX);
        assert!(matches!(
            config.validate(60.0),
            Err(TrialError::PlaybackTooShort { available: 0, .. })
        ));
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let config = TrialConfig {
            control_change_level: 130,
            ..with_playback(240)
        };
        assert!(matches!(
            config.validate(60.0),
            Err(TrialError::InvalidLevel {
                field: "control_change_level",
                value: 130
            })
        ));
    }

    #[test]
    fn documented_combinations_have_no_warnings() {
        for (initial, change) in [(100, 30), (100, 70), (100, 100), (0, 30), (0, 70), (0, 100)] {
            let config = TrialConfig {
                initial_control_level: initial,
                control_change_level: change,
                ..TrialConfig::default()
            };
            assert!(config.warnings().is_empty(), "{initial}/{change}");
        }
    }

    #[test]
    fn undocumented_levels_warn() {
        let config = TrialConfig {
            initial_control_level: 50,
            control_change_level: 30,
            ..TrialConfig::default()
        };
        assert_eq!(
            config.warnings(),
            vec![
                ConfigWarning::NoControlShift {
                    initial_control_level: 50
                },
                ConfigWarning::DarkSignalPanel {
                    initial_control_level: 50,
                    control_change_level: 30
                },
            ]
        );
    }
}
