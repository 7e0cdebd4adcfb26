use dotflash_core::{FrameView, MotionSample, SignalPanel, TrialOutput, TrialPhase};
use rand::Rng;
use tracing::{info, warn};

use super::config::TrialConfig;
use super::dots::{ControlShift, DOT_COUNT, DotField, FLASH_INDEX};
use super::playback::PlaybackCursor;
use super::timeline::{Timeline, TimelineEvent};
use super::trial::TrialDurations;
use crate::error::{Result, TrialError};

/// All mutable state of one running trial.
#[derive(Debug, Clone)]
pub struct TrialState {
    pub config: TrialConfig,
    pub dots: DotField,
    pub cursor: PlaybackCursor,
    pub timeline: Timeline,
    pub signals: SignalPanel,
    pub mouse_data: Vec<MotionSample>,
}

impl TrialState {
    /// Places the dots around `center` and rewinds the recording.
    pub fn new<R: Rng>(config: TrialConfig, rng: &mut R, center: (f64, f64)) -> Result<Self> {
        let dots = DotField::initialize(
            rng,
            center,
            DOT_COUNT,
            config.max_initial_distance as f64,
            config.initial_control_level as f64,
        )?;
        Ok(Self::with_dots(config, dots))
    }

    pub fn with_dots(config: TrialConfig, dots: DotField) -> Self {
        let cursor = PlaybackCursor::new(config.playback.clone());
        let timeline = Timeline::new(TrialDurations::from_config(&config));
        Self {
            config,
            dots,
            cursor,
            timeline,
            signals: SignalPanel::dark(),
            mouse_data: Vec::new(),
        }
    }

    /// Evaluates the timeline and applies what it fired.
    pub fn tick(&mut self, elapsed_ns: u64) -> Vec<TimelineEvent> {
        let events = self.timeline.tick(elapsed_ns);
        for event in &events {
            match event {
                TimelineEvent::FlashStarted => self.start_flash(),
                TimelineEvent::FlashEnded | TimelineEvent::Finished => {
                    self.signals = SignalPanel::dark();
                }
            }
        }
        events
    }

    fn start_flash(&mut self) {
        let initial = self.config.initial_control_level;
        let change = self.config.control_change_level;

        match ControlShift::for_initial_level(initial) {
            Some(shift) => {
                if let Some(control) =
                    self.dots
                        .apply_control_change(FLASH_INDEX, change as f64, shift)
                {
                    info!(dot = FLASH_INDEX, ?shift, control, "control changed");
                }
            }
            None => warn!(initial, "no control shift defined for this initial level"),
        }

        self.signals = SignalPanel::for_flash(self.config.practice_trial, initial, change);
        info!(signals = ?self.signals.active(), "signal panel lit");
    }

    /// Moves the dots by this frame's live input and recorded sample.
    pub fn update_dots(&mut self, live: MotionSample) -> Result<()> {
        let recorded = self
            .cursor
            .current()
            .ok_or(TrialError::PlaybackExhausted {
                frame: self.cursor.frame_index(),
            })?;
        self.dots.update(live, recorded);
        Ok(())
    }

    /// Appends the consumed live sample and moves to the next recorded one.
    pub fn record_frame(&mut self, live: MotionSample) {
        self.mouse_data.push(live);
        self.cursor.advance();
    }

    pub fn phase(&self) -> TrialPhase {
        self.timeline.phase()
    }

    pub fn frames_rendered(&self) -> usize {
        self.mouse_data.len()
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            dots: self.dots.dots(),
            flash_index: FLASH_INDEX,
            highlight: self.timeline.is_flashing(),
            signals: self.signals,
            diode_heights: self.config.diode_heights,
            phase: self.timeline.phase(),
        }
    }

    /// Output record; the control change is the configured value, not the applied one.
    pub fn output(&self) -> TrialOutput {
        TrialOutput {
            control_change: self.config.control_change_level,
            mouse_data: self.mouse_data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotflash_core::{Dot, SignalIndicator};

    const MS: u64 = 1_000_000;

    fn state(initial: i32, change: i32) -> TrialState {
        let config = TrialConfig {
            pre_flash_duration: 100,
            flash_duration: 50,
            post_flash_duration: 200,
            initial_control_level: initial,
            control_change_level: change,
            playback: vec![MotionSample::new(0, 1); 4],
            ..TrialConfig::default()
        };
        let dots = DotField::from_dots(vec![
            Dot::new(0.0, 0.0, initial as f64),
            Dot::new(20.0, 0.0, initial as f64),
        ]);
        TrialState::with_dots(config, dots)
    }

    #[test]
    fn flash_changes_only_the_flash_dot_and_lights_signals() {
        let mut state = state(100, 70);
        state.tick(0);
        assert!(state.signals.is_dark());

        state.tick(100 * MS);
        assert_eq!(state.dots.dots()[0].control, 30.0);
        assert_eq!(state.dots.dots()[1].control, 100.0);
        assert!(state.view().highlight);
        assert!(state.view().is_highlighted(0));
        assert!(!state.view().is_highlighted(1));
        assert_eq!(
            state.signals.active(),
            vec![SignalIndicator::Low, SignalIndicator::High]
        );

        state.tick(150 * MS);
        assert!(state.signals.is_dark());
        assert!(!state.view().highlight);
        assert_eq!(state.dots.dots()[0].control, 30.0);
    }

    #[test]
    fn zero_start_gains_control() {
        let mut state = state(0, 100);
        state.tick(100 * MS);
        assert_eq!(state.dots.dots()[0].control, 100.0);
        assert_eq!(
            state.signals.active(),
            vec![SignalIndicator::Mid, SignalIndicator::High]
        );
    }

    #[test]
    fn undefined_start_level_leaves_control_alone() {
        let mut state = state(50, 30);
        state.tick(100 * MS);
        assert_eq!(state.dots.dots()[0].control, 50.0);
        assert!(state.signals.is_dark());
    }

    #[test]
    fn exhausted_recording_is_an_error() {
        let mut state = state(100, 30);
        for _ in 0..4 {
            state.update_dots(MotionSample::ZERO).unwrap();
            state.record_frame(MotionSample::ZERO);
        }
        assert!(matches!(
            state.update_dots(MotionSample::ZERO),
            Err(TrialError::PlaybackExhausted { frame: 4 })
        ));
        assert_eq!(state.frames_rendered(), 4);
    }

    #[test]
    fn output_reports_configured_change() {
        let mut state = state(100, 70);
        state.record_frame(MotionSample::new(2, 3));
        let output = state.output();
        assert_eq!(output.control_change, 70);
        assert_eq!(output.mouse_data, vec![MotionSample::new(2, 3)]);
    }
}
