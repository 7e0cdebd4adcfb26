use dotflash_core::TrialPhase;
use tracing::info;

use crate::trial::{TrialDurations, TrialTimestamps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    FlashStarted,
    FlashEnded,
    Finished,
}

/// Pre-flash / flashing / post-flash state machine driven by elapsed time.
#[derive(Debug, Clone)]
pub struct Timeline {
    phase: TrialPhase,
    durations: TrialDurations,
    timestamps: TrialTimestamps,
}

impl Timeline {
    pub fn new(durations: TrialDurations) -> Self {
        Self {
            phase: TrialPhase::PreFlash,
            durations,
            timestamps: TrialTimestamps::default(),
        }
    }

    /// Evaluates the timeline once for a frame `elapsed_ns` after trial start.
    ///
    /// Termination is checked first, then the end of the flash, then its
    /// start. A trial that reaches its end before the flash fired (zero
    /// post-flash time, or a frame stalled across the whole window) still
    /// emits `FlashStarted` ahead of `Finished`.
    pub fn tick(&mut self, elapsed_ns: u64) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if self.phase.is_done() {
            return events;
        }

        if elapsed_ns >= self.durations.total_ns() {
            if self.timestamps.flash_start.is_none() {
                self.start_flash(elapsed_ns, &mut events);
            }
            self.phase = TrialPhase::Done;
            self.timestamps.finished = Some(elapsed_ns);
            events.push(TimelineEvent::Finished);
            info!(elapsed_ms = elapsed_ns / 1_000_000, "trial finished");
            return events;
        }

        if self.phase == TrialPhase::Flashing {
            if let Some(start_ns) = self.timestamps.flash_start {
                if elapsed_ns - start_ns >= self.durations.flash_ns() {
                    self.phase = TrialPhase::PostFlash;
                    self.timestamps.flash_end = Some(elapsed_ns);
                    events.push(TimelineEvent::FlashEnded);
                    info!(elapsed_ms = elapsed_ns / 1_000_000, "flash ended");
                }
            }
        }

        if self.phase == TrialPhase::PreFlash && elapsed_ns >= self.durations.pre_flash_ns() {
            self.start_flash(elapsed_ns, &mut events);
        }

        events
    }

    fn start_flash(&mut self, elapsed_ns: u64, events: &mut Vec<TimelineEvent>) {
        self.phase = TrialPhase::Flashing;
        self.timestamps.flash_start = Some(elapsed_ns);
        events.push(TimelineEvent::FlashStarted);
        info!(elapsed_ms = elapsed_ns / 1_000_000, "flash started");
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn is_flashing(&self) -> bool {
        self.phase.is_flashing()
    }

    pub fn has_flashed(&self) -> bool {
        self.timestamps.flash_start.is_some()
    }

    pub fn durations(&self) -> &TrialDurations {
        &self.durations
    }

    pub fn timestamps(&self) -> &TrialTimestamps {
        &self.timestamps
    }
}
