use std::time::Duration;

use dotflash_core::{FrameView, SignalPanel, TrialOutput, TrialPhase};
use dotflash_timing::Timer;
use tracing::{debug, info, trace, warn};

use crate::input::InputSource;
use crate::state::TrialState;
use crate::timeline::TimelineEvent;

/// Requests the next frame from the host display loop.
pub trait Scheduler {
    fn schedule_next(&mut self);
    fn cancel(&mut self);
}

/// Draws a frame view.
pub trait RenderSink {
    fn render(&mut self, view: &FrameView<'_>) -> anyhow::Result<()>;
}

pub type CompletionCallback = Box<dyn FnOnce(TrialOutput)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The frame was rendered and the next one scheduled.
    Continue,
    /// The trial is over; nothing more will be scheduled.
    Finished,
}

/// Drives one trial frame by frame.
pub struct FrameLoop<T, I, S, R>
where
    T: Timer,
    I: InputSource,
    S: Scheduler,
    R: RenderSink,
{
    pub trial: TrialState,
    pub timer: T,
    pub input: I,
    pub scheduler: S,
    pub sink: R,
    on_complete: Option<CompletionCallback>,
    start_ns: Option<u64>,
    last_frame_ns: Option<u64>,
    finished: bool,
}

impl<T, I, S, R> FrameLoop<T, I, S, R>
where
    T: Timer,
    I: InputSource,
    S: Scheduler,
    R: RenderSink,
{
    pub fn new(
        trial: TrialState,
        timer: T,
        input: I,
        scheduler: S,
        sink: R,
        on_complete: impl FnOnce(TrialOutput) + 'static,
    ) -> Self {
        for warning in trial.config.warnings() {
            warn!(%warning, "trial configuration");
        }
        Self {
            trial,
            timer,
            input,
            scheduler,
            sink,
            on_complete: Some(Box::new(on_complete)),
            start_ns: None,
            last_frame_ns: None,
            finished: false,
        }
    }

    /// Starts the trial clock, captures input, draws the initial dots and
    /// runs the first step.
    pub fn start(&mut self) -> anyhow::Result<StepOutcome> {
        let now = self.timer.now();
        self.start_ns = Some(now);
        self.input.acquire();
        if let Err(e) = self.sink.render(&self.trial.view()) {
            self.abort();
            return Err(e);
        }
        info!(
            dots = self.trial.dots.len(),
            playback = self.trial.cursor.remaining(),
            "trial started"
        );
        self.step()
    }

    /// One frame of the simulation.
    pub fn step(&mut self) -> anyhow::Result<StepOutcome> {
        if self.finished {
            return Ok(StepOutcome::Finished);
        }

        let now = self.timer.now();
        let start = *self.start_ns.get_or_insert(now);
        if let Some(last) = self.last_frame_ns.replace(now) {
            self.timer
                .record_frame(Duration::from_nanos(now.saturating_sub(last)));
        }

        let live = self.input.take();
        let events = self.trial.tick(now.saturating_sub(start));
        if events.contains(&TimelineEvent::Finished) {
            self.finalize();
            return Ok(StepOutcome::Finished);
        }

        if let Err(e) = self.trial.update_dots(live) {
            self.abort();
            return Err(e.into());
        }
        if let Err(e) = self.sink.render(&self.trial.view()) {
            self.abort();
            return Err(e);
        }
        self.trial.record_frame(live);
        trace!(
            frame = self.trial.frames_rendered(),
            dx = live.dx,
            dy = live.dy,
            phase = self.trial.phase().label(),
            "frame"
        );

        self.scheduler.schedule_next();
        Ok(StepOutcome::Continue)
    }

    fn finalize(&mut self) {
        if self.finished {
            return;
        }
        self.stop();

        let stats = self.timer.frame_stats();
        info!(
            frames = self.trial.frames_rendered(),
            fps = %format!("{:.1}", stats.effective_fps),
            jitter_ms = %format!("{:.3}", stats.jitter_ns / 1_000_000.0),
            "trial complete"
        );

        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self.trial.output());
        }
    }

    /// Ends the trial without delivering its output.
    pub fn abort(&mut self) {
        if self.finished {
            return;
        }
        self.stop();
        debug!(frames = self.trial.frames_rendered(), "trial aborted");
    }

    fn stop(&mut self) {
        self.finished = true;
        self.scheduler.cancel();
        self.input.release();
        self.trial.signals = SignalPanel::dark();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn phase(&self) -> TrialPhase {
        self.trial.phase()
    }
}
