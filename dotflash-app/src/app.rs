use anyhow::{Context, Result, anyhow};
use dotflash_core::{FrameView, MotionSample, TrialOutput};
use dotflash_experiment::{
    FrameLoop, InputSource, PointerAccumulator, RenderSink, Scheduler, StepOutcome, TrajectorySet,
    TrialConfig, TrialState,
};
use dotflash_render::SkiaRenderer;
use dotflash_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Fullscreen, Window, WindowId},
};

use crate::Args;

type TrialLoop = FrameLoop<HighPrecisionTimer, LockedPointer, RedrawScheduler, PixelsSink>;

/// Schedules frames through the window's redraw requests.
pub struct RedrawScheduler {
    window: Arc<Window>,
    pending: bool,
}

impl Scheduler for RedrawScheduler {
    fn schedule_next(&mut self) {
        self.pending = true;
        self.window.request_redraw();
    }

    fn cancel(&mut self) {
        self.pending = false;
    }
}

/// Raw pointer motion with the cursor locked and hidden.
pub struct LockedPointer {
    window: Arc<Window>,
    motion: PointerAccumulator,
}

impl LockedPointer {
    fn push(&mut self, dx: f64, dy: f64) {
        self.motion.accumulate(dx, dy);
    }
}

impl InputSource for LockedPointer {
    fn acquire(&mut self) {
        let grab = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grab {
            warn!(error = %e, "pointer lock unavailable");
        }
        self.window.set_cursor_visible(false);
        self.motion.acquire();
    }

    fn take(&mut self) -> MotionSample {
        self.motion.take()
    }

    fn release(&mut self) {
        self.motion.release();
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            debug!(error = %e, "pointer release failed");
        }
        self.window.set_cursor_visible(true);
    }
}

/// Draws into the pixels surface and presents it.
pub struct PixelsSink {
    pixels: Pixels<'static>,
    renderer: SkiaRenderer,
    timer: HighPrecisionTimer,
}

impl PixelsSink {
    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.renderer.resize(size.width, size.height)
    }
}

impl RenderSink for PixelsSink {
    fn render(&mut self, view: &FrameView<'_>) -> Result<()> {
        let stats = self
            .renderer
            .render_frame(view, self.pixels.frame_mut(), &self.timer)?;
        let now = self.timer.now();
        self.pixels.render()?;
        let present = self.timer.elapsed(now);

        trace!(
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            present_ms = present.as_secs_f64() * 1e3,
            "render"
        );
        Ok(())
    }
}

/// Picks the trial's playback from a trajectory set, by index or at random.
pub fn select_playback<R: Rng>(
    set: &TrajectorySet,
    index: Option<usize>,
    rng: &mut R,
) -> Result<(usize, Vec<MotionSample>)> {
    match index {
        Some(i) => set
            .get(i)
            .map(|trace| (i, trace.to_vec()))
            .ok_or_else(|| anyhow!("trajectory {i} out of range ({} available)", set.len())),
        None => set
            .choose(rng)
            .map(|(i, trace)| (i, trace.to_vec()))
            .ok_or_else(|| anyhow!("trajectory set is empty")),
    }
}

pub fn write_output(path: &Path, output: &TrialOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

pub struct App {
    args: Args,
    config: TrialConfig,
    frame_loop: Option<TrialLoop>,
    window: Option<Arc<Window>>,
    completion_tx: Sender<TrialOutput>,
    completion_rx: Receiver<TrialOutput>,
    refresh_rate: Option<f64>,
    failure: Option<anyhow::Error>,
    should_exit: bool,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => TrialConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TrialConfig::default(),
        };

        if let Some(path) = &args.trajectories {
            let set = TrajectorySet::load(path)
                .with_context(|| format!("loading trajectories {}", path.display()))?;
            let (index, playback) =
                select_playback(&set, args.trajectory_index, &mut rand::rng())?;
            info!(index, frames = playback.len(), of = set.len(), "playback selected");
            config.playback = playback;
        }

        let (completion_tx, completion_rx) = mpsc::channel();
        Ok(Self {
            args,
            config,
            frame_loop: None,
            window: None,
            completion_tx,
            completion_rx,
            refresh_rate: None,
            failure: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "dotflash starting; ESC aborts the trial"
        );

        event_loop.run_app(&mut self)?;

        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn create_window_and_trial(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("No monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);
        let refresh_hz = self.refresh_rate.unwrap_or(self.args.refresh_hz);
        self.config.validate(refresh_hz)?;

        let window_attributes = Window::default_attributes()
            .with_title("Dotflash")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor.clone()))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz,
            reported = self.refresh_rate.is_some(),
            "display configured"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        let sink = PixelsSink {
            pixels: Pixels::new(size.width, size.height, surface_texture)?,
            renderer: SkiaRenderer::new(size.width, size.height)?,
            timer: HighPrecisionTimer::new(),
        };

        let center = (size.width as f64 / 2.0, size.height as f64 / 2.0);
        let trial = TrialState::new(self.config.clone(), &mut rand::rng(), center)?;

        let tx = self.completion_tx.clone();
        let frame_loop = FrameLoop::new(
            trial,
            HighPrecisionTimer::new(),
            LockedPointer {
                window: window.clone(),
                motion: PointerAccumulator::new(),
            },
            RedrawScheduler {
                window: window.clone(),
                pending: false,
            },
            sink,
            move |output| {
                if tx.send(output).is_err() {
                    warn!("trial output dropped");
                }
            },
        );

        self.window = Some(window);
        self.frame_loop = Some(frame_loop);
        Ok(())
    }

    fn start_trial(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };
        let outcome = frame_loop.start();
        self.handle_outcome(event_loop, outcome);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return;
        };
        if !frame_loop.scheduler.pending {
            return;
        }
        frame_loop.scheduler.pending = false;
        let outcome = frame_loop.step();
        self.handle_outcome(event_loop, outcome);
    }

    fn handle_outcome(&mut self, event_loop: &ActiveEventLoop, outcome: Result<StepOutcome>) {
        match outcome {
            Ok(StepOutcome::Continue) => {}
            Ok(StepOutcome::Finished) => {
                if let Ok(output) = self.completion_rx.try_recv() {
                    match write_output(&self.args.output, &output) {
                        Ok(()) => info!(
                            path = %self.args.output.display(),
                            frames = output.frame_count(),
                            control_change = output.control_change,
                            "trial output written"
                        ),
                        Err(e) => self.failure = Some(e),
                    }
                }
                self.exit(event_loop);
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "trial failed");
                self.failure = Some(e);
                self.exit(event_loop);
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(frame_loop) = &mut self.frame_loop {
            if let Err(e) = frame_loop.sink.resize(new_size) {
                warn!(error = %e, "resize failed");
            }
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(frame_loop) = &mut self.frame_loop {
            if !frame_loop.is_finished() {
                info!(phase = frame_loop.phase().label(), "trial aborted");
                frame_loop.abort();
            }
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match self.create_window_and_trial(event_loop) {
            Ok(()) => self.start_trial(event_loop),
            Err(e) => {
                error!(error = %format!("{e:#}"), "failed to set up trial");
                self.failure = Some(e);
                self.exit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.exit(event_loop)
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if let Some(frame_loop) = &mut self.frame_loop {
                frame_loop.input.push(dx, dy);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn set() -> TrajectorySet {
        TrajectorySet::new(vec![
            vec![MotionSample::new(1, 0)],
            vec![MotionSample::new(0, 1), MotionSample::new(0, 2)],
        ])
    }

    #[test]
    fn playback_by_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let (index, playback) = select_playback(&set(), Some(1), &mut rng).unwrap();
        assert_eq!(index, 1);
        assert_eq!(playback.len(), 2);
        assert!(select_playback(&set(), Some(2), &mut rng).is_err());
    }

    #[test]
    fn random_playback_comes_from_the_set() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = set();
        let (index, playback) = select_playback(&set, None, &mut rng).unwrap();
        assert_eq!(set.get(index), Some(playback.as_slice()));
        assert!(select_playback(&TrajectorySet::default(), None, &mut rng).is_err());
    }

    #[test]
    fn output_file_uses_wire_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let output = TrialOutput {
            control_change: 70,
            mouse_data: vec![MotionSample::new(2, -1)],
        };
        write_output(&path, &output).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["control_change"], 70);
        assert_eq!(value["mouse_data"][0]["dx"], 2);
    }
}
