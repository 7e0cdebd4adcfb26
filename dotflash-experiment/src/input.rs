use dotflash_core::MotionSample;

/// Per-frame pointer deltas.
pub trait InputSource {
    /// Starts capturing. Called once when the trial starts.
    fn acquire(&mut self) {}
    /// Returns the motion since the last call and resets it to zero.
    fn take(&mut self) -> MotionSample;
    /// Stops capturing; later input is dropped.
    fn release(&mut self);
}

/// Sums raw device deltas between frames.
///
/// Deltas may be fractional; `take` hands out whole pixels and keeps the
/// remainder for the next frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerAccumulator {
    dx: f64,
    dy: f64,
    captured: bool,
}

impl PointerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, dx: f64, dy: f64) {
        if !self.captured {
            return;
        }
        self.dx += dx;
        self.dy += dy;
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }
}

impl InputSource for PointerAccumulator {
    fn acquire(&mut self) {
        self.captured = true;
    }

    fn take(&mut self) -> MotionSample {
        let dx = self.dx.trunc();
        let dy = self.dy.trunc();
        self.dx -= dx;
        self.dy -= dy;
        MotionSample::new(dx as i32, dy as i32)
    }

    fn release(&mut self) {
        self.captured = false;
        self.dx = 0.0;
        self.dy = 0.0;
    }
}
