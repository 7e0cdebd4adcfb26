use serde::{Deserialize, Serialize};

/// Padding added to vector magnitudes so a zero vector never divides by zero.
pub const SPEED_EPSILON: f64 = 0.00001;

/// One frame's pointer displacement, live or recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotionSample {
    pub dx: i32,
    pub dy: i32,
}

impl MotionSample {
    pub const ZERO: MotionSample = MotionSample { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn as_vector(&self) -> (f64, f64) {
        (self.dx as f64, self.dy as f64)
    }
}

impl From<(i32, i32)> for MotionSample {
    fn from((dx, dy): (i32, i32)) -> Self {
        Self { dx, dy }
    }
}

/// Blends live pointer motion with a recorded trace.
///
/// Both vectors are normalized by their own epsilon-padded magnitude and the
/// unit directions are mixed with weight `control` for the live one and
/// `1 - control` for the recorded one. The mix is scaled by the live speed,
/// so the result always moves as fast as the participant does and only its
/// direction follows the recording. A motionless participant therefore
/// yields a (near) zero offset whatever the recording says.
pub fn blend(live: (f64, f64), recorded: (f64, f64), control: f64) -> (f64, f64) {
    let live_speed = live.0.hypot(live.1) + SPEED_EPSILON;
    let live_unit = (live.0 / live_speed, live.1 / live_speed);

    let recorded_speed = recorded.0.hypot(recorded.1) + SPEED_EPSILON;
    let recorded_unit = (recorded.0 / recorded_speed, recorded.1 / recorded_speed);

    let x = control * live_unit.0 + (1.0 - control) * recorded_unit.0;
    let y = control * live_unit.1 + (1.0 - control) * recorded_unit.1;

    (x * live_speed, y * live_speed)
}

/// [`blend`] over integer samples.
pub fn blend_samples(live: MotionSample, recorded: MotionSample, control: f64) -> (f64, f64) {
    blend(live.as_vector(), recorded.as_vector(), control)
}
