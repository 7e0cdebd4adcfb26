/// A single moving dot on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    /// Percentage (0-100) of live input this dot follows.
    pub control: f64,
}

impl Dot {
    pub fn new(x: f64, y: f64, control: f64) -> Self {
        Self { x, y, control }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Control as a blend weight in 0.0..=1.0 (unclamped).
    pub fn control_fraction(&self) -> f64 {
        self.control / 100.0
    }

    pub fn distance_to(&self, other: &Dot) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn translate(&mut self, offset: (f64, f64)) {
        self.x += offset.0;
        self.y += offset.1;
    }
}
