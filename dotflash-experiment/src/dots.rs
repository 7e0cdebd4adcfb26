use std::f64::consts::TAU;

use dotflash_core::{Dot, MotionSample, blend_samples};
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{Result, TrialError};

pub const DOT_COUNT: usize = 10;
/// Minimum distance between any two dots at placement, in px.
pub const MIN_SEPARATION: f64 = 7.0;
/// Candidates tried per dot before placement is declared impossible.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;
/// The dot that flashes and has its control changed.
pub const FLASH_INDEX: usize = 0;

/// Direction of the one-time control change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlShift {
    Increase,
    Decrease,
}

impl ControlShift {
    /// Full control loses control, zero control gains it; other levels are undefined.
    pub fn for_initial_level(initial_control_level: i32) -> Option<Self> {
        match initial_control_level {
            100 => Some(ControlShift::Decrease),
            0 => Some(ControlShift::Increase),
            _ => None,
        }
    }

    fn apply(&self, control: f64, delta: f64) -> f64 {
        match self {
            ControlShift::Increase => control + delta,
            ControlShift::Decrease => control - delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DotField {
    dots: Vec<Dot>,
}

impl DotField {
    /// Scatters `count` dots around `center` by rejection sampling.
    pub fn initialize<R: Rng>(
        rng: &mut R,
        center: (f64, f64),
        count: usize,
        max_distance: f64,
        initial_control: f64,
    ) -> Result<Self> {
        let mut dots: Vec<Dot> = Vec::with_capacity(count);

        for placed in 0..count {
            let candidate = (0..MAX_PLACEMENT_ATTEMPTS)
                .map(|_| {
                    let angle = rng.random_range(0.0..TAU);
                    let distance = if max_distance > 0.0 {
                        rng.random_range(0.0..max_distance)
                    } else {
                        0.0
                    };
                    Dot::new(
                        center.0 + distance * angle.cos(),
                        center.1 + distance * angle.sin(),
                        initial_control,
                    )
                })
                .find(|c| dots.iter().all(|d| d.distance_to(c) >= MIN_SEPARATION));

            match candidate {
                Some(dot) => dots.push(dot),
                None => {
                    return Err(TrialError::DotPlacement {
                        placed,
                        max_distance,
                    });
                }
            }
        }

        debug!(count, max_distance, "dots placed");
        Ok(Self { dots })
    }

    pub fn from_dots(dots: Vec<Dot>) -> Self {
        Self { dots }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Dot> {
        self.dots.get(index)
    }

    /// Moves every dot by the same pair of vectors, weighted by its own control.
    pub fn update(&mut self, live: MotionSample, recorded: MotionSample) {
        for dot in &mut self.dots {
            let offset = blend_samples(live, recorded, dot.control_fraction());
            dot.translate(offset);
        }
    }

    /// Shifts one dot's control by `delta`. Returns the new level.
    pub fn apply_control_change(
        &mut self,
        index: usize,
        delta: f64,
        shift: ControlShift,
    ) -> Option<f64> {
        let dot = self.dots.get_mut(index)?;
        dot.control = shift.apply(dot.control, delta);
        if !(0.0..=100.0).contains(&dot.control) {
            warn!(index, control = dot.control, "control left the 0-100 range");
        }
        Some(dot.control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn field() -> DotField {
        DotField::from_dots(vec![Dot::new(0.0, 0.0, 100.0), Dot::new(10.0, 0.0, 0.0)])
    }

    #[test]
    fn placement_respects_separation_and_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = DotField::initialize(&mut rng, (400.0, 300.0), DOT_COUNT, 45.0, 100.0).unwrap();
        assert_eq!(field.len(), DOT_COUNT);
        for (i, a) in field.dots().iter().enumerate() {
            assert!((a.x - 400.0).hypot(a.y - 300.0) <= 45.0);
            assert_eq!(a.control, 100.0);
            for b in &field.dots()[i + 1..] {
                assert!(a.distance_to(b) >= MIN_SEPARATION);
            }
        }
    }

    #[test]
    fn impossible_placement_fails_fast() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = DotField::initialize(&mut rng, (0.0, 0.0), DOT_COUNT, 3.0, 100.0).unwrap_err();
        match err {
            TrialError::DotPlacement { placed, .. } => assert!(placed >= 1 && placed < DOT_COUNT),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn single_dot_fits_in_zero_radius() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = DotField::initialize(&mut rng, (5.0, 5.0), 1, 0.0, 0.0).unwrap();
        assert_eq!(field.dots()[0].position(), (5.0, 5.0));
    }

    #[test]
    fn update_weights_each_dot_by_its_control() {
        let mut field = field();
        field.update(MotionSample::new(3, 4), MotionSample::new(-4, 3));

        let full = field.dots()[0];
        assert!((full.x - 3.0).abs() < 1e-3 && (full.y - 4.0).abs() < 1e-3);

        let none = field.dots()[1];
        assert!((none.x - (10.0 - 4.0)).abs() < 1e-3 && (none.y - 3.0).abs() < 1e-3);
    }

    #[test]
    fn control_shift_follows_initial_level() {
        assert_eq!(ControlShift::for_initial_level(100), Some(ControlShift::Decrease));
        assert_eq!(ControlShift::for_initial_level(0), Some(ControlShift::Increase));
        assert_eq!(ControlShift::for_initial_level(50), None);

        let mut field = field();
        assert_eq!(field.apply_control_change(0, 30.0, ControlShift::Decrease), Some(70.0));
        assert_eq!(field.apply_control_change(1, 70.0, ControlShift::Increase), Some(70.0));
        assert_eq!(field.apply_control_change(5, 10.0, ControlShift::Increase), None);
    }

    #[test]
    fn control_is_not_clamped() {
        let mut field = field();
        assert_eq!(field.apply_control_change(1, 30.0, ControlShift::Decrease), Some(-30.0));
    }
}
