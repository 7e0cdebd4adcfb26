pub mod dot;
pub mod frame;
pub mod motion;
pub mod phase;
pub mod signal;
pub mod trial;

pub use dot::Dot;
pub use frame::FrameView;
pub use motion::{MotionSample, SPEED_EPSILON, blend, blend_samples};
pub use phase::TrialPhase;
pub use signal::{SignalIndicator, SignalPanel};
pub use trial::TrialOutput;
