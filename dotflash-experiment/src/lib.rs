pub mod config;
pub mod dots;
pub mod error;
pub mod frame_loop;
pub mod input;
pub mod playback;
pub mod state;
pub mod timeline;
pub mod trajectories;
pub mod trial;

pub use config::TrialConfig;
pub use dots::{ControlShift, DOT_COUNT, DotField, FLASH_INDEX, MIN_SEPARATION};
pub use error::{ConfigWarning, TrialError};
pub use frame_loop::{FrameLoop, RenderSink, Scheduler, StepOutcome};
pub use input::{InputSource, PointerAccumulator};
pub use playback::PlaybackCursor;
pub use state::TrialState;
pub use timeline::{Timeline, TimelineEvent};
pub use trajectories::TrajectorySet;
pub use trial::{TrialDurations, TrialTimestamps};
