pub mod render;

pub use render::{RenderStats, SkiaRenderer};
