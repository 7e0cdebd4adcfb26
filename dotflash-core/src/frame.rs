use crate::dot::Dot;
use crate::phase::TrialPhase;
use crate::signal::SignalPanel;

/// Everything a renderer needs to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub dots: &'a [Dot],
    pub flash_index: usize,
    /// True only while the timeline is in `Flashing`.
    pub highlight: bool,
    pub signals: SignalPanel,
    /// Pixel offsets of the indicator boxes from the bottom edge.
    pub diode_heights: [i32; 3],
    pub phase: TrialPhase,
}

impl FrameView<'_> {
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlight && index == self.flash_index
    }
}
