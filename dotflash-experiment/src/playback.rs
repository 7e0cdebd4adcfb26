use dotflash_core::MotionSample;

/// Reads one recorded sample per rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCursor {
    samples: Vec<MotionSample>,
    frame: usize,
}

impl PlaybackCursor {
    pub fn new(samples: Vec<MotionSample>) -> Self {
        Self { samples, frame: 0 }
    }

    /// Sample for the current frame, `None` once the recording runs out.
    pub fn current(&self) -> Option<MotionSample> {
        self.sample_at(self.frame)
    }

    pub fn sample_at(&self, frame: usize) -> Option<MotionSample> {
        self.samples.get(frame).copied()
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn remaining(&self) -> usize {
        self.samples.len().saturating_sub(self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_recording_frame_by_frame() {
        let mut cursor = PlaybackCursor::new(vec![MotionSample::new(1, 2), MotionSample::new(3, 4)]);
        assert_eq!(cursor.current(), Some(MotionSample::new(1, 2)));
        cursor.advance();
        assert_eq!(cursor.frame_index(), 1);
        assert_eq!(cursor.current(), Some(MotionSample::new(3, 4)));
        assert_eq!(cursor.remaining(), 1);
        cursor.advance();
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.sample_at(0), Some(MotionSample::new(1, 2)));
    }
}
