//! Sliding-window frame assembler.
//!
//! A fixed-size circular buffer of `FRAME_LENGTH` samples. Every time
//! `SHIFT_INTERVAL` new samples have arrived since the last frame, the
//! circular layout is straightened into a linear scratch buffer and handed
//! to the caller for feature extraction.

pub const FRAME_LENGTH: usize = 400;
pub const SHIFT_INTERVAL: usize = 160;

pub struct FrameAssembler {
    buffer: [f32; FRAME_LENGTH],
    next: usize,
    samps: usize,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; FRAME_LENGTH],
            next: 0,
            samps: 0,
        }
    }

    pub fn reset(&mut self) {
        self.buffer = [0.0; FRAME_LENGTH];
        self.next = 0;
        self.samps = 0;
    }

    /// Append one sample. Whenever a frame completes, `on_frame` is invoked
    /// with the straightened 400-sample frame in natural time order.
    pub fn push(&mut self, sample: f32, mut on_frame: impl FnMut(&[f32; FRAME_LENGTH])) {
        self.buffer[self.next] = sample;
        self.next = (self.next + 1) % FRAME_LENGTH;
        self.samps += 1;
        if self.samps == FRAME_LENGTH {
            let mut straightened = [0.0f32; FRAME_LENGTH];
            let mut index = self.next;
            for slot in straightened.iter_mut() {
                *slot = self.buffer[index];
                index = (index + 1) % FRAME_LENGTH;
            }
            on_frame(&straightened);
            self.samps -= SHIFT_INTERVAL;
        }
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_after_frame_length_samples() {
        let mut fa = FrameAssembler::new();
        let mut frames = 0;
        for i in 0..FRAME_LENGTH - 1 {
            fa.push(i as f32, |_| frames += 1);
        }
        assert_eq!(frames, 0);
        fa.push(999.0, |_| frames += 1);
        assert_eq!(frames, 1);
    }

    #[test]
    fn subsequent_frames_every_shift_interval() {
        let mut fa = FrameAssembler::new();
        let mut frame_count = 0;
        for i in 0..(FRAME_LENGTH + 4 * SHIFT_INTERVAL) {
            fa.push(i as f32, |_| frame_count += 1);
        }
        // One frame at FRAME_LENGTH, then one every SHIFT_INTERVAL after.
        assert_eq!(frame_count, 5);
    }

    #[test]
    fn frame_contents_are_in_time_order() {
        let mut fa = FrameAssembler::new();
        let mut last_frame = None;
        for i in 0..FRAME_LENGTH {
            fa.push(i as f32, |frame| last_frame = Some(*frame));
        }
        let frame = last_frame.unwrap();
        for (i, &v) in frame.iter().enumerate() {
            assert_eq!(v, i as f32);
        }
    }
}
