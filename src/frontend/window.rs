//! Hamming window (ES 201 108 §4.2.7).

use once_cell::sync::Lazy;
use std::f32::consts::PI;

use crate::frame::FRAME_LENGTH;

static HAMMING: Lazy<[f32; FRAME_LENGTH]> = Lazy::new(|| {
    let mut w = [0.0f32; FRAME_LENGTH];
    for (i, slot) in w.iter_mut().enumerate() {
        *slot = 0.54 - 0.46 * (2.0 * PI * i as f32 / (FRAME_LENGTH as f32 - 1.0)).cos();
    }
    w
});

/// Multiplies `frame` in place by the precomputed Hamming window.
pub fn apply(frame: &mut [f32; FRAME_LENGTH]) {
    for (x, w) in frame.iter_mut().zip(HAMMING.iter()) {
        *x *= w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_sums_to_expected_constant() {
        let sum: f32 = HAMMING.iter().sum();
        // sum_i (0.54 - 0.46*cos(2*pi*i/(N-1))) = 0.54*N - 0.46*sum(cos(...))
        let cos_sum: f32 = (0..FRAME_LENGTH)
            .map(|i| (2.0 * PI * i as f32 / (FRAME_LENGTH as f32 - 1.0)).cos())
            .sum();
        let expected = 0.54 * FRAME_LENGTH as f32 - 0.46 * cos_sum;
        assert!((sum - expected).abs() < 1e-4);
    }

    #[test]
    fn endpoints_are_near_the_0_08_floor() {
        let mut frame = [1.0f32; FRAME_LENGTH];
        apply(&mut frame);
        assert!((frame[0] - 0.08).abs() < 1e-3);
        assert!((frame[FRAME_LENGTH - 1] - 0.08).abs() < 1e-3);
        assert!((frame[FRAME_LENGTH / 2] - 1.0).abs() < 1e-3);
    }
}
