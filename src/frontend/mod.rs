//! ES 201 108 advanced front-end feature extraction.
//!
//! Each completed frame from [`crate::frame::FrameAssembler`] is run through
//! offset-compensated log-energy, pre-emphasis, a Hamming window, zero-padding
//! to the FFT length, the magnitude FFT, the Mel filter bank, log, and the
//! DCT, in that fixed order.

pub mod fft;
pub mod mel;
pub mod window;

use num_complex::Complex32;

use crate::frame::FRAME_LENGTH;
use mel::{CEPSTRAL_COEFFS, ENERGY_FLOOR};

pub const FFT_LENGTH: usize = 512;
const PRE_EMPHASIS: f32 = 0.97;

/// Per-frame DSP stage, wired as the consumer of [`crate::frame::FrameAssembler`].
/// Holds the real working buffer plus a complex FFT scratch buffer, both
/// reused frame to frame instead of allocated per call.
pub struct FrontEnd {
    working: [f32; FFT_LENGTH],
    fft_scratch: [Complex32; FFT_LENGTH],
}

impl Default for FrontEnd {
    fn default() -> Self {
        Self {
            working: [0.0; FFT_LENGTH],
            fft_scratch: [Complex32::new(0.0, 0.0); FFT_LENGTH],
        }
    }
}

/// Output of one frame's feature extraction, before noise-floor snapshotting
/// and numbering.
pub struct RawFeatures {
    pub log_energy: f32,
    pub cepstrum: [f32; CEPSTRAL_COEFFS],
}

impl FrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_frame(&mut self, frame: &[f32; FRAME_LENGTH]) -> RawFeatures {
        self.working[..FRAME_LENGTH].copy_from_slice(frame);

        // 1. Log-energy (ES 201 108 §4.2.5).
        let energy: f32 = self.working[..FRAME_LENGTH].iter().map(|x| x * x).sum();
        let log_energy = (energy + ENERGY_FLOOR).ln();

        // 2. Pre-emphasis (ES 201 108 §4.2.6).
        for i in (1..FRAME_LENGTH).rev() {
            self.working[i] -= PRE_EMPHASIS * self.working[i - 1];
        }
        self.working[0] = 0.0;

        // 3. Hamming window (ES 201 108 §4.2.7).
        let mut frame_buf: [f32; FRAME_LENGTH] = self.working[..FRAME_LENGTH].try_into().unwrap();
        window::apply(&mut frame_buf);
        self.working[..FRAME_LENGTH].copy_from_slice(&frame_buf);

        // 4. Zero-pad to the FFT length.
        for x in self.working[FRAME_LENGTH..].iter_mut() {
            *x = 0.0;
        }

        // 5. Magnitude FFT (ES 201 108 §4.2.8); only bins 0..=256 are used.
        fft::abs_fft_into(&mut self.working, &mut self.fft_scratch);

        // 6-7. Mel filter bank + log (ES 201 108 §4.2.9-4.2.10).
        let log_bank = mel::log_filter_bank(&self.working[..=FFT_LENGTH / 2]);

        // 8. DCT (ES 201 108 §4.2.11).
        let cepstrum = mel::dct(&log_bank);

        RawFeatures {
            log_energy,
            cepstrum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_yields_floor_log_energy_and_finite_cepstrum() {
        let mut fe = FrontEnd::new();
        let frame = [0.0f32; FRAME_LENGTH];
        let out = fe.process_frame(&frame);
        assert!((out.log_energy - ENERGY_FLOOR.ln()).abs() < 1e-3);
        for c in out.cepstrum {
            assert!(c.is_finite());
        }
    }

    #[test]
    fn sinusoid_yields_large_positive_c0() {
        let mut fe = FrontEnd::new();
        let mut frame = [0.0f32; FRAME_LENGTH];
        for (i, s) in frame.iter_mut().enumerate() {
            *s = 10_000.0 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 16_000.0).sin();
        }
        let out = fe.process_frame(&frame);
        assert!(out.cepstrum[0] > 0.0);
        assert!(out.cepstrum[1..].iter().any(|&c| c.abs() > 1e-6));
    }
}
