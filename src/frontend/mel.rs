//! Mel triangular filter bank and DCT (ES 201 108 §4.2.9-4.2.11).
//!
//! The filter bank is zero-indexed, which is an off-by-one shift from the
//! ES 201 108 text itself: `cbin[k+1]` is the center bin for `filter_bank[k]`.

use once_cell::sync::Lazy;
use std::f32::consts::PI;

pub const MEL_FILTERS: usize = 23;
pub const CEPSTRAL_COEFFS: usize = 13;
pub const ENERGY_FLOOR: f32 = 2e-22;

/// Center bin indices, precomputed for a 512-point FFT at 16 kHz.
pub const CBIN: [usize; MEL_FILTERS + 2] = [
    2, 5, 8, 11, 14, 18, 23, 27, 33, 38, 45, 52, 60, 69, 79, 89, 101, 115, 129, 145, 163, 183,
    205, 229, 256,
];

/// Applies the 23-band triangular Mel filter bank to the first 257 magnitude
/// bins (`spectrum[0..=256]`, inclusive, per Hermitian symmetry) of a 512-
/// point FFT, then takes the log of each band.
pub fn log_filter_bank(spectrum: &[f32]) -> [f32; MEL_FILTERS] {
    let mut bank = [0.0f32; MEL_FILTERS];
    for (k, slot) in bank.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        let (lo, mid, hi) = (CBIN[k], CBIN[k + 1], CBIN[k + 2]);
        for i in lo..=mid {
            acc += ((i - lo + 1) as f32 / (mid - lo + 1) as f32) * spectrum[i];
        }
        for i in (mid + 1)..=hi {
            acc += (1.0 - ((i - mid) as f32 / (hi - mid + 1) as f32)) * spectrum[i];
        }
        *slot = (acc + ENERGY_FLOOR).ln();
    }
    bank
}

static DCT_BASIS: Lazy<[[f32; MEL_FILTERS]; CEPSTRAL_COEFFS]> = Lazy::new(|| {
    let mut basis = [[0.0f32; MEL_FILTERS]; CEPSTRAL_COEFFS];
    for (i, row) in basis.iter_mut().enumerate() {
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = (PI * i as f32 * (j as f32 + 0.5) / MEL_FILTERS as f32).cos();
        }
    }
    basis
});

/// Naive DCT (no orthonormalization factor), spec §4.3 step 8.
pub fn dct(log_bank: &[f32; MEL_FILTERS]) -> [f32; CEPSTRAL_COEFFS] {
    let mut out = [0.0f32; CEPSTRAL_COEFFS];
    for (i, slot) in out.iter_mut().enumerate() {
        let row = &DCT_BASIS[i];
        *slot = log_bank.iter().zip(row.iter()).map(|(f, c)| f * c).sum();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_bank_weights_are_nonnegative_and_peak_at_center() {
        let mut spectrum = [0.0f32; 257];
        spectrum[60] = 1.0; // center bin of filter 12 (cbin[12]=60)
        let bank = log_filter_bank(&spectrum);
        // filter 12 should register the highest energy of all filters.
        let (idx, _) = bank
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_eq!(idx, 12);
    }

    #[test]
    fn dct_is_finite_for_silence() {
        let floor = [ENERGY_FLOOR.ln(); MEL_FILTERS];
        let c = dct(&floor);
        for v in c {
            assert!(v.is_finite());
        }
    }
}
