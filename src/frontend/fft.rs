//! Radix-2 decimation-in-time FFT.
//!
//! Implemented iteratively with an in-place bit-reversal permutation rather
//! than the reference implementation's recursion. [`abs_fft_into`] takes a
//! caller-owned complex scratch buffer sized to `FFT_LENGTH` so the per-frame
//! pipeline (`FrontEnd::process_frame`) never allocates.

use num_complex::Complex32;
use std::f32::consts::PI;

/// Computes the DFT of `buf` in place: `buf[k] = sum_n buf[n] * e^{-2*pi*i*n*k/N}`.
/// `buf.len()` must be a power of two.
pub fn fft_in_place(buf: &mut [Complex32]) {
    let n = buf.len();
    assert!(n.is_power_of_two() && n > 0, "fft length must be a power of two");

    bit_reverse_permute(buf);

    let mut len = 2usize;
    while len <= n {
        let half = len / 2;
        let angle_step = -2.0 * PI / (len as f32);
        let mut start = 0;
        while start < n {
            for k in 0..half {
                let w = Complex32::from_polar(1.0, angle_step * k as f32);
                let u = buf[start + k];
                let v = buf[start + k + half] * w;
                buf[start + k] = u + v;
                buf[start + k + half] = u - v;
            }
            start += len;
        }
        len <<= 1;
    }
}

fn bit_reverse_permute(buf: &mut [Complex32]) {
    let n = buf.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            buf.swap(i, j);
        }
    }
}

/// Computes the magnitude spectrum of a real-valued frame, in place, using
/// `scratch` as the complex working buffer: on return `real[i]` holds
/// `|FFT(real)[i]|`. `real.len()` must be a power of two and `scratch.len()`
/// must equal `real.len()`.
pub fn abs_fft_into(real: &mut [f32], scratch: &mut [Complex32]) {
    debug_assert_eq!(real.len(), scratch.len());
    for (dst, &x) in scratch.iter_mut().zip(real.iter()) {
        *dst = Complex32::new(x, 0.0);
    }
    fft_in_place(scratch);
    for (dst, c) in real.iter_mut().zip(scratch.iter()) {
        *dst = c.norm();
    }
}

/// Convenience wrapper over [`abs_fft_into`] that allocates its own scratch
/// buffer; used by tests and other one-off callers outside the per-frame
/// pipeline.
pub fn abs_fft(real: &mut [f32]) {
    let mut scratch = vec![Complex32::new(0.0, 0.0); real.len()];
    abs_fft_into(real, &mut scratch);
}
