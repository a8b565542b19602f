//! First-order allpass section, the building block of a phaser.
//!
//!   a    = (tan(pi f / sr) - 1) / (tan(pi f / sr) + 1)
//!   y[n] = a * x[n] + x[n-1] - a * y[n-1]
//!
//! Unity gain at every frequency; the phase passes -90° at `f`. Sweeping
//! `f` across a cascade moves the notches formed when the output is mixed
//! back with the dry signal.

use std::f32::consts::PI;

#[derive(Default)]
pub struct FirstOrderAllpass {
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    #[inline]
    pub fn coefficient(freq_hz: f32, sample_rate: f32) -> f32 {
        let t = (PI * freq_hz.clamp(1.0, sample_rate * 0.49) / sample_rate).tan();
        (t - 1.0) / (t + 1.0)
    }

    #[inline]
    pub fn process(&mut self, input: f32, a: f32) -> f32 {
        let output = a * input + self.x1 - a * self.y1;
        self.x1 = input;
        self.y1 = output;
        output
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allpass_passes_dc_at_unity() {
        let a = FirstOrderAllpass::coefficient(1_000.0, 48_000.0);
        let mut section = FirstOrderAllpass::default();
        let mut out = 0.0;
        for _ in 0..4096 {
            out = section.process(1.0, a);
        }
        assert!((out - 1.0).abs() < 1e-3, "got {}", out);
    }

    #[test]
    fn test_coefficient_is_stable() {
        for freq in [20.0, 440.0, 5_000.0, 30_000.0] {
            let a = FirstOrderAllpass::coefficient(freq, 48_000.0);
            assert!(a.abs() < 1.0, "coefficient {} unstable for {} Hz", a, freq);
        }
    }
}
