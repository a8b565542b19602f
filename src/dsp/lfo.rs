//! Sine LFO used by the modulated effects.
//!
//! Control-rate oscillators run at 0.01-20 Hz and output a bipolar value
//! (-1..1).

use std::f32::consts::TAU;

pub struct SineLfo {
    phase: f32,
    increment: f32,
}

impl SineLfo {
    /// `phase` is the starting phase in radians; offsetting two LFOs by
    /// a quarter turn gives quadrature modulation for stereo width.
    pub fn new(rate_hz: f32, sample_rate: f32, phase: f32) -> Self {
        Self {
            phase: phase.rem_euclid(TAU),
            increment: TAU * rate_hz / sample_rate,
        }
    }

    /// Current value, then advance by one sample.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let value = self.phase.sin();
        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        value
    }

    /// Jump back to `phase` radians.
    pub fn reset(&mut self, phase: f32) {
        self.phase = phase.rem_euclid(TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_completes_one_cycle() {
        // 1 Hz at 100 Hz sample rate: quarter cycle is 25 samples
        let mut lfo = SineLfo::new(1.0, 100.0, 0.0);
        let values: Vec<f32> = (0..100).map(|_| lfo.next_value()).collect();
        assert!(values[0].abs() < 1e-6);
        assert!((values[25] - 1.0).abs() < 1e-3);
        assert!((values[75] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_lfo_stays_bipolar() {
        let mut lfo = SineLfo::new(3.0, 48_000.0, 1.0);
        for _ in 0..48_000 {
            let v = lfo.next_value();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_reset_restarts_cycle() {
        let mut lfo = SineLfo::new(1.0, 100.0, 0.0);
        let first: Vec<f32> = (0..10).map(|_| lfo.next_value()).collect();
        for _ in 0..37 {
            lfo.next_value();
        }
        lfo.reset(0.0);
        let again: Vec<f32> = (0..10).map(|_| lfo.next_value()).collect();
        assert_eq!(first, again);
    }
}
