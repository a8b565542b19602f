//! Waveshaping.
//!
//! A waveshaper applies a transfer function to each sample after a gain
//! stage: `out = f(in * drive)`. Small drive keeps the signal in the
//! near-linear part of `f`; more drive pushes it into the curve and adds
//! harmonics.
//!
//!   tanh(x)        smooth, symmetric, saturates at ±1

/// Convert a decibel gain to a linear multiplier.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[inline]
pub fn tanh_drive(sample: f32, gain: f32) -> f32 {
    (sample * gain).tanh()
}

pub fn tanh_drive_buffer(buffer: &mut [f32], gain: f32) {
    for sample in buffer.iter_mut() {
        *sample = tanh_drive(*sample, gain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(20.0) - 10.0).abs() < 1e-4);
        assert!((db_to_gain(-6.0) - 0.501).abs() < 1e-3);
    }

    #[test]
    fn test_tanh_drive_small_signal_is_near_linear() {
        let out = tanh_drive(0.01, 1.0);
        assert!((out - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_tanh_drive_saturates() {
        let out = tanh_drive(1.0, 20.0);
        assert!(out > 0.99 && out <= 1.0);
        assert!(tanh_drive(-1.0, 20.0) < -0.99);
    }
}
