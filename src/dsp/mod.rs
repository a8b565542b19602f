//! Low-level DSP primitives used by the effect stages.
//!
//! Everything here is mono, allocation-free after construction, and safe to
//! call from the audio callback. The stereo wiring and parameter plumbing
//! live in `effects`.

/// First-order allpass section for phasing.
pub mod allpass;
/// Circular delay buffer with integer and interpolated taps.
pub mod delay;
/// Waveshaping transfer functions.
pub mod distortion;
/// State-variable filter with lowpass and highpass taps.
pub mod filter;
/// Control-rate sine oscillator.
pub mod lfo;
/// Schroeder comb/allpass reverb.
pub mod reverb;
