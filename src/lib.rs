pub mod buffer;
pub mod config;
pub mod dsp; // Mono DSP primitives
pub mod effects; // Post-mix stereo chain
pub mod error;
pub mod io;
pub mod synth; // Waveforms, voices, rendering

pub use buffer::StereoBlock;
pub use config::{EffectsConfig, SynthConfig};
pub use error::{Result, SynthError};
pub use synth::{NoteEvent, NoteSender, Session};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Lowest and highest pitch with a precomputed waveform (piano range).
pub const MIN_PITCH: u8 = 21;
pub const MAX_PITCH: u8 = 108;

/// Peaks at or below this are not normalised.
pub const NOISE_FLOOR: f32 = 0.0001;
/// Normalisation divides by `peak * HEADROOM`.
pub const HEADROOM: f32 = 1.1;
