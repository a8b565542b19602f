//! Precomputed note waveforms.
//!
//! Every supported pitch gets one full-length table at construction, built
//! at full velocity. Lookups rescale by velocity on the way out, so the
//! render path is a copy and a multiply. Pitches outside the table range
//! are synthesized on demand, which is slow and allocates.

use std::f64::consts::TAU;

use crate::{synth::Pitch, MAX_PITCH, MIN_PITCH};

/// Partials above the fundamental: (frequency ratio, relative amplitude).
pub const HARMONICS: [(f64, f64); 4] = [(2.0, 0.5), (3.0, 0.3), (5.0, 0.2), (7.0, 0.1)];

pub const ATTACK_SECONDS: f64 = 0.01;
pub const DECAY_SECONDS: f64 = 0.1;
pub const SUSTAIN_LEVEL: f32 = 0.7;

/// Equal-tempered frequency, A4 (69) = 440 Hz.
#[inline]
pub fn pitch_to_freq(pitch: Pitch) -> f64 {
    440.0 * 2.0_f64.powf((pitch as f64 - 69.0) / 12.0)
}

#[inline]
pub fn velocity_gain(velocity: u8) -> f32 {
    velocity as f32 / 127.0
}

pub fn is_cached_pitch(pitch: Pitch) -> bool {
    (MIN_PITCH..=MAX_PITCH).contains(&pitch)
}

/// Amplitude envelope at sample `index`: linear 0→1 attack over 10 ms,
/// linear 1→0.7 decay over 100 ms, then flat sustain. Both ramps include
/// their end points.
pub fn envelope_at(index: usize, sample_rate: f32) -> f32 {
    let attack = (ATTACK_SECONDS * sample_rate as f64) as usize;
    let decay = (DECAY_SECONDS * sample_rate as f64) as usize;

    if index < attack {
        ramp(index, attack, 0.0, 1.0)
    } else if index < attack + decay {
        ramp(index - attack, decay, 1.0, SUSTAIN_LEVEL)
    } else {
        SUSTAIN_LEVEL
    }
}

#[inline]
fn ramp(step: usize, steps: usize, from: f32, to: f32) -> f32 {
    if steps <= 1 {
        return from;
    }
    from + (to - from) * (step as f32 / (steps - 1) as f32)
}

/// Additive note: fundamental plus weighted harmonics, peak-normalised,
/// scaled by velocity, then enveloped. Pure: identical arguments give
/// bit-identical output.
pub fn generate(pitch: Pitch, duration_samples: usize, velocity: u8, sample_rate: f32) -> Vec<f32> {
    let freq = pitch_to_freq(pitch);
    let sr = sample_rate as f64;

    let mut raw: Vec<f64> = (0..duration_samples)
        .map(|i| {
            let phase = TAU * freq * (i as f64 / sr);
            HARMONICS
                .iter()
                .fold(phase.sin(), |acc, &(ratio, amp)| acc + amp * (ratio * phase).sin())
        })
        .collect();

    let peak = raw.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    let norm = if peak > 0.0 { 1.0 / peak } else { 1.0 };
    let gain = velocity as f64 / 127.0;
    for sample in raw.iter_mut() {
        *sample *= norm * gain;
    }

    raw.iter()
        .enumerate()
        .map(|(i, &x)| x as f32 * envelope_at(i, sample_rate))
        .collect()
}

pub struct WaveformCache {
    sample_rate: f32,
    duration_samples: usize,
    /// Indexed by `pitch - MIN_PITCH`.
    tables: Vec<Vec<f32>>,
}

impl WaveformCache {
    /// Build tables for every pitch in `MIN_PITCH..=MAX_PITCH`.
    pub fn new(sample_rate: f32, duration_samples: usize) -> Self {
        let tables = (MIN_PITCH..=MAX_PITCH)
            .map(|pitch| generate(pitch, duration_samples, 127, sample_rate))
            .collect();

        tracing::info!(
            min_pitch = MIN_PITCH,
            max_pitch = MAX_PITCH,
            duration_samples,
            sample_rate,
            "waveform cache built"
        );

        Self {
            sample_rate,
            duration_samples,
            tables,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn duration_samples(&self) -> usize {
        self.duration_samples
    }

    /// Full-velocity table for `pitch`, if it is in the cached range.
    pub fn table(&self, pitch: Pitch) -> Option<&[f32]> {
        if is_cached_pitch(pitch) {
            self.tables
                .get((pitch - MIN_PITCH) as usize)
                .map(Vec::as_slice)
        } else {
            None
        }
    }

    /// Synthesize at this cache's sample rate without touching the tables.
    pub fn generate(&self, pitch: Pitch, duration_samples: usize, velocity: u8) -> Vec<f32> {
        generate(pitch, duration_samples, velocity, self.sample_rate)
    }

    /// Velocity-scaled copy of the start of the note, `duration_samples`
    /// long. Cached pitches past the table end are zero-padded; other
    /// pitches fall back to `generate`.
    pub fn get(&self, pitch: Pitch, duration_samples: usize, velocity: u8) -> Vec<f32> {
        match self.table(pitch) {
            Some(table) => {
                let gain = velocity_gain(velocity);
                let mut out = vec![0.0; duration_samples];
                let n = duration_samples.min(table.len());
                for (o, &s) in out[..n].iter_mut().zip(&table[..n]) {
                    *o = s * gain;
                }
                out
            }
            None => self.generate(pitch, duration_samples, velocity),
        }
    }

    /// Write the velocity-scaled segment starting at `offset` into `out`,
    /// zero-filling past the end of the note. Allocation-free for cached
    /// pitches; any other pitch synthesizes the whole note per call.
    pub fn read_into(&self, pitch: Pitch, offset: usize, velocity: u8, out: &mut [f32]) {
        match self.table(pitch) {
            Some(table) => copy_segment(table, offset, velocity_gain(velocity), out),
            None => {
                let note = self.generate(pitch, self.duration_samples, velocity);
                copy_segment(&note, offset, 1.0, out);
            }
        }
    }
}

pub(crate) fn copy_segment(source: &[f32], offset: usize, gain: f32, out: &mut [f32]) {
    let available = source.len().saturating_sub(offset).min(out.len());
    for (o, &s) in out[..available].iter_mut().zip(&source[offset..offset + available]) {
        *o = s * gain;
    }
    out[available..].fill(0.0);
}
