//! Per-block voice mixing.
//!
//! For each voice the renderer pulls the next stretch of its cached
//! waveform, applies the lifetime decay curve, the release attenuation and
//! the global volume, then pans it into the output. Mixing is a plain sum,
//! so voice order does not matter.

use crate::{
    buffer::StereoBlock,
    synth::{
        manager::VoiceManager,
        voice::Voice,
        waveform::{copy_segment, is_cached_pitch, WaveformCache},
        Pitch,
    },
    MAX_BLOCK_SIZE,
};

/// Step attenuation applied to released voices for the rest of their life.
pub const RELEASE_GAIN: f32 = 0.5;
/// Gain of the pan law at full deflection toward a channel.
pub const PAN_GAIN: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn for_channels(channels: usize) -> Self {
        if channels <= 1 {
            ChannelLayout::Mono
        } else {
            ChannelLayout::Stereo
        }
    }
}

/// Pitch position on the stereo field: -1 hard left, 1 hard right, middle C
/// in the centre, four octaves to either edge.
#[inline]
pub fn pan_position(pitch: Pitch) -> f32 {
    ((pitch as f32 - 60.0) / 48.0).clamp(-1.0, 1.0)
}

/// Linear balance law: each side stays at `PAN_GAIN` until the note moves
/// away from it, then falls linearly to 0 at the opposite edge. Not
/// constant-power; a centred note sits at 70% on both sides.
#[inline]
pub fn pan_gains(pitch: Pitch) -> (f32, f32) {
    let pan = pan_position(pitch);
    let left = (1.0 - pan).min(1.0) * PAN_GAIN;
    let right = (1.0 + pan).min(1.0) * PAN_GAIN;
    (left, right)
}

/// A note outside the cached range, synthesized once when its voice first
/// sounds and reused until no voice plays it any more.
struct FallbackNote {
    pitch: Pitch,
    velocity: u8,
    samples: Vec<f32>,
}

fn fallback_note<'a>(
    notes: &'a mut Vec<FallbackNote>,
    cache: &WaveformCache,
    voice: &Voice,
) -> &'a [f32] {
    let (pitch, velocity) = (voice.pitch(), voice.velocity());
    let index = match notes
        .iter()
        .position(|n| n.pitch == pitch && n.velocity == velocity)
    {
        Some(index) => index,
        None => {
            tracing::debug!(pitch, velocity, "synthesizing uncached note");
            notes.push(FallbackNote {
                pitch,
                velocity,
                samples: cache.generate(pitch, cache.duration_samples(), velocity),
            });
            notes.len() - 1
        }
    };
    &notes[index].samples
}

pub struct BlockRenderer {
    scratch: Vec<f32>,
    fallback: Vec<FallbackNote>,
    sample_rate: f32,
    /// Decay time constant in seconds; equal to the note duration.
    tau: f32,
    volume: f32,
    layout: ChannelLayout,
}

impl BlockRenderer {
    pub fn new(sample_rate: f32, note_duration: f32, volume: f32, layout: ChannelLayout) -> Self {
        Self {
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            fallback: Vec::new(),
            sample_rate,
            tau: note_duration,
            volume,
            layout,
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: ChannelLayout) {
        self.layout = layout;
    }

    /// `exp(-t / tau)` for the sample `index` samples into the note.
    #[inline]
    pub fn decay_at(&self, index: usize) -> f32 {
        (-(index as f32 / self.sample_rate) / self.tau).exp()
    }

    /// Sum every voice into `out` (which is cleared first). Mono layouts
    /// write the left channel only. Voices with nothing left to play are
    /// pruned. Does not advance voices.
    ///
    /// Each voice reads its waveform from its own offset, so a held note
    /// plays through the whole table, and the decay curve runs over the
    /// note's lifetime rather than restarting every block.
    ///
    /// Pitches outside the cached range are synthesized in full the first
    /// block they sound (this allocates) and read from that copy afterwards.
    pub fn mix(&mut self, voices: &mut VoiceManager, cache: &WaveformCache, out: &mut StereoBlock) {
        out.clear();
        let frames = out.len();
        let duration = voices.duration_samples();
        let mut expired = false;

        for voice in voices.voices() {
            let chunk = frames.min(voice.remaining(duration));
            if chunk == 0 {
                expired = true;
                continue;
            }

            let samples = &mut self.scratch[..chunk];
            if is_cached_pitch(voice.pitch()) {
                cache.read_into(voice.pitch(), voice.offset(), voice.velocity(), samples);
            } else {
                let note = fallback_note(&mut self.fallback, cache, voice);
                copy_segment(note, voice.offset(), 1.0, samples);
            }

            let gain = if voice.is_released() {
                RELEASE_GAIN * self.volume
            } else {
                self.volume
            };
            let offset = voice.offset();
            for (i, sample) in samples.iter_mut().enumerate() {
                let t = (offset + i) as f32 / self.sample_rate;
                *sample *= (-t / self.tau).exp() * gain;
            }

            let (left, right) = out.channels_mut();
            match self.layout {
                ChannelLayout::Mono => {
                    for (o, &s) in left.iter_mut().zip(samples.iter()) {
                        *o += s;
                    }
                }
                ChannelLayout::Stereo => {
                    let (gl, gr) = pan_gains(voice.pitch());
                    for ((l, r), &s) in left.iter_mut().zip(right.iter_mut()).zip(samples.iter()) {
                        *l += s * gl;
                        *r += s * gr;
                    }
                }
            }
        }

        if expired {
            voices.prune_finished();
        }
        if !self.fallback.is_empty() {
            let sounding = voices.voices();
            self.fallback.retain(|note| {
                sounding
                    .iter()
                    .any(|v| v.pitch() == note.pitch && v.velocity() == note.velocity)
            });
        }
    }
}
