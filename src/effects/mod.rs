//! Post-mix effects chain.
//!
//! The chain is fixed at construction and always runs in the same order:
//!
//! ```text
//! highpass → lowpass → drive → reverb → chorus → phaser → delay
//!     → (+ external input * 0.5) → peak normalisation
//! ```
//!
//! Stages keep their filter and delay-line state across blocks for the life
//! of the session. The chain is only ever touched by the render thread.

pub mod chorus;
pub mod delay;
pub mod drive;
pub mod filter;
pub mod phaser;
pub mod reverb;

use crate::{buffer::StereoBlock, config::EffectsConfig, HEADROOM, NOISE_FLOOR};

pub use self::{
    chorus::Chorus, delay::Delay, drive::Drive, filter::EqFilter, phaser::Phaser, reverb::Reverb,
};

/// Gain applied to external input mixed in after the effects.
pub const INPUT_MIX_GAIN: f32 = 0.5;

/// Uniform contract for one effect: transform a stereo block in place.
pub trait EffectStage: Send {
    fn name(&self) -> &'static str;

    fn process(&mut self, block: &mut StereoBlock);

    /// Clear any tails held in filter or delay state.
    fn reset(&mut self);
}

pub struct EffectsChain {
    highpass: EqFilter,
    lowpass: EqFilter,
    drive: Drive,
    reverb: Reverb,
    chorus: Chorus,
    phaser: Phaser,
    delay: Delay,
    blocks_processed: u64,
}

impl EffectsChain {
    pub fn new(config: &EffectsConfig, sample_rate: f32) -> Self {
        Self {
            highpass: EqFilter::highpass(config.highpass_hz, sample_rate),
            lowpass: EqFilter::lowpass(config.lowpass_hz, sample_rate),
            drive: Drive::new(config.drive_db),
            reverb: Reverb::new(&config.reverb, sample_rate),
            chorus: Chorus::new(&config.chorus, sample_rate),
            phaser: Phaser::new(&config.phaser, sample_rate),
            delay: Delay::new(&config.delay, sample_rate),
            blocks_processed: 0,
        }
    }

    /// Stages in processing order.
    pub fn stages_mut(&mut self) -> [&mut dyn EffectStage; 7] {
        [
            &mut self.highpass,
            &mut self.lowpass,
            &mut self.drive,
            &mut self.reverb,
            &mut self.chorus,
            &mut self.phaser,
            &mut self.delay,
        ]
    }

    /// Run the stages, mix in `input` if it carries any signal, then
    /// normalise. Callers skip this entirely for silent blocks.
    pub fn process(&mut self, block: &mut StereoBlock, input: Option<&StereoBlock>) {
        for stage in self.stages_mut() {
            stage.process(block);
        }
        self.blocks_processed += 1;

        if let Some(input) = input.filter(|input| !input.is_silent()) {
            block.mix_from(input, INPUT_MIX_GAIN);
        }

        normalize(block);
    }

    /// Clear every stage's tails and restart its modulation. Used by
    /// all-notes-off.
    pub fn reset(&mut self) {
        for stage in self.stages_mut() {
            stage.reset();
        }
    }

    /// Number of blocks that have gone through the stages.
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }
}

/// Divide by `peak * HEADROOM` when the peak clears the noise floor.
/// Near-silent blocks are left alone so hiss is never amplified.
pub fn normalize(block: &mut StereoBlock) {
    let peak = block.peak();
    if peak > NOISE_FLOOR {
        block.scale(1.0 / (peak * HEADROOM));
    }
}
