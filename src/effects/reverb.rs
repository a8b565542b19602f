use crate::{
    buffer::StereoBlock, config::ReverbConfig, dsp::reverb::SchroederReverb, effects::EffectStage,
};

/// Offset between left and right comb lengths, in samples.
const STEREO_SPREAD: usize = 23;

pub struct Reverb {
    left: SchroederReverb,
    right: SchroederReverb,
    wet: f32,
    dry: f32,
}

impl Reverb {
    pub fn new(config: &ReverbConfig, sample_rate: f32) -> Self {
        let mut left = SchroederReverb::new(sample_rate, 0);
        let mut right = SchroederReverb::new(sample_rate, STEREO_SPREAD);
        for tank in [&mut left, &mut right] {
            tank.set_room_size(config.room_size);
            tank.set_damping(config.damping);
        }
        Self {
            left,
            right,
            wet: config.wet_level,
            dry: config.dry_level,
        }
    }
}

impl EffectStage for Reverb {
    fn name(&self) -> &'static str {
        "reverb"
    }

    fn process(&mut self, block: &mut StereoBlock) {
        let (left, right) = block.channels_mut();
        for sample in left.iter_mut() {
            *sample = self.dry * *sample + self.wet * self.left.process(*sample);
        }
        for sample in right.iter_mut() {
            *sample = self.dry * *sample + self.wet * self.right.process(*sample);
        }
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
