use crate::{
    buffer::StereoBlock,
    dsp::distortion::{db_to_gain, tanh_drive_buffer},
    effects::EffectStage,
};

/// tanh saturation after a fixed input gain in dB. Stateless.
pub struct Drive {
    gain: f32,
}

impl Drive {
    pub fn new(drive_db: f32) -> Self {
        Self {
            gain: db_to_gain(drive_db),
        }
    }
}

impl EffectStage for Drive {
    fn name(&self) -> &'static str {
        "drive"
    }

    fn process(&mut self, block: &mut StereoBlock) {
        let (left, right) = block.channels_mut();
        tanh_drive_buffer(left, self.gain);
        tanh_drive_buffer(right, self.gain);
    }

    fn reset(&mut self) {}
}
