use crate::{
    buffer::StereoBlock,
    dsp::filter::{FilterType, SVFilter},
    effects::EffectStage,
};

/// Stereo EQ filter: one state-variable filter per channel.
pub struct EqFilter {
    left: SVFilter,
    right: SVFilter,
    name: &'static str,
}

impl EqFilter {
    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self {
            left: SVFilter::new(FilterType::HighPass, cutoff_hz, sample_rate),
            right: SVFilter::new(FilterType::HighPass, cutoff_hz, sample_rate),
            name: "highpass",
        }
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self {
            left: SVFilter::new(FilterType::LowPass, cutoff_hz, sample_rate),
            right: SVFilter::new(FilterType::LowPass, cutoff_hz, sample_rate),
            name: "lowpass",
        }
    }
}

impl EffectStage for EqFilter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&mut self, block: &mut StereoBlock) {
        let (left, right) = block.channels_mut();
        self.left.render(left);
        self.right.render(right);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highpass_removes_dc_on_both_channels() {
        let mut stage = EqFilter::highpass(100.0, 44_100.0);
        let mut block = StereoBlock::from_channels(&[1.0; 2048], &[-1.0; 2048]);
        stage.process(&mut block);
        assert!(block.left()[2047].abs() < 0.01);
        assert!(block.right()[2047].abs() < 0.01);
    }

    #[test]
    fn test_channels_keep_independent_state() {
        let mut stage = EqFilter::lowpass(8_000.0, 44_100.0);
        let mut block = StereoBlock::from_channels(&[1.0; 64], &[0.0; 64]);
        stage.process(&mut block);
        assert!(block.left()[63] > 0.9);
        assert!(block.right().iter().all(|&s| s == 0.0));
    }
}
