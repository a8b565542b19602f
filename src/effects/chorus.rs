use std::f32::consts::FRAC_PI_2;

use crate::{
    buffer::StereoBlock,
    config::ChorusConfig,
    dsp::{delay::DelayLine, lfo::SineLfo},
    effects::EffectStage,
};

/*
Chorus
======

The dry signal is mixed with a copy read from a short delay whose length an
LFO sweeps around a centre value. The changing delay detunes the copy a
little, which thickens the sound.

    delay(t) = centre * (1 + depth * lfo(t))

The right channel's LFO runs a quarter cycle ahead of the left so the two
copies never detune together.
*/

struct ChorusChannel {
    line: DelayLine,
    lfo: SineLfo,
}

impl ChorusChannel {
    fn process(&mut self, buffer: &mut [f32], centre: f32, depth: f32, mix: f32) {
        for sample in buffer.iter_mut() {
            let delay = centre * (1.0 + depth * self.lfo.next_value());
            self.line.write(*sample);
            let wet = self.line.read_interpolated(delay);
            *sample = *sample * (1.0 - mix) + wet * mix;
        }
    }
}

pub struct Chorus {
    left: ChorusChannel,
    right: ChorusChannel,
    /// Centre delay in samples.
    centre: f32,
    depth: f32,
    mix: f32,
}

impl Chorus {
    pub fn new(config: &ChorusConfig, sample_rate: f32) -> Self {
        let centre = config.centre_delay_ms * sample_rate / 1000.0;
        let depth = config.depth.clamp(0.0, 1.0);
        let capacity = (centre * (1.0 + depth)).ceil() as usize + 2;
        let channel = |phase: f32| ChorusChannel {
            line: DelayLine::new(capacity),
            lfo: SineLfo::new(config.rate_hz, sample_rate, phase),
        };
        Self {
            left: channel(0.0),
            right: channel(FRAC_PI_2),
            centre,
            depth,
            mix: config.mix,
        }
    }
}

impl EffectStage for Chorus {
    fn name(&self) -> &'static str {
        "chorus"
    }

    fn process(&mut self, block: &mut StereoBlock) {
        let (left, right) = block.channels_mut();
        self.left.process(left, self.centre, self.depth, self.mix);
        self.right.process(right, self.centre, self.depth, self.mix);
    }

    fn reset(&mut self) {
        self.left.line.reset();
        self.right.line.reset();
        self.left.lfo.reset(0.0);
        self.right.lfo.reset(FRAC_PI_2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_mix_is_transparent() {
        let config = ChorusConfig {
            mix: 0.0,
            ..ChorusConfig::default()
        };
        let mut stage = Chorus::new(&config, 44_100.0);
        let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut block = StereoBlock::from_channels(&input, &input);
        stage.process(&mut block);
        for (a, b) in block.left().iter().zip(&input) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wet_signal_is_delayed() {
        let config = ChorusConfig {
            mix: 1.0,
            ..ChorusConfig::default()
        };
        let mut stage = Chorus::new(&config, 44_100.0);
        let mut block = StereoBlock::new(64);
        block.channels_mut().0[0] = 1.0;
        stage.process(&mut block);
        // shortest possible delay is centre * (1 - depth) = 3.5 ms, ~154 samples
        assert!(block.is_silent(), "impulse should not come back inside 64 samples");
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut stage = Chorus::new(&ChorusConfig::default(), 44_100.0);
        let input: Vec<f32> = (0..512).map(|i| (i as f32 * 0.03).sin()).collect();
        let mut first = StereoBlock::from_channels(&input, &input);
        stage.process(&mut first);

        stage.reset();
        let mut second = StereoBlock::from_channels(&input, &input);
        stage.process(&mut second);
        assert_eq!(first.left(), second.left());
        assert_eq!(first.right(), second.right());
    }

    #[test]
    fn test_output_stays_bounded() {
        let mut stage = Chorus::new(&ChorusConfig::default(), 44_100.0);
        let input: Vec<f32> = (0..2048).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut block = StereoBlock::from_channels(&input, &input);
        stage.process(&mut block);
        assert!(block.peak() <= 1.0 + 1e-4);
    }
}
