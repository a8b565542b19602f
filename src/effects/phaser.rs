use std::f32::consts::FRAC_PI_2;

use crate::{
    buffer::StereoBlock,
    config::PhaserConfig,
    dsp::{allpass::FirstOrderAllpass, lfo::SineLfo},
    effects::EffectStage,
};

const STAGES: usize = 6;

struct PhaserChannel {
    sections: [FirstOrderAllpass; STAGES],
    lfo: SineLfo,
}

impl PhaserChannel {
    fn new(rate_hz: f32, sample_rate: f32, phase: f32) -> Self {
        Self {
            sections: Default::default(),
            lfo: SineLfo::new(rate_hz, sample_rate, phase),
        }
    }

    fn reset(&mut self, phase: f32) {
        for section in self.sections.iter_mut() {
            section.reset();
        }
        self.lfo.reset(phase);
    }

    fn process(&mut self, buffer: &mut [f32], params: &Sweep) {
        for sample in buffer.iter_mut() {
            // depth 1.0 sweeps two octaves either side of the centre
            let freq = params.centre_hz * 2.0_f32.powf(2.0 * params.depth * self.lfo.next_value());
            let a = FirstOrderAllpass::coefficient(freq, params.sample_rate);
            let wet = self
                .sections
                .iter_mut()
                .fold(*sample, |x, section| section.process(x, a));
            *sample = *sample * (1.0 - params.mix) + wet * params.mix;
        }
    }
}

struct Sweep {
    centre_hz: f32,
    depth: f32,
    mix: f32,
    sample_rate: f32,
}

/// Six-stage allpass phaser, LFO-swept around a centre frequency.
pub struct Phaser {
    left: PhaserChannel,
    right: PhaserChannel,
    sweep: Sweep,
}

impl Phaser {
    pub fn new(config: &PhaserConfig, sample_rate: f32) -> Self {
        Self {
            left: PhaserChannel::new(config.rate_hz, sample_rate, 0.0),
            right: PhaserChannel::new(config.rate_hz, sample_rate, FRAC_PI_2),
            sweep: Sweep {
                centre_hz: config.centre_hz,
                depth: config.depth,
                mix: config.mix,
                sample_rate,
            },
        }
    }
}

impl EffectStage for Phaser {
    fn name(&self) -> &'static str {
        "phaser"
    }

    fn process(&mut self, block: &mut StereoBlock) {
        let (left, right) = block.channels_mut();
        self.left.process(left, &self.sweep);
        self.right.process(right, &self.sweep);
    }

    fn reset(&mut self) {
        self.left.reset(0.0);
        self.right.reset(FRAC_PI_2);
    }
}
