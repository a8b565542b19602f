use crate::{buffer::StereoBlock, config::DelayConfig, dsp::delay::DelayLine, effects::EffectStage};

/// Feedback echo: `out = x * (1 - mix) + echo * mix`, with the line fed
/// `x + echo * feedback`.
pub struct Delay {
    left: DelayLine,
    right: DelayLine,
    delay_samples: usize,
    feedback: f32,
    mix: f32,
}

impl Delay {
    pub fn new(config: &DelayConfig, sample_rate: f32) -> Self {
        let delay_samples = ((config.delay_seconds * sample_rate) as usize).max(1);
        Self {
            left: DelayLine::new(delay_samples),
            right: DelayLine::new(delay_samples),
            delay_samples,
            feedback: config.feedback,
            mix: config.mix,
        }
    }

    /// True when neither delay line holds any signal.
    pub fn is_idle(&self) -> bool {
        self.left.is_clear() && self.right.is_clear()
    }

    fn run(line: &mut DelayLine, buffer: &mut [f32], delay: usize, feedback: f32, mix: f32) {
        for sample in buffer.iter_mut() {
            // read before write: `delay - 1` taps back is `delay` samples old
            let echo = line.read(delay - 1);
            line.write(*sample + echo * feedback);
            *sample = *sample * (1.0 - mix) + echo * mix;
        }
    }
}

impl EffectStage for Delay {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn process(&mut self, block: &mut StereoBlock) {
        let (left, right) = block.channels_mut();
        Self::run(&mut self.left, left, self.delay_samples, self.feedback, self.mix);
        Self::run(&mut self.right, right, self.delay_samples, self.feedback, self.mix);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
