use std::f32::consts::PI;

/*
Topology-preserving state-variable filter
=========================================

Two trapezoidal integrators in a loop. One pass per sample yields the
lowpass and highpass taps at once; the chain only ever reads one of them.

    g = tan(pi * cutoff / sample_rate)     (prewarped integrator gain)
    k = 1 / Q                              (damping; Q = 0.5 gives k = 2)

With k = 2 the response is the critically damped 12 dB/octave shape: no
resonant bump at the cutoff, which is what a mastering-style EQ wants.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub highpass: f32,
}

pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,

    g: f32,
    k: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 2.0,
            filter_type,
        };
        filter.set_cutoff(cutoff_hz, sample_rate);
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, sample_rate)
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, sample_rate)
    }

    /// Cutoff is clamped just below Nyquist so `tan` stays finite.
    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        let cutoff = cutoff_hz.clamp(1.0, sample_rate * 0.49);
        self.g = (PI * cutoff / sample_rate).tan();
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + self.g * (self.g + self.k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            highpass: sample - self.k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample);
            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
            };
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
