/// Circular delay buffer, sized once at construction.
///
/// `write` then `read` gives a delay of `delay_samples`; a delay of 0 reads
/// the sample just written.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// `max_delay_samples` is the longest delay this line can produce.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1) + 1],
            write_pos: 0,
        }
    }

    pub fn write(&mut self, sample: f32) {
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.buffer[self.write_pos] = sample;
    }

    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.min(len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Linear interpolation between the two neighbouring taps.
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let delay = delay_samples.clamp(0.0, max);
        let whole = delay.floor();
        let frac = delay - whole;
        let a = self.read(whole as usize);
        let b = self.read(whole as usize + 1);
        a + (b - a) * frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// True when nothing but zeros is stored.
    pub fn is_clear(&self) -> bool {
        self.buffer.iter().all(|&s| s == 0.0)
    }
}
