use crate::MAX_BLOCK_SIZE;

/// A stereo block of audio with a fixed backing capacity.
///
/// Both channels are allocated once at `MAX_BLOCK_SIZE` frames; `set_len`
/// only moves the active window, so reusing a block per render call never
/// touches the allocator.
#[derive(Debug, Clone)]
pub struct StereoBlock {
    left: Vec<f32>,
    right: Vec<f32>,
    len: usize,
}

impl StereoBlock {
    pub fn new(frames: usize) -> Self {
        let mut block = Self {
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
            len: 0,
        };
        block.set_len(frames);
        block
    }

    /// Build a block from explicit channel data (tests, offline input).
    pub fn from_channels(left: &[f32], right: &[f32]) -> Self {
        let frames = left.len().min(right.len()).min(MAX_BLOCK_SIZE);
        let mut block = Self::new(frames);
        block.left[..frames].copy_from_slice(&left[..frames]);
        block.right[..frames].copy_from_slice(&right[..frames]);
        block
    }

    /// Resize the active window and zero it. Clamped to `MAX_BLOCK_SIZE`.
    pub fn set_len(&mut self, frames: usize) {
        self.len = frames.min(MAX_BLOCK_SIZE);
        self.clear();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.left[..self.len].fill(0.0);
        self.right[..self.len].fill(0.0);
    }

    pub fn left(&self) -> &[f32] {
        &self.left[..self.len]
    }

    pub fn right(&self) -> &[f32] {
        &self.right[..self.len]
    }

    pub fn channels_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.left[..self.len], &mut self.right[..self.len])
    }

    /// True when every sample in the active window is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.left().iter().chain(self.right()).all(|&s| s == 0.0)
    }

    /// Largest absolute sample across both channels.
    pub fn peak(&self) -> f32 {
        self.left()
            .iter()
            .chain(self.right())
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    pub fn scale(&mut self, gain: f32) {
        let (left, right) = self.channels_mut();
        for sample in left.iter_mut().chain(right.iter_mut()) {
            *sample *= gain;
        }
    }

    /// Add `other * gain` into this block over the shorter of the two windows.
    pub fn mix_from(&mut self, other: &StereoBlock, gain: f32) {
        let frames = self.len.min(other.len);
        for (o, &s) in self.left[..frames].iter_mut().zip(&other.left[..frames]) {
            *o += s * gain;
        }
        for (o, &s) in self.right[..frames].iter_mut().zip(&other.right[..frames]) {
            *o += s * gain;
        }
    }

    /// Copy the left channel over the right (mono layouts feed the effects
    /// chain a duplicated signal).
    pub fn duplicate_left(&mut self) {
        let len = self.len;
        let (left, right) = (&self.left[..len], &mut self.right[..len]);
        right.copy_from_slice(left);
    }
}

impl Default for StereoBlock {
    fn default() -> Self {
        Self::new(0)
    }
}
