use crate::synth::Pitch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Active,    // Sounding at full level
    Releasing, // Key released, attenuated until the note runs out
}

/// One sounding note. Voices are keyed by pitch: a second note-on for the
/// same pitch replaces the first rather than stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pitch: Pitch,
    velocity: u8,
    offset: usize,
    released: bool,
}

impl Voice {
    pub fn new(pitch: Pitch, velocity: u8) -> Self {
        Self {
            pitch,
            velocity,
            offset: 0,
            released: false,
        }
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Samples elapsed since the note started.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn state(&self) -> VoiceState {
        if self.released {
            VoiceState::Releasing
        } else {
            VoiceState::Active
        }
    }

    pub fn release(&mut self) {
        self.released = true;
    }

    pub fn advance(&mut self, samples: usize) {
        self.offset += samples;
    }

    /// Samples left before the note's fixed lifetime runs out.
    pub fn remaining(&self, duration_samples: usize) -> usize {
        duration_samples.saturating_sub(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_voice_is_active_at_zero() {
        let voice = Voice::new(60, 100);
        assert_eq!(voice.offset(), 0);
        assert_eq!(voice.state(), VoiceState::Active);
        assert_eq!(voice.remaining(1000), 1000);
    }

    #[test]
    fn test_release_only_flags() {
        let mut voice = Voice::new(60, 100);
        voice.advance(300);
        voice.release();
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert_eq!(voice.offset(), 300);
        assert_eq!(voice.remaining(1000), 700);
    }

    #[test]
    fn test_remaining_saturates() {
        let mut voice = Voice::new(60, 100);
        voice.advance(1200);
        assert_eq!(voice.remaining(1000), 0);
    }
}
