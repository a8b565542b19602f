//! The set of sounding voices and the rules for changing it.
//!
//! ```text
//!   Absent ──note_on──→ Active ──note_off──→ Releasing
//!     ↑                   │                      │
//!     └──── advance past duration ───────────────┘
//! ```
//!
//! Release never shortens a note; it only marks it for attenuation. Every
//! voice lives for exactly `duration_samples` and is removed by `advance`.

use crate::synth::{message::NoteEvent, voice::Voice, waveform::is_cached_pitch, Pitch};

pub struct VoiceManager {
    voices: Vec<Voice>,
    max_voices: usize,
    duration_samples: usize,
}

impl VoiceManager {
    pub fn new(max_voices: usize, duration_samples: usize) -> Self {
        Self {
            voices: Vec::with_capacity(max_voices),
            max_voices,
            duration_samples,
        }
    }

    pub fn apply(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::NoteOn { pitch, velocity } => {
                self.note_on(pitch, velocity);
            }
            NoteEvent::NoteOff { pitch } => {
                self.note_off(pitch);
            }
            NoteEvent::AllNotesOff => {
                tracing::debug!(voices = self.voices.len(), "all notes off");
                self.clear();
            }
        }
    }

    /// Start (or restart) the voice for `pitch`. At capacity the event is
    /// dropped, retriggers of an already sounding pitch included. Returns
    /// whether the note was admitted.
    pub fn note_on(&mut self, pitch: Pitch, velocity: u8) -> bool {
        if velocity == 0 {
            return self.note_off(pitch);
        }
        if self.voices.len() >= self.max_voices {
            tracing::debug!(pitch, max_voices = self.max_voices, "voice limit reached, note dropped");
            return false;
        }
        if !is_cached_pitch(pitch) {
            tracing::debug!(pitch, "pitch outside cached range, synthesizing on demand");
        }

        let voice = Voice::new(pitch, velocity);
        match self.voices.iter_mut().find(|v| v.pitch() == pitch) {
            Some(existing) => *existing = voice,
            None => self.voices.push(voice),
        }
        tracing::debug!(pitch, velocity, voices = self.voices.len(), "note on");
        true
    }

    /// Flag the voice at `pitch` as released. No-op when nothing sounds
    /// there.
    pub fn note_off(&mut self, pitch: Pitch) -> bool {
        match self.voices.iter_mut().find(|v| v.pitch() == pitch) {
            Some(voice) => {
                voice.release();
                tracing::debug!(pitch, "note released");
                true
            }
            None => false,
        }
    }

    /// Move every voice forward and drop the ones whose offset has passed
    /// the note duration. Returns how many were removed.
    pub fn advance(&mut self, samples: usize) -> usize {
        let before = self.voices.len();
        let duration = self.duration_samples;
        self.voices.retain_mut(|voice| {
            voice.advance(samples);
            voice.offset() <= duration
        });
        before - self.voices.len()
    }

    /// Drop voices with no samples left. `advance` normally gets there
    /// first; this catches a voice whose offset landed exactly on the end.
    pub fn prune_finished(&mut self) -> usize {
        let before = self.voices.len();
        let duration = self.duration_samples;
        self.voices.retain(|voice| voice.remaining(duration) > 0);
        before - self.voices.len()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn get(&self, pitch: Pitch) -> Option<&Voice> {
        self.voices.iter().find(|v| v.pitch() == pitch)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    pub fn duration_samples(&self) -> usize {
        self.duration_samples
    }

    pub fn clear(&mut self) {
        self.voices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::voice::VoiceState;

    #[test]
    fn test_note_on_inserts_voice() {
        let mut manager = VoiceManager::new(4, 1000);
        assert!(manager.note_on(60, 100));
        let voice = manager.get(60).unwrap();
        assert_eq!(voice.velocity(), 100);
        assert_eq!(voice.offset(), 0);
        assert_eq!(voice.state(), VoiceState::Active);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut manager = VoiceManager::new(3, 1000);
        for pitch in 60..63 {
            assert!(manager.note_on(pitch, 100));
        }
        let snapshot = manager.voices().to_vec();

        assert!(!manager.note_on(70, 100));
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.voices(), &snapshot[..], "voice set must be unchanged");
    }

    #[test]
    fn test_retrigger_at_capacity_is_dropped() {
        let mut manager = VoiceManager::new(2, 1000);
        manager.note_on(60, 100);
        manager.note_on(62, 100);
        manager.advance(100);
        assert!(!manager.note_on(60, 50));
        assert_eq!(manager.get(60).unwrap().offset(), 100);
    }

    #[test]
    fn test_retrigger_replaces_voice() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(60, 100);
        manager.advance(200);
        manager.note_off(60);
        assert!(manager.note_on(60, 80));

        assert_eq!(manager.len(), 1);
        let voice = manager.get(60).unwrap();
        assert_eq!(voice.offset(), 0);
        assert_eq!(voice.velocity(), 80);
        assert!(!voice.is_released());
    }

    #[test]
    fn test_note_off_flags_without_removing() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(64, 100);
        assert!(manager.note_off(64));
        assert_eq!(manager.get(64).unwrap().state(), VoiceState::Releasing);
        assert!(!manager.note_off(65));
    }

    #[test]
    fn test_all_notes_off_empties_set() {
        let mut manager = VoiceManager::new(4, 1000);
        for pitch in [60, 64, 67] {
            manager.apply(NoteEvent::note_on(pitch, 100));
        }
        manager.apply(NoteEvent::AllNotesOff);
        assert!(manager.is_empty());
        assert!(manager.note_on(72, 100), "freed slots are reusable");
    }

    #[test]
    fn test_zero_velocity_note_on_releases() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(64, 100);
        assert!(manager.note_on(64, 0));
        assert!(manager.get(64).unwrap().is_released());
    }

    #[test]
    fn test_advance_accumulates_offset() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(60, 100);
        for _ in 0..5 {
            manager.advance(128);
        }
        assert_eq!(manager.get(60).unwrap().offset(), 5 * 128);
    }

    #[test]
    fn test_voice_removed_when_offset_exceeds_duration() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(60, 100);
        let mut calls = 0;
        while manager.get(60).is_some() {
            manager.advance(256);
            calls += 1;
        }
        // 256 * 3 = 768 <= 1000, 256 * 4 = 1024 > 1000
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_offset_equal_to_duration_is_kept() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(60, 100);
        assert_eq!(manager.advance(1000), 0);
        assert_eq!(manager.advance(1), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_released_voice_lives_full_duration() {
        let mut manager = VoiceManager::new(4, 1000);
        manager.note_on(60, 100);
        manager.note_off(60);
        manager.advance(999);
        assert!(manager.get(60).is_some());
    }

    #[test]
    fn test_freed_slot_admits_new_note() {
        let mut manager = VoiceManager::new(1, 100);
        manager.note_on(60, 100);
        assert!(!manager.note_on(61, 100));
        manager.advance(101);
        assert!(manager.note_on(61, 100));
    }
}
