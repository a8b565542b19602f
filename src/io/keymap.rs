//! Computer keyboard as a one-octave piano.
//!
//! ```text
//!   z   x       c   v   b
//! a   s   d   f   g   h   j   k
//! C4  D4  E4  F4  G4  A4  B4  C5
//! ```

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::synth::Pitch;

pub const KEYMAP: [(char, Pitch); 13] = [
    ('a', 60),
    ('s', 62),
    ('d', 64),
    ('f', 65),
    ('g', 67),
    ('h', 69),
    ('j', 71),
    ('k', 72),
    ('z', 61),
    ('x', 63),
    ('c', 66),
    ('v', 68),
    ('b', 70),
];

pub const QUIT_KEY: char = 'q';
/// Sends all-notes-off.
pub const PANIC_KEY: char = ' ';

pub fn pitch_for_key(key: char) -> Option<Pitch> {
    let key = key.to_ascii_lowercase();
    KEYMAP.iter().find(|(k, _)| *k == key).map(|&(_, p)| p)
}

/// Filters terminal key events down to note starts and stops.
///
/// With release reporting a pitch sounds from its first press until its
/// release, and repeats in between are ignored. Without it no release ever
/// arrives, so a repeat is ignored until the note started by the last
/// accepted press has run its full length.
pub struct HeldKeys {
    reports_releases: bool,
    note_length: Duration,
    pressed: HashMap<Pitch, Instant>,
}

impl HeldKeys {
    pub fn new(reports_releases: bool, note_length: Duration) -> Self {
        Self {
            reports_releases,
            note_length,
            pressed: HashMap::new(),
        }
    }

    /// True when this press should start a note.
    pub fn press(&mut self, pitch: Pitch, now: Instant) -> bool {
        if let Some(&since) = self.pressed.get(&pitch) {
            let sounding = self.reports_releases
                || now.saturating_duration_since(since) < self.note_length;
            if sounding {
                return false;
            }
        }
        self.pressed.insert(pitch, now);
        true
    }

    /// True when this release should stop a note.
    pub fn release(&mut self, pitch: Pitch) -> bool {
        self.pressed.remove(&pitch).is_some()
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: Duration = Duration::from_secs(1);

    #[test]
    fn test_home_row_is_c_major() {
        let pitches: Vec<Pitch> = "asdfghjk".chars().filter_map(pitch_for_key).collect();
        assert_eq!(pitches, vec![60, 62, 64, 65, 67, 69, 71, 72]);
    }

    #[test]
    fn test_sharps_and_case() {
        assert_eq!(pitch_for_key('z'), Some(61));
        assert_eq!(pitch_for_key('B'), Some(70));
        assert_eq!(pitch_for_key('q'), None);
        assert_eq!(pitch_for_key('1'), None);
        assert_eq!(pitch_for_key(PANIC_KEY), None);
    }

    #[test]
    fn test_repeats_ignored_until_release() {
        let mut keys = HeldKeys::new(true, NOTE);
        let t0 = Instant::now();
        assert!(keys.press(60, t0));
        assert!(!keys.press(60, t0 + Duration::from_millis(30)));
        assert!(!keys.press(60, t0 + Duration::from_secs(5)));
        assert!(keys.release(60));
        assert!(!keys.release(60));
        assert!(keys.press(60, t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_repeats_ignored_while_note_sounds_without_releases() {
        let mut keys = HeldKeys::new(false, NOTE);
        let t0 = Instant::now();
        assert!(keys.press(64, t0));
        for ms in (30..1000).step_by(30) {
            assert!(!keys.press(64, t0 + Duration::from_millis(ms)), "repeat at {ms} ms");
        }
        // the first note has ended, so holding on starts a fresh one
        assert!(keys.press(64, t0 + NOTE));
        assert!(!keys.press(64, t0 + NOTE + Duration::from_millis(30)));
    }

    #[test]
    fn test_other_pitches_are_independent() {
        let mut keys = HeldKeys::new(false, NOTE);
        let t0 = Instant::now();
        assert!(keys.press(60, t0));
        assert!(keys.press(62, t0));
        keys.clear();
        assert!(keys.press(60, t0));
    }
}
