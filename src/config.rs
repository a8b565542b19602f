//! Load-time configuration: engine constants and the effect stage settings.
//!
//! Nothing here is hot-reloadable. A `Session` copies what it needs at
//! construction and the values stay fixed for the life of the stream.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    MAX_BLOCK_SIZE,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: f32,
    /// Frames per device period. Also the largest block the session expects.
    pub block_size: usize,
    pub max_voices: usize,
    /// Seconds every note sounds for, released or not.
    pub note_duration: f32,
    pub global_volume: f32,
    /// Slots in the producer → renderer event ring.
    pub event_capacity: usize,
    pub effects: EffectsConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            block_size: 512,
            max_voices: 16,
            note_duration: 1.0,
            global_volume: 3.0,
            event_capacity: 256,
            effects: EffectsConfig::default(),
        }
    }
}

impl SynthConfig {
    /// Length of every note (and of every cached waveform) in samples.
    pub fn duration_samples(&self) -> usize {
        (self.note_duration * self.sample_rate) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SynthError::config("sample_rate", "must be a positive number"));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(SynthError::config(
                "block_size",
                format!("must be between 1 and {MAX_BLOCK_SIZE}"),
            ));
        }
        if self.max_voices == 0 {
            return Err(SynthError::config("max_voices", "must be at least 1"));
        }
        if !self.note_duration.is_finite() || self.note_duration <= 0.0 {
            return Err(SynthError::config("note_duration", "must be a positive number of seconds"));
        }
        if self.duration_samples() == 0 {
            return Err(SynthError::config("note_duration", "shorter than one sample"));
        }
        if !self.global_volume.is_finite() {
            return Err(SynthError::config("global_volume", "must be finite"));
        }
        if self.event_capacity == 0 {
            return Err(SynthError::config("event_capacity", "must be at least 1"));
        }
        self.effects.validate(self.sample_rate)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsConfig {
    pub highpass_hz: f32,
    pub lowpass_hz: f32,
    pub drive_db: f32,
    pub reverb: ReverbConfig,
    pub chorus: ChorusConfig,
    pub phaser: PhaserConfig,
    pub delay: DelayConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            highpass_hz: 100.0,
            lowpass_hz: 8_000.0,
            drive_db: 1.5,
            reverb: ReverbConfig::default(),
            chorus: ChorusConfig::default(),
            phaser: PhaserConfig::default(),
            delay: DelayConfig::default(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReverbConfig {
    pub room_size: f32,
    pub damping: f32,
    pub wet_level: f32,
    pub dry_level: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            room_size: 0.2,
            damping: 0.5,
            wet_level: 0.3,
            dry_level: 0.4,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChorusConfig {
    pub rate_hz: f32,
    /// Fraction of the centre delay swept by the LFO (0-1).
    pub depth: f32,
    pub mix: f32,
    pub centre_delay_ms: f32,
}

impl Default for ChorusConfig {
    fn default() -> Self {
        Self {
            rate_hz: 0.5,
            depth: 0.5,
            mix: 0.1,
            centre_delay_ms: 7.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct PhaserConfig {
    pub rate_hz: f32,
    pub depth: f32,
    pub mix: f32,
    pub centre_hz: f32,
}

impl Default for PhaserConfig {
    fn default() -> Self {
        Self {
            rate_hz: 1.0,
            depth: 0.5,
            mix: 0.2,
            centre_hz: 1_300.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct DelayConfig {
    pub delay_seconds: f32,
    pub feedback: f32,
    pub mix: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 0.1,
            feedback: 0.3,
            mix: 0.2,
        }
    }
}

fn unit(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SynthError::config(field, format!("{value} is outside 0..=1")))
    }
}

fn cutoff(field: &'static str, value: f32, nyquist: f32) -> Result<()> {
    if value > 0.0 && value < nyquist {
        Ok(())
    } else {
        Err(SynthError::config(
            field,
            format!("{value} Hz is outside (0, {nyquist}) Hz"),
        ))
    }
}

impl EffectsConfig {
    pub fn validate(&self, sample_rate: f32) -> Result<()> {
        let nyquist = sample_rate * 0.5;
        cutoff("effects.highpass_hz", self.highpass_hz, nyquist)?;
        cutoff("effects.lowpass_hz", self.lowpass_hz, nyquist)?;
        cutoff("effects.phaser.centre_hz", self.phaser.centre_hz, nyquist)?;
        if !self.drive_db.is_finite() {
            return Err(SynthError::config("effects.drive_db", "must be finite"));
        }

        unit("effects.reverb.room_size", self.reverb.room_size)?;
        unit("effects.reverb.damping", self.reverb.damping)?;
        unit("effects.reverb.wet_level", self.reverb.wet_level)?;
        unit("effects.reverb.dry_level", self.reverb.dry_level)?;

        unit("effects.chorus.depth", self.chorus.depth)?;
        unit("effects.chorus.mix", self.chorus.mix)?;
        if self.chorus.rate_hz <= 0.0 || self.chorus.centre_delay_ms <= 0.0 {
            return Err(SynthError::config(
                "effects.chorus",
                "rate and centre delay must be positive",
            ));
        }

        unit("effects.phaser.depth", self.phaser.depth)?;
        unit("effects.phaser.mix", self.phaser.mix)?;
        if self.phaser.rate_hz <= 0.0 {
            return Err(SynthError::config("effects.phaser.rate_hz", "must be positive"));
        }

        unit("effects.delay.mix", self.delay.mix)?;
        if !(0.0..1.0).contains(&self.delay.feedback) {
            return Err(SynthError::config("effects.delay.feedback", "must be in 0..1"));
        }
        if !self.delay.delay_seconds.is_finite() || self.delay.delay_seconds <= 0.0 {
            return Err(SynthError::config("effects.delay.delay_seconds", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SynthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.duration_samples(), 44_100);
    }

    #[test]
    fn test_rejects_zero_voices() {
        let config = SynthConfig {
            max_voices: 0,
            ..SynthConfig::default()
        };
        match config.validate() {
            Err(SynthError::Configuration { field, .. }) => assert_eq!(field, "max_voices"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_oversized_block() {
        let config = SynthConfig {
            block_size: MAX_BLOCK_SIZE + 1,
            ..SynthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_cutoff_above_nyquist() {
        let mut config = SynthConfig::default();
        config.effects.lowpass_hz = 30_000.0;
        match config.validate() {
            Err(SynthError::Configuration { field, .. }) => {
                assert_eq!(field, "effects.lowpass_hz")
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_runaway_delay_feedback() {
        let mut config = SynthConfig::default();
        config.effects.delay.feedback = 1.0;
        assert!(config.validate().is_err());
    }
}
