//! Error types surfaced by session setup and the output device.
//!
//! Rendering itself never fails: capacity exhaustion and redundant note
//! events are ordinary control flow. What can fail is configuration and the
//! audio device, and both end the session.

use std::fmt;

pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Debug)]
pub enum SynthError {
    /// The audio device could not be opened, configured, or started, or the
    /// stream died while running.
    OutputSink(String),
    /// A configuration value is out of range.
    Configuration { field: &'static str, reason: String },
}

impl SynthError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SynthError::Configuration {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::OutputSink(msg) => write!(f, "output sink failure: {msg}"),
            SynthError::Configuration { field, reason } => {
                write!(f, "invalid configuration for `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for SynthError {}

macro_rules! output_sink_from {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for SynthError {
                fn from(err: $err) -> Self {
                    SynthError::OutputSink(err.to_string())
                }
            }
        )*
    };
}

output_sink_from!(
    cpal::DevicesError,
    cpal::DeviceNameError,
    cpal::DefaultStreamConfigError,
    cpal::BuildStreamError,
    cpal::PlayStreamError,
    cpal::StreamError,
);
