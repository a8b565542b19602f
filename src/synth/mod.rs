// Voices, events and per-block rendering.
// This layer sits between the event producer and the effects chain.

pub mod manager;
pub mod message;
pub mod render;
pub mod session;
pub mod voice;
pub mod waveform;

/// MIDI-style note number; 69 is A4.
pub type Pitch = u8;

pub use manager::VoiceManager;
pub use message::{event_bridge, EventBridge, MessageReceiver, NoteEvent, NoteSender, QueueFull};
pub use render::{BlockRenderer, ChannelLayout};
pub use session::Session;
pub use voice::{Voice, VoiceState};
pub use waveform::WaveformCache;
