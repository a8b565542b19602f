// External interfaces: the audio device and the computer keyboard.

pub mod device;
pub mod keymap;

pub use device::{interleave, open_output, OutputStream};
