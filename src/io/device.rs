//! Output device plumbing.
//!
//! The device pulls interleaved f32 frames; the callback renders them in
//! chunks of at most `MAX_BLOCK_SIZE` and spreads the stereo block over
//! however many channels the device has.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::{
    buffer::StereoBlock,
    error::{Result, SynthError},
    synth::{ChannelLayout, Session},
    MAX_BLOCK_SIZE,
};

/// A running output stream. Dropping it stops playback and discards the
/// session it owns.
pub struct OutputStream {
    _stream: cpal::Stream,
    failed: Arc<AtomicBool>,
    device_name: String,
    sample_rate: u32,
    channels: usize,
}

impl OutputStream {
    /// Set once the device reports a stream error; the owner should tear
    /// the stream down.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// Open the default output device and start rendering `session` into it.
///
/// The stream is requested at the session's sample rate and block size. A
/// mono device switches the session to the mono layout.
pub fn open_output(mut session: Session) -> Result<OutputStream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| SynthError::OutputSink("no default output device available".into()))?;
    let device_name = device.name()?;
    let default_config = device.default_output_config()?;

    let channels = default_config.channels() as usize;
    let sample_rate = session.config().sample_rate as u32;
    let stream_config = cpal::StreamConfig {
        channels: default_config.channels(),
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Fixed(session.config().block_size as u32),
    };
    session.set_layout(ChannelLayout::for_channels(channels));

    let failed = Arc::new(AtomicBool::new(false));
    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _| render_interleaved(&mut session, data, channels),
        {
            let failed = failed.clone();
            move |err| {
                tracing::error!(%err, "output stream error");
                failed.store(true, Ordering::Relaxed);
            }
        },
        None,
    )?;
    stream.play()?;

    tracing::info!(device = %device_name, sample_rate, channels, "output stream started");

    Ok(OutputStream {
        _stream: stream,
        failed,
        device_name,
        sample_rate,
        channels,
    })
}

/// Fill a whole device buffer, one session block at a time.
pub fn render_interleaved(session: &mut Session, data: &mut [f32], channels: usize) {
    let channels = channels.max(1);
    let total_frames = data.len() / channels;
    let mut frames_written = 0;

    while frames_written < total_frames {
        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
        let block = session.render_block(None, frames);
        let start = frames_written * channels;
        interleave(block, &mut data[start..start + frames * channels], channels);
        frames_written += frames;
    }
}

/// Write `block` as interleaved frames. One channel gets the average of
/// left and right; extra channels beyond two are silent.
pub fn interleave(block: &StereoBlock, out: &mut [f32], channels: usize) {
    let channels = channels.max(1);
    let frames = block.len().min(out.len() / channels);
    let (left, right) = (block.left(), block.right());

    for (i, frame) in out.chunks_exact_mut(channels).take(frames).enumerate() {
        match frame {
            [mono] => *mono = (left[i] + right[i]) * 0.5,
            [l, r, rest @ ..] => {
                *l = left[i];
                *r = right[i];
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}
