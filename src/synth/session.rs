//! The renderer-owned session context.
//!
//! A `Session` holds everything the audio callback touches: the voice set,
//! the consumer end of the event bridge, the waveform cache, the mixer and
//! the effects chain. It is built once, moved into the callback, and from
//! then on only the render thread sees it. Producers talk to it through the
//! `NoteSender` returned alongside.

use std::sync::Arc;

use crate::{
    buffer::StereoBlock,
    config::SynthConfig,
    effects::EffectsChain,
    error::{Result, SynthError},
    synth::{
        manager::VoiceManager,
        message::{event_bridge, EventBridge, MessageReceiver, NoteEvent, NoteSender},
        render::{BlockRenderer, ChannelLayout},
        waveform::WaveformCache,
    },
};

pub struct Session {
    config: SynthConfig,
    cache: Arc<WaveformCache>,
    voices: VoiceManager,
    events: EventBridge,
    renderer: BlockRenderer,
    effects: EffectsChain,
    block: StereoBlock,
}

impl Session {
    /// Validate `config`, build the waveform cache, and wire up a fresh
    /// event bridge.
    pub fn new(config: SynthConfig) -> Result<(Self, NoteSender)> {
        // before the cache, whose size comes straight from the config
        config.validate()?;
        let cache = Arc::new(WaveformCache::new(
            config.sample_rate,
            config.duration_samples(),
        ));
        Self::with_bridge(config, cache)
    }

    /// Reuse an existing cache. It must have been built for the same sample
    /// rate and note length.
    pub fn with_cache(config: SynthConfig, cache: Arc<WaveformCache>) -> Result<(Self, NoteSender)> {
        config.validate()?;
        Self::with_bridge(config, cache)
    }

    fn with_bridge(config: SynthConfig, cache: Arc<WaveformCache>) -> Result<(Self, NoteSender)> {
        let (tx, bridge) = event_bridge(config.event_capacity);
        let session = Self::build(config, cache, bridge)?;
        Ok((session, tx))
    }

    /// Drive the session from any receiver instead of the built-in ring.
    pub fn with_receiver(
        config: SynthConfig,
        cache: Arc<WaveformCache>,
        rx: impl MessageReceiver + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Self::build(config, cache, EventBridge::new(rx))
    }

    /// Assemble a session from an already validated config.
    fn build(config: SynthConfig, cache: Arc<WaveformCache>, events: EventBridge) -> Result<Self> {
        if cache.sample_rate() != config.sample_rate
            || cache.duration_samples() != config.duration_samples()
        {
            return Err(SynthError::config(
                "cache",
                format!(
                    "built for {} Hz / {} samples, session wants {} Hz / {} samples",
                    cache.sample_rate(),
                    cache.duration_samples(),
                    config.sample_rate,
                    config.duration_samples()
                ),
            ));
        }

        let renderer = BlockRenderer::new(
            config.sample_rate,
            config.note_duration,
            config.global_volume,
            ChannelLayout::Stereo,
        );
        let effects = EffectsChain::new(&config.effects, config.sample_rate);
        let voices = VoiceManager::new(config.max_voices, config.duration_samples());

        Ok(Self {
            block: StereoBlock::new(config.block_size),
            config,
            cache,
            voices,
            events,
            renderer,
            effects,
        })
    }

    /// Render one block of `num_frames` (at most `MAX_BLOCK_SIZE`).
    ///
    /// Pending events are applied first, all at once, so nothing changes
    /// mid-block. An all-zero mix is returned as-is without running the
    /// effects, so silence never produces effect tails.
    pub fn render_block(&mut self, input: Option<&StereoBlock>, num_frames: usize) -> &StereoBlock {
        self.block.set_len(num_frames);

        let voices = &mut self.voices;
        let effects = &mut self.effects;
        self.events.drain(|event| {
            if event == NoteEvent::AllNotesOff {
                effects.reset();
            }
            voices.apply(event);
        });

        self.renderer
            .mix(&mut self.voices, &self.cache, &mut self.block);
        self.voices.advance(self.block.len());

        if self.block.is_silent() {
            tracing::trace!("silent block, effects skipped");
            return &self.block;
        }

        if self.renderer.layout() == ChannelLayout::Mono {
            self.block.duplicate_left();
        }
        self.effects.process(&mut self.block, input);
        &self.block
    }

    /// Mono output sums voices without panning; stereo uses the pan law.
    pub fn set_layout(&mut self, layout: ChannelLayout) {
        self.renderer.set_layout(layout);
    }

    pub fn layout(&self) -> ChannelLayout {
        self.renderer.layout()
    }

    pub fn voices(&self) -> &VoiceManager {
        &self.voices
    }

    pub fn effects(&self) -> &EffectsChain {
        &self.effects
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }
}
