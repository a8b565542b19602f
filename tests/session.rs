use std::sync::{Arc, OnceLock};

use ivory::{
    synth::{
        event_bridge, render::RELEASE_GAIN, BlockRenderer, ChannelLayout, VoiceManager,
        WaveformCache,
    },
    NoteEvent, Session, StereoBlock, SynthConfig, HEADROOM, MAX_PITCH, MIN_PITCH,
};

const BLOCK: usize = 512;

/// Default-config cache, built once for the whole test binary.
fn shared_cache() -> Arc<WaveformCache> {
    static CACHE: OnceLock<Arc<WaveformCache>> = OnceLock::new();
    CACHE
        .get_or_init(|| {
            let config = SynthConfig::default();
            Arc::new(WaveformCache::new(config.sample_rate, config.duration_samples()))
        })
        .clone()
}

fn fresh_session() -> (Session, ivory::NoteSender) {
    Session::with_cache(SynthConfig::default(), shared_cache()).unwrap()
}

#[test]
fn every_supported_pitch_has_a_full_note() {
    let cache = shared_cache();
    let duration = SynthConfig::default().duration_samples();
    for pitch in MIN_PITCH..=MAX_PITCH {
        assert_eq!(cache.get(pitch, duration, 100).len(), duration, "pitch {pitch}");
    }
}

#[test]
fn single_note_renders_processed_normalised_audio() {
    let (mut session, mut tx) = fresh_session();
    tx.note_on(60, 100).unwrap();

    let block = session.render_block(None, BLOCK);
    assert_eq!(block.len(), BLOCK);
    assert!(!block.is_silent());
    assert!(block.peak() <= 1.0 / HEADROOM + 1e-6, "peak {}", block.peak());
    assert!((block.peak() - 1.0 / HEADROOM).abs() < 1e-4);
    assert_eq!(session.effects().blocks_processed(), 1);
}

#[test]
fn idle_session_stays_silent_and_skips_effects() {
    let (mut session, _tx) = fresh_session();
    for _ in 0..20 {
        let block = session.render_block(None, BLOCK);
        assert!(block.is_silent());
    }
    assert_eq!(session.effects().blocks_processed(), 0);
    assert!(session.effects().delay().is_idle());
}

#[test]
fn silent_block_ignores_external_input() {
    let (mut session, _tx) = fresh_session();
    let input = StereoBlock::from_channels(&[0.5; BLOCK], &[0.5; BLOCK]);
    let block = session.render_block(Some(&input), BLOCK);
    assert!(block.is_silent());
}

#[test]
fn external_input_is_mixed_into_sounding_blocks() {
    let (mut with_input, mut tx_a) = fresh_session();
    let (mut without, mut tx_b) = fresh_session();
    tx_a.note_on(60, 100).unwrap();
    tx_b.note_on(60, 100).unwrap();

    let input = StereoBlock::from_channels(&[0.9; BLOCK], &[-0.9; BLOCK]);
    let a = with_input.render_block(Some(&input), BLOCK).clone();
    let b = without.render_block(None, BLOCK).clone();
    assert_ne!(a.left(), b.left());
    assert!(a.peak() <= 1.0 / HEADROOM + 1e-6);
}

#[test]
fn released_note_expires_on_schedule() {
    let (mut session, mut tx) = fresh_session();
    tx.note_on(60, 100).unwrap();
    tx.note_off(60).unwrap();

    let duration = session.config().duration_samples();
    let mut rendered = 0;
    while rendered + BLOCK <= duration {
        session.render_block(None, BLOCK);
        rendered += BLOCK;
        let voice = session.voices().get(60).expect("voice should still sound");
        assert!(voice.is_released());
        assert_eq!(voice.offset(), rendered);
    }

    // this call pushes the offset past the note length
    session.render_block(None, BLOCK);
    assert!(session.voices().get(60).is_none());
    assert!(session.voices().is_empty());

    let block = session.render_block(None, BLOCK);
    assert!(block.is_silent());
}

#[test]
fn release_attenuation_starts_on_next_block() {
    let config = SynthConfig::default();
    let cache = shared_cache();
    let (mut tx, mut bridge) = event_bridge(16);
    let mut voices = VoiceManager::new(config.max_voices, config.duration_samples());
    let mut renderer = BlockRenderer::new(
        config.sample_rate,
        config.note_duration,
        config.global_volume,
        ChannelLayout::Stereo,
    );
    let mut reference = VoiceManager::new(config.max_voices, config.duration_samples());

    tx.note_on(64, 100).unwrap();
    reference.note_on(64, 100);
    let mut block = StereoBlock::new(BLOCK);
    let mut expected = StereoBlock::new(BLOCK);

    bridge.drain(|e| voices.apply(e));
    renderer.mix(&mut voices, &cache, &mut block);
    renderer.mix(&mut reference, &cache, &mut expected);
    assert_eq!(block.left(), expected.left());
    voices.advance(BLOCK);
    reference.advance(BLOCK);

    // note-off arrives between blocks
    tx.note_off(64).unwrap();
    bridge.drain(|e| voices.apply(e));
    renderer.mix(&mut voices, &cache, &mut block);
    renderer.mix(&mut reference, &cache, &mut expected);
    for (r, e) in block.left().iter().zip(expected.left()) {
        assert!((r - e * RELEASE_GAIN).abs() < 1e-6);
    }
}

#[test]
fn voice_limit_holds_under_a_burst() {
    let (mut session, mut tx) = fresh_session();
    for pitch in 40..80 {
        tx.note_on(pitch, 90).unwrap();
    }
    session.render_block(None, BLOCK);
    assert_eq!(session.voices().len(), session.config().max_voices);
    // the first notes in win
    for pitch in 40..56 {
        assert!(session.voices().get(pitch).is_some(), "pitch {pitch}");
    }
}

#[test]
fn events_wait_for_the_next_block() {
    let (mut session, mut tx) = fresh_session();
    session.render_block(None, BLOCK);
    tx.submit(NoteEvent::note_on(67, 110)).unwrap();
    assert!(session.voices().is_empty());

    let block = session.render_block(None, BLOCK);
    assert!(!block.is_silent());
    assert_eq!(session.voices().get(67).unwrap().offset(), BLOCK);
}

#[test]
fn out_of_range_pitch_still_sounds() {
    let (mut session, mut tx) = fresh_session();
    tx.note_on(10, 100).unwrap();
    let block = session.render_block(None, BLOCK);
    assert!(!block.is_silent());
}
