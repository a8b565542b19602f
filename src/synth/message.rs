//! Note events and the bounded hand-off from the producer to the renderer.
//!
//! The producer (keyboard, sequencer, test harness) holds a `NoteSender`;
//! the session owns the matching `EventBridge`. Both ends sit on a
//! single-producer/single-consumer `rtrb` ring, so neither side ever takes
//! a lock or blocks.

use std::collections::VecDeque;
use std::fmt;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::synth::Pitch;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    NoteOn { pitch: Pitch, velocity: u8 },
    NoteOff { pitch: Pitch },
    /// Silence everything at once: drop every voice and clear effect tails.
    AllNotesOff,
}

impl NoteEvent {
    /// MIDI-style note-on: velocity 0 means note-off. Velocity is clamped
    /// to 127.
    pub fn note_on(pitch: Pitch, velocity: u8) -> Self {
        match velocity {
            0 => NoteEvent::NoteOff { pitch },
            v => NoteEvent::NoteOn {
                pitch,
                velocity: v.min(127),
            },
        }
    }

    pub fn note_off(pitch: Pitch) -> Self {
        NoteEvent::NoteOff { pitch }
    }

    pub fn pitch(&self) -> Option<Pitch> {
        match *self {
            NoteEvent::NoteOn { pitch, .. } | NoteEvent::NoteOff { pitch } => Some(pitch),
            NoteEvent::AllNotesOff => None,
        }
    }
}

/// Consumer side of the event hand-off.
pub trait MessageReceiver: Send {
    fn pop(&mut self) -> Option<NoteEvent>;

    /// Events ready to pop right now.
    fn pending(&self) -> usize;
}

impl MessageReceiver for Consumer<NoteEvent> {
    fn pop(&mut self) -> Option<NoteEvent> {
        Consumer::pop(self).ok()
    }

    fn pending(&self) -> usize {
        self.slots()
    }
}

impl MessageReceiver for VecDeque<NoteEvent> {
    fn pop(&mut self) -> Option<NoteEvent> {
        self.pop_front()
    }

    fn pending(&self) -> usize {
        self.len()
    }
}

/// Returned by `NoteSender::submit` when the ring is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull(pub NoteEvent);

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event queue full, dropped {:?}", self.0)
    }
}

impl std::error::Error for QueueFull {}

/// Producer end. Move it to whichever thread generates notes.
pub struct NoteSender {
    tx: Producer<NoteEvent>,
}

impl NoteSender {
    /// Enqueue without blocking. A full ring hands the event back.
    pub fn submit(&mut self, event: NoteEvent) -> Result<(), QueueFull> {
        self.tx.push(event).map_err(|rtrb::PushError::Full(event)| {
            tracing::debug!(?event, "event queue full, dropping event");
            QueueFull(event)
        })
    }

    pub fn note_on(&mut self, pitch: Pitch, velocity: u8) -> Result<(), QueueFull> {
        self.submit(NoteEvent::note_on(pitch, velocity))
    }

    pub fn note_off(&mut self, pitch: Pitch) -> Result<(), QueueFull> {
        self.submit(NoteEvent::note_off(pitch))
    }

    pub fn all_notes_off(&mut self) -> Result<(), QueueFull> {
        self.submit(NoteEvent::AllNotesOff)
    }

    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}

/// Consumer end, owned by the session and drained once per block.
pub struct EventBridge {
    rx: Box<dyn MessageReceiver>,
}

impl EventBridge {
    pub fn new(rx: impl MessageReceiver + 'static) -> Self {
        Self { rx: Box::new(rx) }
    }

    /// Pop the events that were pending when the call started, in arrival
    /// order. Anything pushed while draining waits for the next call, so a
    /// busy producer cannot hold up the block.
    pub fn drain(&mut self, mut apply: impl FnMut(NoteEvent)) -> usize {
        let pending = self.rx.pending();
        let mut count = 0;
        while count < pending {
            let Some(event) = self.rx.pop() else {
                break;
            };
            apply(event);
            count += 1;
        }
        count
    }
}

/// Build a bounded bridge with room for `capacity` pending events.
pub fn event_bridge(capacity: usize) -> (NoteSender, EventBridge) {
    let (tx, rx) = RingBuffer::<NoteEvent>::new(capacity.max(1));
    (NoteSender { tx }, EventBridge::new(rx))
}
