// src/host/events.rs
//! Sequencer events and sinks for RT-to-host handoff

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};

/// Externally observable sequencer transitions.
///
/// These are abstract requests to host collaborators (scheduler, record
/// sink); the core never pauses itself or writes files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// The host should resume delivering ticks.
    ResumeRequested,
    /// The host should stop delivering ticks.
    PauseRequested,
    /// A run started; the record sink may open a new trial.
    RecordingStarted,
    /// A protocol completed; the record sink may close the trial.
    RecordingStopped,
}

/// Receiver of sequencer events.
///
/// `post` is called from inside the tick path and must never block or
/// allocate.
pub trait EventSink {
    /// Deliver one event; must return without blocking.
    fn post(&mut self, event: SequencerEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn post(&mut self, _event: SequencerEvent) {}
}

/// Bounded lock-free channel sink.
///
/// The sequencer posts with a non-blocking `try_send`; the paired receiver
/// is drained off the real-time thread. When the queue is full the event is
/// dropped with a warning rather than stalling the producer.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<SequencerEvent>,
}

impl ChannelSink {
    /// Create a sink and its receiver with a fixed capacity.
    pub fn bounded(capacity: usize) -> (Self, Receiver<SequencerEvent>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn post(&mut self, event: SequencerEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "event queue full, dropping sequencer event");
            }
            Err(TrySendError::Disconnected(_)) => {
                // Host went away; nothing left to notify.
            }
        }
    }
}
