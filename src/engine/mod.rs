// src/engine/mod.rs
//! Per-tick stimulus production and protocol sequencing

pub mod sequencer;
pub mod stimulus;

pub use sequencer::{ProtocolSequencer, SequencerError, SequencerState, StimOutput};
pub use stimulus::{PulseSample, StimulusEngine, StimulusError};
