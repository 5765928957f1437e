// src/host/mod.rs
//! The host/core boundary: scheduler-facing trait and event handoff

pub mod events;
pub mod traits;

pub use events::{ChannelSink, EventSink, NullSink, SequencerEvent};
pub use traits::RealTimeModule;
