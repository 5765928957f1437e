// src/waveform/mod.rs
//! Sample-accurate waveform synthesis primitives

pub mod pulse;
pub mod sine;

pub use pulse::{PulseBuffer, PulsePolarity};
pub use sine::SineOscillator;

/// Instantaneous output value for one channel at one tick.
///
/// f64 because phase accumulation and second-resolution timing parameters
/// need the headroom over long runs.
pub type Sample = f64;
