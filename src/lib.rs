//! hfac-core: real-time signal generation and protocol sequencing for
//! HFAC nerve conduction block experiments
//!
//! Two output channels are synthesized sample by sample inside a host's
//! fixed-period tick callback: a biphasic square stimulus pulse ("AP Stim")
//! that evokes action potentials, and a sinusoidal blocking waveform
//! ("HFAC Signal"). The core provides:
//!
//! - Sample-accurate waveform synthesis (biphasic pulse, sine generator)
//! - A tick-driven state machine for manual triggering and timed protocols
//! - Wholesale re-synthesis of all sample-domain quantities on any
//!   parameter or sample-period change
//! - A bounded, non-blocking event channel from the tick path to the host
//!
//! Every tick performs bounded computation with no allocation and no
//! blocking; the host must serialize ticks against parameter changes.
//!
//! # Quick Start
//!
//! ```rust
//! use hfac_core::config::TimingParameters;
//! use hfac_core::engine::ProtocolSequencer;
//!
//! let params = TimingParameters::default();
//! let mut seq = ProtocolSequencer::new(params, 1e-5)?;
//!
//! seq.run_protocol();
//! for _ in 0..100 {
//!     let out = seq.tick();
//!     assert!(out.ap_stim.is_finite() && out.hfac.is_finite());
//! }
//! # Ok::<(), hfac_core::engine::StimulusError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod host;
pub mod waveform;

// Re-export commonly used types for convenience
pub use config::{ConfigLoader, ParameterError, TimingParameters, TimingWarning, TrialConfig};
pub use engine::{ProtocolSequencer, SequencerState, StimOutput, StimulusEngine, StimulusError};
pub use host::{ChannelSink, EventSink, NullSink, RealTimeModule, SequencerEvent};
pub use waveform::{PulseBuffer, PulsePolarity, Sample, SineOscillator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "hfac-core");
    }
}
