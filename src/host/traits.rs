// src/host/traits.rs
//! Scheduler-facing contract of the real-time core

use crate::engine::{ProtocolSequencer, StimOutput, StimulusError};
use crate::host::events::EventSink;

/// What a real-time host scheduler drives.
///
/// The host invokes `tick` at a fixed period dt, calls `on_period_change`
/// before the first tick and after any accepted period change, and calls
/// `reset` when it resumes tick delivery after a pause. The host guarantees
/// these calls are serialized — never concurrent with each other or with a
/// tick in flight; the core relies on that and performs no locking.
pub trait RealTimeModule {
    /// Produce the two channel outputs for this tick.
    fn tick(&mut self) -> StimOutput;

    /// Adopt a new sample period (s); never invoked mid-tick.
    fn on_period_change(&mut self, dt: f64) -> Result<(), StimulusError>;

    /// Restart run timing from t = 0 after a host-level resume.
    fn reset(&mut self);
}

impl<S: EventSink> RealTimeModule for ProtocolSequencer<S> {
    fn tick(&mut self) -> StimOutput {
        ProtocolSequencer::tick(self)
    }

    fn on_period_change(&mut self, dt: f64) -> Result<(), StimulusError> {
        ProtocolSequencer::on_period_change(self, dt)
    }

    fn reset(&mut self) {
        ProtocolSequencer::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingParameters;

    #[test]
    fn sequencer_is_drivable_through_the_trait() {
        let mut seq = ProtocolSequencer::new(TimingParameters::default(), 1e-5).unwrap();
        let module: &mut dyn RealTimeModule = &mut seq;

        module.on_period_change(2e-5).unwrap();
        module.reset();
        let out = module.tick();
        assert_eq!(out.ap_stim, 0.0);
    }
}
