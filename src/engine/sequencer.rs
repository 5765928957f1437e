// src/engine/sequencer.rs
//! Tick-by-tick state machine for manual and timed-protocol stimulation

use crate::config::{ParameterError, TimingParameters, TimingWarning};
use crate::engine::stimulus::{StimulusEngine, StimulusError};
use crate::host::events::{EventSink, NullSink, SequencerEvent};
use crate::waveform::{PulsePolarity, Sample};
use thiserror::Error;

/// Execution mode of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// No channel driven by the sequencer; HFAC follows its gate flag.
    Idle,
    /// A manually triggered pulse is being emitted.
    PulseActive,
    /// `run_protocol` accepted; promoted to Running at the next tick.
    ProtocolArmed,
    /// Timed trial in progress: HFAC forced on, AP pulse window-triggered.
    ProtocolRunning,
    /// Momentary cleanup state inside the completing tick.
    ProtocolComplete,
}

/// The two output scalars produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimOutput {
    /// Biphasic AP stimulus channel.
    pub ap_stim: Sample,
    /// HFAC conduction-block channel.
    pub hfac: Sample,
}

impl StimOutput {
    const ZERO: StimOutput = StimOutput {
        ap_stim: 0.0,
        hfac: 0.0,
    };
}

/// Errors from sequencer-level parameter handling.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SequencerError {
    /// The parameter batch failed hard validation; the edit was rejected.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Stimulus re-synthesis failed.
    #[error(transparent)]
    Stimulus(#[from] StimulusError),
}

/// The state machine deciding, tick by tick, what each channel outputs.
///
/// Drives a [`StimulusEngine`] and posts externally observable transitions
/// to an [`EventSink`]. Single-threaded by contract: the host serializes
/// `tick` against every other method; nothing in the tick path allocates
/// or blocks.
#[derive(Debug)]
pub struct ProtocolSequencer<S: EventSink = NullSink> {
    engine: StimulusEngine,
    state: SequencerState,
    cursor: usize,
    elapsed_ticks: u64,
    hfac_enabled: bool,
    sink: S,
}

impl ProtocolSequencer<NullSink> {
    /// Sequencer without an event sink.
    pub fn new(params: TimingParameters, dt: f64) -> Result<Self, StimulusError> {
        Self::with_sink(params, dt, NullSink)
    }
}

impl<S: EventSink> ProtocolSequencer<S> {
    /// Sequencer posting host-control events to `sink`.
    pub fn with_sink(params: TimingParameters, dt: f64, sink: S) -> Result<Self, StimulusError> {
        Ok(Self {
            engine: StimulusEngine::new(params, dt)?,
            state: SequencerState::Idle,
            cursor: 0,
            elapsed_ticks: 0,
            hfac_enabled: false,
            sink,
        })
    }

    /// Produce one sample per channel for this tick.
    ///
    /// The HFAC oscillator advances exactly once per tick in every state,
    /// whether or not its value reaches the output; see
    /// [`StimulusEngine::hfac_sample`].
    pub fn tick(&mut self) -> StimOutput {
        let systime = self.elapsed_ticks as f64 * self.engine.sample_period();
        let hfac = self.engine.hfac_sample();

        if self.state == SequencerState::ProtocolArmed {
            self.state = SequencerState::ProtocolRunning;
        }

        let out = match self.state {
            SequencerState::ProtocolRunning => self.protocol_tick(systime, hfac),
            SequencerState::PulseActive => self.manual_pulse_tick(hfac),
            _ => StimOutput {
                ap_stim: 0.0,
                hfac: self.gated(hfac),
            },
        };

        self.elapsed_ticks += 1;
        out
    }

    /// Trigger one manual pulse. No-op unless Idle, so duplicate external
    /// triggers are tolerated.
    pub fn send_single_pulse(&mut self) {
        if self.state != SequencerState::Idle {
            return;
        }
        self.cursor = 0;
        self.state = SequencerState::PulseActive;
    }

    /// Gate the HFAC channel on or off.
    ///
    /// Independent of the state machine; while a protocol runs the flag is
    /// overridden (HFAC forced on) and forced off again on completion.
    pub fn set_hfac_enabled(&mut self, on: bool) {
        self.hfac_enabled = on;
    }

    /// Start a timed protocol trial.
    ///
    /// Accepted from Idle or PulseActive (cancelling the manual pulse);
    /// a no-op while a protocol is already armed or running. Posts
    /// `ResumeRequested` so a paused host starts delivering ticks, then
    /// performs the resume reset.
    pub fn run_protocol(&mut self) {
        match self.state {
            SequencerState::Idle | SequencerState::PulseActive => {}
            _ => return,
        }
        self.cursor = 0;
        self.hfac_enabled = true;
        self.state = SequencerState::ProtocolArmed;
        self.sink.post(SequencerEvent::ResumeRequested);
        self.reset();
    }

    /// Host-resume hook: restart run timing from t = 0.
    ///
    /// The host calls this when it resumes tick delivery after a pause; a
    /// trial in progress starts over rather than self-resuming mid-trial.
    pub fn reset(&mut self) {
        self.elapsed_ticks = 0;
        self.cursor = 0;
        self.sink.post(SequencerEvent::RecordingStarted);
    }

    /// Apply a full parameter batch from the UI.
    ///
    /// Hard validation failures reject the edit and leave everything
    /// untouched; non-fatal warnings are returned for the UI to display.
    /// The sequencer state is not changed, but an in-flight run's cursor
    /// may no longer be meaningful (the next tick then aborts the run).
    pub fn on_parameter_change(
        &mut self,
        params: TimingParameters,
    ) -> Result<Vec<TimingWarning>, SequencerError> {
        let warnings = params.validate()?;
        self.engine.reconfigure(params, self.engine.sample_period())?;
        Ok(warnings)
    }

    /// Adopt a new sample period from the host.
    ///
    /// Re-synthesizes both stimuli; no state change, and the live outputs
    /// are not forced to zero.
    pub fn on_period_change(&mut self, dt: f64) -> Result<(), StimulusError> {
        self.engine.reconfigure(*self.engine.params(), dt)
    }

    /// Flip the pulse polarity and re-synthesize; shorthand for a batch
    /// with only the polarity changed.
    pub fn set_polarity(&mut self, polarity: PulsePolarity) -> Result<(), StimulusError> {
        let params = TimingParameters {
            polarity,
            ..*self.engine.params()
        };
        self.engine.reconfigure(params, self.engine.sample_period())
    }

    /// Current execution mode.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Run time in seconds, `elapsed_ticks * dt`.
    pub fn systime(&self) -> f64 {
        self.elapsed_ticks as f64 * self.engine.sample_period()
    }

    /// Ticks since the last run start or reset.
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// The active parameter batch.
    pub fn params(&self) -> &TimingParameters {
        self.engine.params()
    }

    /// Whether the HFAC gate flag is set.
    pub fn hfac_enabled(&self) -> bool {
        self.hfac_enabled
    }

    /// Whether the UI should currently offer the single-pulse trigger.
    pub fn single_pulse_enabled(&self) -> bool {
        self.state == SequencerState::Idle
    }

    fn protocol_tick(&mut self, systime: f64, hfac: Sample) -> StimOutput {
        let params = *self.engine.params();

        if systime >= params.trial_duration_s {
            self.complete_protocol();
            return StimOutput::ZERO;
        }

        let window_start = params.stim_delay_s;
        let window_end = window_start + 2.0 * params.stim_width_s;
        let ap_stim = if systime > window_start && systime <= window_end {
            let cursor = self.cursor;
            self.cursor += 1;
            match self.engine.pulse_sample(cursor) {
                Ok(sample) => sample.value,
                Err(_) => {
                    // Pathological width/dt ratios can let the systime
                    // window outlast the buffer; pad with zeros.
                    tracing::warn!(cursor, "stimulus window outran the pulse buffer");
                    0.0
                }
            }
        } else {
            0.0
        };

        StimOutput { ap_stim, hfac }
    }

    fn complete_protocol(&mut self) {
        self.state = SequencerState::ProtocolComplete;
        self.hfac_enabled = false;
        self.cursor = 0;
        self.sink.post(SequencerEvent::PauseRequested);
        self.sink.post(SequencerEvent::RecordingStopped);
        self.state = SequencerState::Idle;
    }

    fn manual_pulse_tick(&mut self, hfac: Sample) -> StimOutput {
        let ap_stim = match self.engine.pulse_sample(self.cursor) {
            Ok(sample) => {
                if sample.exhausted {
                    self.cursor = 0;
                    self.state = SequencerState::Idle;
                } else {
                    self.cursor += 1;
                }
                sample.value
            }
            Err(_) => {
                // Stale cursor after a mid-run reconfiguration.
                tracing::warn!(
                    cursor = self.cursor,
                    "pulse cursor invalid after reconfiguration, aborting pulse"
                );
                self.cursor = 0;
                self.state = SequencerState::Idle;
                0.0
            }
        };

        StimOutput {
            ap_stim,
            hfac: self.gated(hfac),
        }
    }

    fn gated(&self, hfac: Sample) -> Sample {
        if self.hfac_enabled {
            hfac
        } else {
            0.0
        }
    }
}
