// src/engine/stimulus.rs
//! Single authority for the next sample on each output channel

use crate::config::TimingParameters;
use crate::waveform::{PulseBuffer, Sample, SineOscillator};
use thiserror::Error;

/// Invariant violations in stimulus production.
///
/// Both variants are caller contract breaches, fatal to the call and never
/// a data-dependent runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StimulusError {
    /// The host supplied a non-positive or non-finite sample period.
    #[error("sample period must be positive and finite, got {0}")]
    InvalidSamplePeriod(f64),

    /// A pulse cursor pointed past the end of the current buffer.
    #[error("pulse cursor {cursor} outside buffer of {len} samples")]
    CursorOutOfRange {
        /// The offending cursor value.
        cursor: usize,
        /// Length of the buffer it was applied to.
        len: usize,
    },
}

/// One AP channel sample plus whether the pulse ends after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseSample {
    /// The sample value at the requested cursor.
    pub value: Sample,
    /// True when this is the last sample of the pulse buffer.
    pub exhausted: bool,
}

/// Owns the pulse buffer and the HFAC oscillator and keeps both consistent
/// with the current timing parameters and sample period.
///
/// Single-threaded by contract: the host serializes ticks and parameter
/// changes, so nothing here locks.
#[derive(Debug, Clone)]
pub struct StimulusEngine {
    params: TimingParameters,
    dt: f64,
    pulse: PulseBuffer,
    oscillator: SineOscillator,
}

impl StimulusEngine {
    /// Build an engine for `params` at sample period `dt`.
    ///
    /// `params` must already be validated ([`TimingParameters::validate`]);
    /// only the sample period is checked here.
    pub fn new(params: TimingParameters, dt: f64) -> Result<Self, StimulusError> {
        Self::check_period(dt)?;
        Ok(Self {
            pulse: Self::build_pulse(&params, dt),
            oscillator: SineOscillator::new(params.hfac_frequency_hz, params.hfac_amplitude, dt),
            params,
            dt,
        })
    }

    /// Re-synthesize both stimuli for new parameters and/or a new period.
    ///
    /// Safe to call mid-run; an in-flight pulse cursor is not guaranteed to
    /// stay meaningful afterwards, so callers restart runs rather than
    /// resuming mid-buffer.
    pub fn reconfigure(&mut self, params: TimingParameters, dt: f64) -> Result<(), StimulusError> {
        Self::check_period(dt)?;
        self.pulse = Self::build_pulse(&params, dt);
        self.oscillator
            .init(params.hfac_frequency_hz, params.hfac_amplitude, dt);
        self.params = params;
        self.dt = dt;
        Ok(())
    }

    /// Next HFAC channel sample.
    ///
    /// The oscillator phase advances on every call, even when the caller
    /// discards the value; gating the HFAC channel off must not change the
    /// phase observed after re-enabling it.
    pub fn hfac_sample(&mut self) -> Sample {
        self.oscillator.next_sample()
    }

    /// AP channel sample at `cursor`.
    pub fn pulse_sample(&self, cursor: usize) -> Result<PulseSample, StimulusError> {
        match self.pulse.get(cursor) {
            Some(value) => Ok(PulseSample {
                value,
                exhausted: cursor + 1 >= self.pulse.len(),
            }),
            None => Err(StimulusError::CursorOutOfRange {
                cursor,
                len: self.pulse.len(),
            }),
        }
    }

    /// Length of the current pulse buffer in samples.
    pub fn pulse_len(&self) -> usize {
        self.pulse.len()
    }

    /// The active parameter batch.
    pub fn params(&self) -> &TimingParameters {
        &self.params
    }

    /// The active sample period (s).
    pub fn sample_period(&self) -> f64 {
        self.dt
    }

    fn check_period(dt: f64) -> Result<(), StimulusError> {
        if dt.is_finite() && dt > 0.0 {
            Ok(())
        } else {
            Err(StimulusError::InvalidSamplePeriod(dt))
        }
    }

    fn build_pulse(params: &TimingParameters, dt: f64) -> PulseBuffer {
        PulseBuffer::build(
            params.stim_amplitude,
            params.stim_width_s,
            params.stim_delay_s,
            dt,
            params.polarity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> StimulusEngine {
        StimulusEngine::new(TimingParameters::default(), 1e-5).unwrap()
    }

    #[test]
    fn rejects_non_positive_or_non_finite_period() {
        let params = TimingParameters::default();
        for dt in [0.0, -1e-5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                StimulusEngine::new(params, dt),
                Err(StimulusError::InvalidSamplePeriod(_))
            ));
        }
    }

    #[test]
    fn pulse_length_follows_floor_formula() {
        let engine = engine();
        let p = TimingParameters::default();
        let expected = (p.stim_delay_s / 1e-5).floor() as usize
            + 2 * (p.stim_width_s / 1e-5).floor() as usize
            + 1;
        assert_eq!(engine.pulse_len(), expected);
    }

    #[test]
    fn reconfigure_changes_pulse_length_deterministically() {
        let mut engine = engine();
        let before = engine.pulse_len();

        engine.reconfigure(TimingParameters::default(), 2e-5).unwrap();
        let p = TimingParameters::default();
        let expected = (p.stim_delay_s / 2e-5).floor() as usize
            + 2 * (p.stim_width_s / 2e-5).floor() as usize
            + 1;
        assert_eq!(engine.pulse_len(), expected);
        assert_ne!(engine.pulse_len(), before);
    }

    #[test]
    fn cursor_past_buffer_is_an_error() {
        let engine = engine();
        let len = engine.pulse_len();

        assert!(engine.pulse_sample(len - 1).unwrap().exhausted);
        assert_eq!(
            engine.pulse_sample(len),
            Err(StimulusError::CursorOutOfRange { cursor: len, len })
        );
    }

    #[test]
    fn discarded_hfac_samples_still_advance_phase() {
        let params = TimingParameters {
            hfac_frequency_hz: 100.0,
            ..Default::default()
        };
        let mut gated = StimulusEngine::new(params, 1e-4).unwrap();
        let mut free = StimulusEngine::new(params, 1e-4).unwrap();

        // The gated engine draws and discards three samples.
        for _ in 0..3 {
            let _ = gated.hfac_sample();
            let _ = free.hfac_sample();
        }
        assert_eq!(gated.hfac_sample(), free.hfac_sample());
    }
}
