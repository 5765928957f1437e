// src/config/mod.rs
//! Typed trial configuration: timing parameters, host settings, validation

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::waveform::PulsePolarity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The full parameter batch for one stimulation setup.
///
/// All time quantities are seconds and all frequencies Hz; any ms or kHz
/// display conversion is the parameter UI's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingParameters {
    /// AP stimulus lobe amplitude (V).
    #[serde(default = "defaults::stim_amplitude")]
    pub stim_amplitude: f64,

    /// Duration of one AP stimulus lobe (s).
    #[serde(default = "defaults::stim_width_s")]
    pub stim_width_s: f64,

    /// Delay from trial start to the AP stimulus (s).
    #[serde(default = "defaults::stim_delay_s")]
    pub stim_delay_s: f64,

    /// HFAC blocking signal frequency (Hz).
    #[serde(default = "defaults::hfac_frequency_hz")]
    pub hfac_frequency_hz: f64,

    /// HFAC blocking signal amplitude (V).
    #[serde(default = "defaults::hfac_amplitude")]
    pub hfac_amplitude: f64,

    /// Length of one timed protocol trial (s).
    #[serde(default = "defaults::trial_duration_s")]
    pub trial_duration_s: f64,

    /// Lobe order of the AP stimulus pulse.
    #[serde(default)]
    pub polarity: PulsePolarity,
}

impl Default for TimingParameters {
    fn default() -> Self {
        Self {
            stim_amplitude: defaults::stim_amplitude(),
            stim_width_s: defaults::stim_width_s(),
            stim_delay_s: defaults::stim_delay_s(),
            hfac_frequency_hz: defaults::hfac_frequency_hz(),
            hfac_amplitude: defaults::hfac_amplitude(),
            trial_duration_s: defaults::trial_duration_s(),
            polarity: PulsePolarity::default(),
        }
    }
}

impl TimingParameters {
    /// Hard-validate the batch, then collect non-fatal warnings.
    ///
    /// Non-finite values and negative durations reject the whole batch; a
    /// trial duration that does not exceed the stimulus delay is only
    /// warned about — the run still proceeds (and terminates almost
    /// immediately).
    pub fn validate(&self) -> Result<Vec<TimingWarning>, ParameterError> {
        let fields = [
            ("stim_amplitude", self.stim_amplitude),
            ("stim_width_s", self.stim_width_s),
            ("stim_delay_s", self.stim_delay_s),
            ("hfac_frequency_hz", self.hfac_frequency_hz),
            ("hfac_amplitude", self.hfac_amplitude),
            ("trial_duration_s", self.trial_duration_s),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { field, value });
            }
        }

        let durations = [
            ("stim_width_s", self.stim_width_s),
            ("stim_delay_s", self.stim_delay_s),
            ("trial_duration_s", self.trial_duration_s),
        ];
        for (field, value) in durations {
            if value < 0.0 {
                return Err(ParameterError::Negative { field, value });
            }
        }

        let mut warnings = Vec::new();
        if self.trial_duration_s <= self.stim_delay_s {
            warnings.push(TimingWarning::DurationNotAfterDelay {
                trial_duration_s: self.trial_duration_s,
                stim_delay_s: self.stim_delay_s,
            });
        }
        Ok(warnings)
    }
}

/// Rejected parameter edit: the previous batch stays active.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParameterError {
    /// A field held NaN or an infinity.
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A duration field was negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Non-fatal configuration warning, surfaced to the UI as a message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingWarning {
    /// The timed trial would end at or before the AP stimulus fires.
    DurationNotAfterDelay {
        /// The configured trial duration (s).
        trial_duration_s: f64,
        /// The configured stimulus delay (s).
        stim_delay_s: f64,
    },
}

impl std::fmt::Display for TimingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingWarning::DurationNotAfterDelay {
                trial_duration_s,
                stim_delay_s,
            } => write!(
                f,
                "trial duration ({trial_duration_s} s) should exceed the AP stimulus delay \
                 ({stim_delay_s} s); consider lengthening the trial"
            ),
        }
    }
}

/// What an offline or embedded host needs beyond the core parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Tick period dt (s), strictly positive.
    #[serde(default = "defaults::sample_period_s")]
    pub sample_period_s: f64,

    /// Capacity of the bounded sequencer-event queue.
    #[serde(default = "defaults::event_queue_capacity")]
    pub event_queue_capacity: usize,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            sample_period_s: defaults::sample_period_s(),
            event_queue_capacity: defaults::event_queue_capacity(),
        }
    }
}

/// Top-level configuration document for one trial setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default)]
    pub timing: TimingParameters,

    #[serde(default)]
    pub host: HostSettings,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            timing: TimingParameters::default(),
            host: HostSettings::default(),
        }
    }
}

impl TrialConfig {
    /// Validate the whole document; timing warnings pass through.
    pub fn validate(&self) -> Result<Vec<TimingWarning>, ConfigError> {
        if !self.host.sample_period_s.is_finite() || self.host.sample_period_s <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "host.sample_period_s must be positive, got {}",
                self.host.sample_period_s
            )));
        }
        self.timing
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Default value providers using constants
mod defaults {
    use super::constants::*;

    pub fn stim_amplitude() -> f64 {
        stim::DEFAULT_AMPLITUDE
    }
    pub fn stim_width_s() -> f64 {
        stim::DEFAULT_WIDTH_S
    }
    pub fn stim_delay_s() -> f64 {
        stim::DEFAULT_DELAY_S
    }
    pub fn hfac_frequency_hz() -> f64 {
        hfac::DEFAULT_FREQUENCY_HZ
    }
    pub fn hfac_amplitude() -> f64 {
        hfac::DEFAULT_AMPLITUDE
    }
    pub fn trial_duration_s() -> f64 {
        stim::DEFAULT_TRIAL_DURATION_S
    }

    pub fn sample_period_s() -> f64 {
        host::DEFAULT_SAMPLE_PERIOD_S
    }
    pub fn event_queue_capacity() -> usize {
        host::DEFAULT_EVENT_QUEUE_CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_warning_free() {
        let warnings = TimingParameters::default().validate().unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn short_duration_warns_but_passes() {
        let params = TimingParameters {
            trial_duration_s: 0.0001,
            stim_delay_s: 0.0002,
            ..Default::default()
        };
        let warnings = params.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            TimingWarning::DurationNotAfterDelay { .. }
        ));
    }

    #[test]
    fn non_finite_amplitude_is_rejected() {
        let params = TimingParameters {
            hfac_amplitude: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::NonFinite {
                field: "hfac_amplitude",
                ..
            })
        ));
    }

    #[test]
    fn negative_width_is_rejected() {
        let params = TimingParameters {
            stim_width_s: -0.001,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::Negative {
                field: "stim_width_s",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_sample_period_is_rejected() {
        let config = TrialConfig {
            host: HostSettings {
                sample_period_s: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
