// src/waveform/sine.rs
//! Restartable fixed-period sine generator for the HFAC channel

use super::Sample;
use std::f64::consts::TAU;

/// Stateful sine-wave generator producing one sample per call at a fixed
/// sample period.
///
/// `next_sample` mutates the internal phase on every call, so it is neither
/// idempotent nor safe for concurrent callers. The phase is wrapped modulo
/// 2π after each advance; over long runs the accumulator stays bounded and
/// rounding error does not grow with run length.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    amplitude: f64,
    phase: f64,
    phase_increment: f64,
}

impl SineOscillator {
    /// Create a generator for `frequency_hz` at amplitude `amplitude`,
    /// sampled every `dt` seconds.
    pub fn new(frequency_hz: f64, amplitude: f64, dt: f64) -> Self {
        let mut osc = Self {
            amplitude: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
        };
        osc.init(frequency_hz, amplitude, dt);
        osc
    }

    /// Reconfigure frequency, amplitude, and sample period, resetting the
    /// phase to zero.
    ///
    /// A frequency of zero or below degrades to a constant-zero signal
    /// (the phase increment clamps to zero); it never fails.
    pub fn init(&mut self, frequency_hz: f64, amplitude: f64, dt: f64) {
        self.amplitude = amplitude;
        self.phase = 0.0;
        self.phase_increment = if frequency_hz > 0.0 {
            TAU * frequency_hz * dt
        } else {
            0.0
        };
    }

    /// Return the sample for the current phase, then advance the phase by
    /// one sample period.
    pub fn next_sample(&mut self) -> Sample {
        let value = self.amplitude * self.phase.sin();
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        value
    }
}
