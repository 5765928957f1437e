// src/waveform/pulse.rs
//! Biphasic square-pulse construction for the AP Stim channel

use super::Sample;
use serde::{Deserialize, Serialize};

/// Lobe order of the biphasic stimulus pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulsePolarity {
    /// Positive lobe first, then negative.
    PositiveThenNegative,
    /// Negative lobe first, then positive.
    NegativeThenPositive,
}

impl Default for PulsePolarity {
    fn default() -> Self {
        PulsePolarity::PositiveThenNegative
    }
}

/// One pre-computed AP stimulus pulse: a delay of zeros, two equal
/// opposite-polarity lobes, and a single trailing zero.
///
/// The buffer is regenerated wholesale on every parameter or period change
/// and never mutated in place; the sequencer only reads it by index.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseBuffer {
    samples: Vec<Sample>,
}

impl PulseBuffer {
    /// Build a pulse of `2 * floor(width_s / dt)` lobe samples preceded by
    /// `floor(delay_s / dt)` zeros and followed by one trailing zero.
    ///
    /// Total length is exactly `floor(delay/dt) + 2*floor(width/dt) + 1`;
    /// the sequencer relies on this formula for its loop bounds, so it uses
    /// floor, never round. Callers must guard against degenerate inputs
    /// (dt <= 0, negative width or delay); no validation happens here.
    pub fn build(
        amplitude: f64,
        width_s: f64,
        delay_s: f64,
        dt: f64,
        polarity: PulsePolarity,
    ) -> Self {
        let delay_samples = (delay_s / dt).floor() as usize;
        let lobe_samples = (width_s / dt).floor() as usize;

        let first_lobe = match polarity {
            PulsePolarity::PositiveThenNegative => amplitude,
            PulsePolarity::NegativeThenPositive => -amplitude,
        };

        let mut samples = Vec::with_capacity(delay_samples + 2 * lobe_samples + 1);
        samples.extend(std::iter::repeat(0.0).take(delay_samples));
        samples.extend(std::iter::repeat(first_lobe).take(lobe_samples));
        samples.extend(std::iter::repeat(-first_lobe).take(lobe_samples));
        samples.push(0.0);

        Self { samples }
    }

    /// Number of samples in the pulse, trailing zero included.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: even a zero-width, zero-delay pulse has its trailing
    /// zero sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The full sample sequence.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sample at `idx`, or None past the end.
    pub fn get(&self, idx: usize) -> Option<Sample> {
        self.samples.get(idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expected_len(width_s: f64, delay_s: f64, dt: f64) -> usize {
        (delay_s / dt).floor() as usize + 2 * (width_s / dt).floor() as usize + 1
    }

    #[test]
    fn layout_positive_then_negative() {
        let dt = 0.0001;
        let buf = PulseBuffer::build(2.5, 0.00045, 0.00035, dt, PulsePolarity::PositiveThenNegative);

        // 3 delay zeros, 4 positive, 4 negative, 1 trailing zero
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf.samples()[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&buf.samples()[3..7], &[2.5, 2.5, 2.5, 2.5]);
        assert_eq!(&buf.samples()[7..11], &[-2.5, -2.5, -2.5, -2.5]);
        assert_eq!(buf.samples()[11], 0.0);
    }

    #[test]
    fn layout_negative_then_positive() {
        let dt = 0.0001;
        let buf = PulseBuffer::build(1.0, 0.00025, 0.0, dt, PulsePolarity::NegativeThenPositive);

        assert_eq!(buf.len(), 5);
        assert_eq!(buf.samples(), &[-1.0, -1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn zero_width_and_delay_is_single_zero() {
        let buf = PulseBuffer::build(1.0, 0.0, 0.0, 0.001, PulsePolarity::PositiveThenNegative);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.get(0), Some(0.0));
        assert_eq!(buf.get(1), None);
    }

    #[test]
    fn sub_period_width_truncates_to_zero_lobes() {
        // width shorter than one sample period contributes no lobe samples
        let buf = PulseBuffer::build(1.0, 0.0004, 0.00015, 0.001, PulsePolarity::PositiveThenNegative);
        assert_eq!(buf.len(), 1);
    }

    proptest! {
        #[test]
        fn length_matches_floor_formula(
            amplitude in 0.1f64..10.0,
            width_s in 0.0f64..0.01,
            delay_s in 0.0f64..0.01,
            dt in 1e-6f64..1e-2,
        ) {
            let buf = PulseBuffer::build(
                amplitude, width_s, delay_s, dt,
                PulsePolarity::PositiveThenNegative,
            );
            prop_assert_eq!(buf.len(), expected_len(width_s, delay_s, dt));
        }

        #[test]
        fn last_sample_is_always_zero(
            width_s in 0.0f64..0.01,
            delay_s in 0.0f64..0.01,
            dt in 1e-6f64..1e-2,
        ) {
            let buf = PulseBuffer::build(
                1.0, width_s, delay_s, dt,
                PulsePolarity::NegativeThenPositive,
            );
            prop_assert_eq!(buf.get(buf.len() - 1), Some(0.0));
        }
    }
}
