//! Synthetic test signal fed to every kernel variant.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Half-periods of the sine across the buffer: `x[i] = sin(3.5 * i * PI / n)`.
pub const DEFAULT_CYCLES: f64 = 3.5;

/// Shape of the synthesized signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub sample_count: usize,
    pub cycles: f64,
}

impl Default for SignalSpec {
    fn default() -> Self {
        Self { sample_count: crate::DEFAULT_SAMPLE_COUNT, cycles: DEFAULT_CYCLES }
    }
}

impl SignalSpec {
    /// Generate the samples described by this spec.
    pub fn synthesize(&self) -> Vec<f32> {
        synthesize(self.sample_count, self.cycles)
    }
}

/// Generate `n` samples of `sin(cycles * i * PI / n)`.
///
/// The phase is computed in `f64` and narrowed once, so every sample lies
/// in `[-1, 1]` and encodes into Q15 without clipping the shape.
pub fn synthesize(n: usize, cycles: f64) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let step = cycles * PI / n as f64;
    (0..n).map(|i| (step * i as f64).sin() as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_signal() {
        assert!(synthesize(0, DEFAULT_CYCLES).is_empty());
    }

    #[test]
    fn starts_at_zero_and_stays_in_unit_range() {
        let x = synthesize(1024, DEFAULT_CYCLES);
        assert_eq!(x.len(), 1024);
        assert_eq!(x[0], 0.0);
        assert!(x.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn quarter_period_peaks() {
        // 3.5 half-periods over 1024 samples: first peak at i = 1024 / 7.
        let x = synthesize(1024, DEFAULT_CYCLES);
        let peak = x.iter().cloned().fold(f32::MIN, f32::max);
        assert!(peak > 0.999, "peak {peak}");
    }

    #[test]
    fn spec_default_matches_constants() {
        let spec = SignalSpec::default();
        assert_eq!(spec.sample_count, 1024);
        assert_eq!(spec.synthesize(), synthesize(1024, 3.5));
    }
}
