//! Timing results of a benchmark pass.

use std::time::Duration;

use acorr_kernels::{KernelVariant, SampleEncoding, Verification};
use serde::{Deserialize, Serialize};

/// Wall-clock result of one kernel variant under one encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantTiming {
    pub encoding: SampleEncoding,
    pub variant: KernelVariant,
    pub kernel_name: String,
    pub iterations: usize,
    /// Seconds spent in the timed loop.
    pub elapsed_secs: f64,
    pub seconds_per_run: f64,
    pub runs_per_second: f64,
    /// Present when the plan asked for verification.
    pub verification: Option<Verification>,
}

impl VariantTiming {
    pub fn new(
        encoding: SampleEncoding,
        variant: KernelVariant,
        iterations: usize,
        elapsed: Duration,
    ) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let seconds_per_run = if iterations == 0 { 0.0 } else { elapsed_secs / iterations as f64 };
        let runs_per_second = if elapsed_secs > 0.0 { iterations as f64 / elapsed_secs } else { 0.0 };
        Self {
            encoding,
            variant,
            kernel_name: acorr_kernels::kernel_name(variant, encoding).to_string(),
            iterations,
            elapsed_secs,
            seconds_per_run,
            runs_per_second,
            verification: None,
        }
    }

    /// `false` only when verification ran and failed.
    pub fn verified_ok(&self) -> bool {
        self.verification.is_none_or(|v| v.passed)
    }
}

/// Everything one pass measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    pub backend: String,
    pub device: String,
    pub sample_count: usize,
    pub work_group_size: usize,
    pub iterations: usize,
    pub warmup_iterations: usize,
    pub timings: Vec<VariantTiming>,
    /// Wall-clock time of the whole pass, including loads and downloads.
    pub total_secs: f64,
}

impl BenchReport {
    /// Timing with the lowest time per run.
    pub fn fastest(&self) -> Option<&VariantTiming> {
        self.timings.iter().min_by(|a, b| a.seconds_per_run.total_cmp(&b.seconds_per_run))
    }

    /// Fastest timing for a single encoding.
    pub fn fastest_for(&self, encoding: SampleEncoding) -> Option<&VariantTiming> {
        self.timings
            .iter()
            .filter(|t| t.encoding == encoding)
            .min_by(|a, b| a.seconds_per_run.total_cmp(&b.seconds_per_run))
    }

    /// Whether every verified timing passed.
    pub fn all_verified(&self) -> bool {
        self.timings.iter().all(VariantTiming::verified_ok)
    }

    /// Timings whose verification failed.
    pub fn failures(&self) -> impl Iterator<Item = &VariantTiming> {
        self.timings.iter().filter(|t| !t.verified_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(encoding: SampleEncoding, variant: KernelVariant, millis: u64) -> VariantTiming {
        VariantTiming::new(encoding, variant, 100, Duration::from_millis(millis))
    }

    #[test]
    fn per_run_figures() {
        let t = timing(SampleEncoding::F32, KernelVariant::Naive, 500);
        assert_eq!(t.kernel_name, "acorr");
        assert!((t.elapsed_secs - 0.5).abs() < 1e-12);
        assert!((t.seconds_per_run - 0.005).abs() < 1e-12);
        assert!((t.runs_per_second - 200.0).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_has_no_rate() {
        let t = VariantTiming::new(SampleEncoding::F16, KernelVariant::Vec4, 10, Duration::ZERO);
        assert_eq!(t.runs_per_second, 0.0);
    }

    #[test]
    fn fastest_picks_lowest_per_run() {
        let report = BenchReport {
            backend: "reference".into(),
            device: "cpu".into(),
            sample_count: 1024,
            work_group_size: 128,
            iterations: 100,
            warmup_iterations: 0,
            timings: vec![
                timing(SampleEncoding::F32, KernelVariant::Naive, 300),
                timing(SampleEncoding::F32, KernelVariant::Local, 100),
                timing(SampleEncoding::Q15, KernelVariant::Naive, 200),
            ],
            total_secs: 0.6,
        };
        assert_eq!(report.fastest().unwrap().variant, KernelVariant::Local);
        assert_eq!(report.fastest_for(SampleEncoding::Q15).unwrap().kernel_name, "acorr_q15");
        assert!(report.fastest_for(SampleEncoding::F16).is_none());
        assert!(report.all_verified());
    }

    #[test]
    fn failed_verification_is_reported() {
        let mut t = timing(SampleEncoding::F32, KernelVariant::Vec4, 10);
        t.verification = Some(Verification { max_abs_error: 1.0, tolerance: 0.1, passed: false });
        assert!(!t.verified_ok());
    }
}
