//! What a benchmark pass runs.

use acorr_kernels::{KernelVariant, SampleEncoding, SignalSpec};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Launches per variant when nothing else is configured.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// One benchmark pass over a set of encodings and variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchPlan {
    pub signal: SignalSpec,
    /// Local size for the tiled variant.
    pub work_group_size: usize,
    /// Timed launches per variant.
    pub iterations: usize,
    /// Untimed launches per variant before the clock starts.
    pub warmup_iterations: usize,
    pub encodings: Vec<SampleEncoding>,
    pub variants: Vec<KernelVariant>,
    /// Compare every downloaded result with the CPU reference.
    pub verify: bool,
}

impl Default for BenchPlan {
    fn default() -> Self {
        Self {
            signal: SignalSpec::default(),
            work_group_size: acorr_kernels::DEFAULT_WORK_GROUP_SIZE,
            iterations: DEFAULT_ITERATIONS,
            warmup_iterations: 0,
            encodings: SampleEncoding::ALL.to_vec(),
            variants: KernelVariant::ALL.to_vec(),
            verify: false,
        }
    }
}

impl BenchPlan {
    /// Check the plan before any device work starts.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(HarnessError::InvalidPlan("iterations must be >= 1".into()));
        }
        if self.encodings.is_empty() {
            return Err(HarnessError::InvalidPlan("at least one encoding is required".into()));
        }
        if self.variants.is_empty() {
            return Err(HarnessError::InvalidPlan("at least one variant is required".into()));
        }
        if !self.signal.cycles.is_finite() {
            return Err(HarnessError::InvalidPlan("signal cycles must be finite".into()));
        }
        for &encoding in &self.encodings {
            for &variant in &self.variants {
                variant.geometry(self.signal.sample_count, self.work_group_size, encoding)?;
            }
        }
        Ok(())
    }

    /// Number of (encoding, variant) pairs the plan times.
    pub fn len(&self) -> usize {
        self.encodings.len() * self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acorr_kernels::KernelError;

    #[test]
    fn default_plan_is_valid() {
        let plan = BenchPlan::default();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.len(), 9);
        assert_eq!(plan.iterations, 10_000);
        assert_eq!(plan.work_group_size, 128);
        assert_eq!(plan.signal.sample_count, 1024);
    }

    #[test]
    fn zero_iterations_rejected() {
        let plan = BenchPlan { iterations: 0, ..BenchPlan::default() };
        assert!(matches!(plan.validate(), Err(HarnessError::InvalidPlan(_))));
    }

    #[test]
    fn empty_lists_rejected() {
        let plan = BenchPlan { encodings: vec![], ..BenchPlan::default() };
        assert!(plan.validate().is_err());
        let plan = BenchPlan { variants: vec![], ..BenchPlan::default() };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn zero_work_group_only_matters_for_local() {
        let plan = BenchPlan {
            work_group_size: 0,
            variants: vec![KernelVariant::Naive, KernelVariant::Vec4],
            ..BenchPlan::default()
        };
        assert!(plan.validate().is_ok());

        let plan = BenchPlan { work_group_size: 0, ..BenchPlan::default() };
        assert!(matches!(
            plan.validate(),
            Err(HarnessError::Kernel(KernelError::ZeroWorkGroup))
        ));
    }

    #[test]
    fn empty_signal_rejected() {
        let mut plan = BenchPlan::default();
        plan.signal.sample_count = 0;
        assert!(matches!(plan.validate(), Err(HarnessError::Kernel(KernelError::EmptySignal))));
    }

    #[test]
    fn long_q15_plans_and_huge_work_groups_rejected() {
        let mut plan = BenchPlan::default();
        plan.signal.sample_count = acorr_kernels::MAX_Q15_SAMPLES + 1;
        assert!(matches!(
            plan.validate(),
            Err(HarnessError::Kernel(KernelError::Q15SignalTooLong(_)))
        ));
        plan.encodings = vec![SampleEncoding::F32, SampleEncoding::F16];
        assert!(plan.validate().is_ok());

        let plan = BenchPlan { work_group_size: 1 << 62, ..BenchPlan::default() };
        assert!(matches!(
            plan.validate(),
            Err(HarnessError::Kernel(KernelError::WorkGroupTooLarge(_)))
        ));
    }
}
