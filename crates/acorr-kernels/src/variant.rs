//! Kernel variants, entry-point naming and ND-range geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::{MAX_Q15_SAMPLES, SampleEncoding};
use crate::error::{KernelError, Result};

/// Optimization strategy of an autocorrelation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelVariant {
    /// One work item per lag, reading global memory directly.
    Naive,
    /// Work groups stage tiles of the signal in local memory.
    Local,
    /// One work item per lag, 4-wide vector loads.
    #[serde(alias = "vectorized")]
    Vec4,
}

impl KernelVariant {
    /// All variants in benchmark order.
    pub const ALL: &[KernelVariant] = &[Self::Naive, Self::Local, Self::Vec4];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::Local => "local",
            Self::Vec4 => "vec4",
        }
    }

    /// Whether the kernel takes a `__local` tile argument.
    #[must_use]
    pub fn uses_local_memory(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Compute the launch geometry for `n` samples.
    ///
    /// `work_group_size` only matters for [`KernelVariant::Local`]; the other
    /// variants let the runtime pick the local size.
    pub fn geometry(
        self,
        n: usize,
        work_group_size: usize,
        encoding: SampleEncoding,
    ) -> Result<LaunchGeometry> {
        if n == 0 {
            return Err(KernelError::EmptySignal);
        }
        if n > i32::MAX as usize {
            return Err(KernelError::SignalTooLong(n));
        }
        if encoding == SampleEncoding::Q15 && n > MAX_Q15_SAMPLES {
            return Err(KernelError::Q15SignalTooLong(n));
        }
        match self {
            Self::Naive | Self::Vec4 => Ok(LaunchGeometry {
                global_work_size: n,
                local_work_size: None,
                local_mem_bytes: 0,
            }),
            Self::Local => {
                if work_group_size == 0 {
                    return Err(KernelError::ZeroWorkGroup);
                }
                let too_large = || KernelError::WorkGroupTooLarge(work_group_size);
                let global_work_size = n
                    .div_ceil(work_group_size)
                    .checked_mul(work_group_size)
                    .ok_or_else(too_large)?;
                let local_mem_bytes = work_group_size
                    .checked_mul(encoding.tile_elem_bytes())
                    .ok_or_else(too_large)?;
                Ok(LaunchGeometry {
                    global_work_size,
                    local_work_size: Some(work_group_size),
                    local_mem_bytes,
                })
            }
        }
    }
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KernelVariant {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" | "basic" => Ok(Self::Naive),
            "local" | "tiled" => Ok(Self::Local),
            "vec4" | "vectorized" => Ok(Self::Vec4),
            other => Err(KernelError::UnknownVariant(other.to_string())),
        }
    }
}

/// Entry point name of `variant` in the program built for `encoding`.
#[must_use]
pub fn kernel_name(variant: KernelVariant, encoding: SampleEncoding) -> &'static str {
    use KernelVariant::*;
    use SampleEncoding::*;
    match (variant, encoding) {
        (Naive, F32) => "acorr",
        (Local, F32) => "acorr_local",
        (Vec4, F32) => "acorr_vec4",
        (Naive, Q15) => "acorr_q15",
        (Local, Q15) => "acorr_local_q15",
        (Vec4, Q15) => "acorr_vec4_q15",
        (Naive, F16) => "acorr_f16",
        (Local, F16) => "acorr_local_f16",
        (Vec4, F16) => "acorr_vec4_f16",
    }
}

/// One-dimensional ND-range for a kernel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchGeometry {
    pub global_work_size: usize,
    /// `None` lets the runtime choose.
    pub local_work_size: Option<usize>,
    /// Size of the `__local` tile argument, 0 when the kernel has none.
    pub local_mem_bytes: usize,
}

impl LaunchGeometry {
    /// Number of work groups, when the local size is fixed.
    pub fn work_groups(&self) -> Option<usize> {
        self.local_work_size.map(|l| self.global_work_size / l)
    }

    /// Fraction of dispatched work items that map to a real lag.
    pub fn efficiency(&self, n: usize) -> f64 {
        if self.global_work_size == 0 {
            return 0.0;
        }
        n as f64 / self.global_work_size as f64
    }
}
