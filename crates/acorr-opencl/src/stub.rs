//! Placeholder backend for builds without the `opencl` feature.

use acorr_harness::AcorrBackend;
use acorr_kernels::{AcorrOutput, EncodedSignal, KernelSourceSet, KernelVariant, LaunchGeometry};

use crate::device::{DeviceInfo, DeviceKind};
use crate::error::{OpenClError, Result};

/// OpenCL backend; construction always fails in this build.
#[derive(Debug)]
pub struct OpenClBackend {
    info: DeviceInfo,
}

impl OpenClBackend {
    pub fn new(_index: usize, _kind: DeviceKind, _sources: KernelSourceSet) -> Result<Self> {
        Err(OpenClError::RuntimeUnavailable)
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.info
    }
}

impl AcorrBackend for OpenClBackend {
    type Error = OpenClError;

    fn name(&self) -> &'static str {
        "opencl"
    }

    fn device_name(&self) -> &str {
        &self.info.name
    }

    fn max_work_group_size(&self) -> usize {
        self.info.max_work_group_size
    }

    fn load(&mut self, _signal: &EncodedSignal) -> Result<()> {
        Err(OpenClError::RuntimeUnavailable)
    }

    fn reset_output(&mut self) -> Result<()> {
        Err(OpenClError::RuntimeUnavailable)
    }

    fn launch(&mut self, _variant: KernelVariant, _geometry: &LaunchGeometry) -> Result<()> {
        Err(OpenClError::RuntimeUnavailable)
    }

    fn read_output(&mut self) -> Result<AcorrOutput> {
        Err(OpenClError::RuntimeUnavailable)
    }
}
