//! Device enumeration and selection.
//!
//! Devices are numbered across all platforms in enumeration order, so the
//! same index picks the same device from one run to the next.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{OpenClError, Result};

// OpenCL `cl_device_type` bits.
const TYPE_CPU: u64 = 1 << 1;
const TYPE_GPU: u64 = 1 << 2;
const TYPE_ACCELERATOR: u64 = 1 << 3;
const TYPE_CUSTOM: u64 = 1 << 4;
const TYPE_ALL: u64 = 0xFFFF_FFFF;

/// Which devices to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    All,
    Gpu,
    Cpu,
    Accelerator,
}

impl DeviceKind {
    /// `cl_device_type` mask for this filter.
    pub fn cl_bits(self) -> u64 {
        match self {
            Self::All => TYPE_ALL,
            Self::Gpu => TYPE_GPU,
            Self::Cpu => TYPE_CPU,
            Self::Accelerator => TYPE_ACCELERATOR,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Gpu => write!(f, "gpu"),
            Self::Cpu => write!(f, "cpu"),
            Self::Accelerator => write!(f, "accelerator"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "gpu" => Ok(Self::Gpu),
            "cpu" => Ok(Self::Cpu),
            "accelerator" | "acc" => Ok(Self::Accelerator),
            other => Err(format!(
                "unknown device type '{other}'. Expected one of: all, gpu, cpu, accelerator"
            )),
        }
    }
}

/// Hardware class reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Gpu,
    Cpu,
    Accelerator,
    Custom,
    Unknown,
}

impl DeviceClass {
    /// Classify a `cl_device_type` value.
    pub fn from_cl_bits(bits: u64) -> Self {
        if bits & TYPE_GPU != 0 {
            Self::Gpu
        } else if bits & TYPE_CPU != 0 {
            Self::Cpu
        } else if bits & TYPE_ACCELERATOR != 0 {
            Self::Accelerator
        } else if bits & TYPE_CUSTOM != 0 {
            Self::Custom
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu => write!(f, "GPU"),
            Self::Cpu => write!(f, "CPU"),
            Self::Accelerator => write!(f, "Accelerator"),
            Self::Custom => write!(f, "Custom"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Description of one enumerated device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Position in the enumeration, as accepted by `--device`.
    pub index: usize,
    pub name: String,
    pub vendor: String,
    pub platform: String,
    pub class: DeviceClass,
    /// OpenCL version string reported by the device.
    pub version: String,
    pub max_work_group_size: usize,
    pub local_mem_bytes: u64,
    pub compute_units: u32,
}

/// Pick the device at `index`.
pub fn select_device(devices: &[DeviceInfo], index: usize) -> Result<&DeviceInfo> {
    devices
        .get(index)
        .ok_or(OpenClError::InvalidDeviceIndex { index, available: devices.len() })
}

/// Enumerate every device of `kind` on every platform.
#[cfg(feature = "opencl")]
pub fn enumerate_devices(kind: DeviceKind) -> Result<Vec<DeviceInfo>> {
    Ok(discover(kind)?.into_iter().map(|(info, _)| info).collect())
}

/// Enumerate every device of `kind` on every platform.
#[cfg(not(feature = "opencl"))]
pub fn enumerate_devices(kind: DeviceKind) -> Result<Vec<DeviceInfo>> {
    let _ = kind;
    Err(OpenClError::RuntimeUnavailable)
}

/// Enumerate devices together with their runtime handles.
#[cfg(feature = "opencl")]
pub(crate) fn discover(
    kind: DeviceKind,
) -> Result<Vec<(DeviceInfo, opencl3::types::cl_device_id)>> {
    use opencl3::device::Device;
    use opencl3::platform::get_platforms;
    use tracing::debug;

    let platforms = get_platforms().map_err(|e| OpenClError::cl(e.0, "clGetPlatformIDs"))?;
    if platforms.is_empty() {
        return Err(OpenClError::NoPlatforms);
    }

    let mut found = Vec::new();
    for platform in platforms {
        let platform_name = platform.name().unwrap_or_default();
        debug!("Scanning OpenCL platform: {}", platform_name);

        // CL_DEVICE_NOT_FOUND for an empty platform is not an error here.
        let device_ids = platform.get_devices(kind.cl_bits()).unwrap_or_default();
        for device_id in device_ids {
            let device = Device::new(device_id);
            let info = DeviceInfo {
                index: found.len(),
                name: device.name().unwrap_or_default(),
                vendor: device.vendor().unwrap_or_default(),
                platform: platform_name.clone(),
                class: DeviceClass::from_cl_bits(device.dev_type().unwrap_or_default()),
                version: device.version().unwrap_or_default(),
                max_work_group_size: device.max_work_group_size().unwrap_or(1),
                local_mem_bytes: device.local_mem_size().unwrap_or_default(),
                compute_units: device.max_compute_units().unwrap_or_default(),
            };
            debug!(index = info.index, name = %info.name, vendor = %info.vendor, "found device");
            found.push((info, device_id));
        }
    }

    if found.is_empty() {
        return Err(OpenClError::NoDevices(kind));
    }
    Ok(found)
}
