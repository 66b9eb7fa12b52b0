//! OpenCL backend for the autocorrelation benchmark.
//!
//! Provides:
//! - [`device`]: platform/device enumeration and index-based selection
//! - [`error`]: structured errors carrying symbolic OpenCL status names
//! - [`OpenClBackend`]: an [`acorr_harness::AcorrBackend`] on one context and
//!   one command queue
//!
//! The runtime is only linked with the `opencl` feature. Without it,
//! enumeration and backend construction return
//! [`OpenClError::RuntimeUnavailable`].

pub mod device;
pub mod error;

#[cfg(feature = "opencl")]
mod buffer;
#[cfg(feature = "opencl")]
mod runtime;
#[cfg(not(feature = "opencl"))]
mod stub;

pub use device::{DeviceClass, DeviceInfo, DeviceKind, enumerate_devices, select_device};
pub use error::{OpenClError, Result, cl_error_name};
#[cfg(feature = "opencl")]
pub use runtime::OpenClBackend;
#[cfg(not(feature = "opencl"))]
pub use stub::OpenClBackend;

/// Whether this build links the OpenCL runtime.
pub const fn runtime_compiled() -> bool {
    cfg!(feature = "opencl")
}
