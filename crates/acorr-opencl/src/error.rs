//! OpenCL error types.

use acorr_kernels::SampleEncoding;
use thiserror::Error;

use crate::device::DeviceKind;

/// Errors produced by the OpenCL backend.
#[derive(Debug, Error)]
pub enum OpenClError {
    #[error("OpenCL support not compiled in (rebuild with `--features opencl`)")]
    RuntimeUnavailable,

    #[error("no OpenCL platforms found")]
    NoPlatforms,

    #[error("no OpenCL devices of type {0}")]
    NoDevices(DeviceKind),

    #[error("Invalid device index {index} ({available} devices available)")]
    InvalidDeviceIndex { index: usize, available: usize },

    #[error("{context}: {name} ({code})")]
    Cl { code: i32, name: &'static str, context: String },

    #[error("program build failed for {encoding} kernels:\n{log}")]
    Build { encoding: SampleEncoding, log: String },

    #[error("cannot write {len} elements into a device buffer of {capacity}")]
    TransferTooLarge { len: usize, capacity: usize },

    #[error("no signal loaded")]
    NotLoaded,

    #[error("kernel {0} is not available in the loaded program")]
    MissingKernel(&'static str),
}

impl OpenClError {
    /// Wrap a raw OpenCL status code.
    pub fn cl(code: i32, context: impl Into<String>) -> Self {
        Self::Cl { code, name: cl_error_name(code), context: context.into() }
    }

    /// Raw OpenCL status code, when the error came from the runtime.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Cl { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, OpenClError>;

/// Symbolic name of an OpenCL status code.
pub fn cl_error_name(code: i32) -> &'static str {
    match code {
        0 => "CL_SUCCESS",
        -1 => "CL_DEVICE_NOT_FOUND",
        -2 => "CL_DEVICE_NOT_AVAILABLE",
        -3 => "CL_COMPILER_NOT_AVAILABLE",
        -4 => "CL_MEM_OBJECT_ALLOCATION_FAILURE",
        -5 => "CL_OUT_OF_RESOURCES",
        -6 => "CL_OUT_OF_HOST_MEMORY",
        -7 => "CL_PROFILING_INFO_NOT_AVAILABLE",
        -8 => "CL_MEM_COPY_OVERLAP",
        -9 => "CL_IMAGE_FORMAT_MISMATCH",
        -10 => "CL_IMAGE_FORMAT_NOT_SUPPORTED",
        -11 => "CL_BUILD_PROGRAM_FAILURE",
        -12 => "CL_MAP_FAILURE",
        -13 => "CL_MISALIGNED_SUB_BUFFER_OFFSET",
        -14 => "CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST",
        -15 => "CL_COMPILE_PROGRAM_FAILURE",
        -16 => "CL_LINKER_NOT_AVAILABLE",
        -17 => "CL_LINK_PROGRAM_FAILURE",
        -18 => "CL_DEVICE_PARTITION_FAILED",
        -19 => "CL_KERNEL_ARG_INFO_NOT_AVAILABLE",
        -30 => "CL_INVALID_VALUE",
        -31 => "CL_INVALID_DEVICE_TYPE",
        -32 => "CL_INVALID_PLATFORM",
        -33 => "CL_INVALID_DEVICE",
        -34 => "CL_INVALID_CONTEXT",
        -35 => "CL_INVALID_QUEUE_PROPERTIES",
        -36 => "CL_INVALID_COMMAND_QUEUE",
        -37 => "CL_INVALID_HOST_PTR",
        -38 => "CL_INVALID_MEM_OBJECT",
        -39 => "CL_INVALID_IMAGE_FORMAT_DESCRIPTOR",
        -40 => "CL_INVALID_IMAGE_SIZE",
        -41 => "CL_INVALID_SAMPLER",
        -42 => "CL_INVALID_BINARY",
        -43 => "CL_INVALID_BUILD_OPTIONS",
        -44 => "CL_INVALID_PROGRAM",
        -45 => "CL_INVALID_PROGRAM_EXECUTABLE",
        -46 => "CL_INVALID_KERNEL_NAME",
        -47 => "CL_INVALID_KERNEL_DEFINITION",
        -48 => "CL_INVALID_KERNEL",
        -49 => "CL_INVALID_ARG_INDEX",
        -50 => "CL_INVALID_ARG_VALUE",
        -51 => "CL_INVALID_ARG_SIZE",
        -52 => "CL_INVALID_KERNEL_ARGS",
        -53 => "CL_INVALID_WORK_DIMENSION",
        -54 => "CL_INVALID_WORK_GROUP_SIZE",
        -55 => "CL_INVALID_WORK_ITEM_SIZE",
        -56 => "CL_INVALID_GLOBAL_OFFSET",
        -57 => "CL_INVALID_EVENT_WAIT_LIST",
        -58 => "CL_INVALID_EVENT",
        -59 => "CL_INVALID_OPERATION",
        -60 => "CL_INVALID_GL_OBJECT",
        -61 => "CL_INVALID_BUFFER_SIZE",
        -62 => "CL_INVALID_MIP_LEVEL",
        -63 => "CL_INVALID_GLOBAL_WORK_SIZE",
        -64 => "CL_INVALID_PROPERTY",
        -65 => "CL_INVALID_IMAGE_DESCRIPTOR",
        -66 => "CL_INVALID_COMPILER_OPTIONS",
        -67 => "CL_INVALID_LINKER_OPTIONS",
        -68 => "CL_INVALID_DEVICE_PARTITION_COUNT",
        -69 => "CL_INVALID_PIPE_SIZE",
        -70 => "CL_INVALID_DEVICE_QUEUE",
        -71 => "CL_INVALID_SPEC_ID",
        -72 => "CL_MAX_SIZE_RESTRICTION_EXCEEDED",
        -1000 => "CL_INVALID_GL_SHAREGROUP_REFERENCE_KHR",
        -1001 => "CL_PLATFORM_NOT_FOUND_KHR",
        -1002 => "CL_INVALID_D3D10_DEVICE_KHR",
        -1003 => "CL_INVALID_D3D10_RESOURCE_KHR",
        -1004 => "CL_D3D10_RESOURCE_ALREADY_ACQUIRED_KHR",
        -1005 => "CL_D3D10_RESOURCE_NOT_ACQUIRED_KHR",
        _ => "UNKNOWN_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_codes_have_names() {
        assert_eq!(cl_error_name(0), "CL_SUCCESS");
        assert_eq!(cl_error_name(-5), "CL_OUT_OF_RESOURCES");
        assert_eq!(cl_error_name(-11), "CL_BUILD_PROGRAM_FAILURE");
        assert_eq!(cl_error_name(-54), "CL_INVALID_WORK_GROUP_SIZE");
        assert_eq!(cl_error_name(-1001), "CL_PLATFORM_NOT_FOUND_KHR");
    }

    #[test]
    fn gaps_and_positive_codes_are_unknown() {
        assert_eq!(cl_error_name(-25), "UNKNOWN_ERROR");
        assert_eq!(cl_error_name(7), "UNKNOWN_ERROR");
    }

    #[test]
    fn cl_error_message_includes_name_and_code() {
        let err = OpenClError::cl(-54, "enqueue acorr_local");
        assert_eq!(err.to_string(), "enqueue acorr_local: CL_INVALID_WORK_GROUP_SIZE (-54)");
        assert_eq!(err.code(), Some(-54));
        assert_eq!(OpenClError::NotLoaded.code(), None);
    }

    #[test]
    fn oversized_transfer_is_not_a_runtime_status() {
        let err = OpenClError::TransferTooLarge { len: 2048, capacity: 1024 };
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "cannot write 2048 elements into a device buffer of 1024");
    }

    #[test]
    fn invalid_index_keeps_historic_wording() {
        let err = OpenClError::InvalidDeviceIndex { index: 3, available: 1 };
        assert!(err.to_string().starts_with("Invalid device index"));
    }
}
