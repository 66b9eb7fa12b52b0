//! Process exit codes and the mapping from errors to them.

use acorr_opencl::OpenClError;
use thiserror::Error;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
pub const EXIT_INVALID_DEVICE: i32 = 2;
pub const EXIT_OPENCL_FAIL: i32 = 3;
pub const EXIT_VERIFY_FAIL: i32 = 4;

/// Raised after a pass in which some outputs disagreed with the reference.
#[derive(Debug, Error)]
#[error("{failed} of {total} kernel results failed verification")]
pub struct VerificationFailed {
    pub failed: usize,
    pub total: usize,
}

/// The first OpenCL error anywhere in the chain.
pub fn opencl_cause(err: &anyhow::Error) -> Option<&OpenClError> {
    err.chain().find_map(|e| e.downcast_ref::<OpenClError>())
}

/// Exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.chain().any(|e| e.is::<VerificationFailed>()) {
        return EXIT_VERIFY_FAIL;
    }
    match opencl_cause(err) {
        Some(OpenClError::InvalidDeviceIndex { .. }) => EXIT_INVALID_DEVICE,
        Some(_) => EXIT_OPENCL_FAIL,
        None => EXIT_GENERIC_FAIL,
    }
}

/// One-line message printed to stderr on failure.
///
/// OpenCL status errors keep the historic `ERROR: <what> (<CL_NAME>)` shape.
pub fn error_line(err: &anyhow::Error) -> String {
    match opencl_cause(err) {
        Some(OpenClError::Cl { context, name, .. }) => format!("ERROR: {context} ({name})"),
        Some(other) => format!("ERROR: {other}"),
        None => format!("ERROR: {err:#}"),
    }
}
