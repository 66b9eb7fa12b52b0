//! Error types for kernel geometry, encodings and source loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while preparing kernels or their inputs.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("sample count must be > 0")]
    EmptySignal,

    #[error("sample count {0} exceeds the kernel limit of {max}", max = i32::MAX)]
    SignalTooLong(usize),

    #[error(
        "sample count {0} is too long for q15 output (max {max})",
        max = crate::MAX_Q15_SAMPLES
    )]
    Q15SignalTooLong(usize),

    #[error("work group size must be > 0")]
    ZeroWorkGroup,

    #[error("work group size {0} overflows the launch geometry")]
    WorkGroupTooLarge(usize),

    #[error("unknown sample encoding '{0}'. Expected one of: f32, q15, f16")]
    UnknownEncoding(String),

    #[error("unknown kernel variant '{0}'. Expected one of: naive, local, vec4")]
    UnknownVariant(String),

    #[error("failed to read kernel source {path}: {source}")]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("kernel source {path} does not define entry point '{entry_point}'")]
    MissingEntryPoint { path: PathBuf, entry_point: String },
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, KernelError>;
