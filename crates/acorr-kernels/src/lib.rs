//! `acorr-kernels`: autocorrelation kernels and their host-side contracts.
//!
//! The crate embeds the OpenCL C sources for every kernel variant and
//! describes how the host has to feed them:
//!
//! | Encoding | Device sample | Device output      | Kernel file     |
//! |----------|---------------|--------------------|-----------------|
//! | `f32`    | `float`       | `float`            | `acorr_f32.cl`  |
//! | `q15`    | `short`       | `int` (Q15 scaled) | `acorr_q15.cl`  |
//! | `f16`    | `half` bits   | `float`            | `acorr_f16.cl`  |
//!
//! Each file provides a naive, a local-memory tiled and a 4-wide vectorized
//! entry point. [`reference`] computes the same result on the CPU with the
//! arithmetic of the matching kernel so device output can be checked.
//!
//! # Usage
//!
//! ```rust
//! use acorr_kernels::{KernelVariant, SampleEncoding, kernel_name, signal};
//!
//! let x = signal::synthesize(1024, signal::DEFAULT_CYCLES);
//! assert_eq!(x.len(), 1024);
//! assert_eq!(kernel_name(KernelVariant::Local, SampleEncoding::F32), "acorr_local");
//! ```

pub mod encoding;
pub mod error;
pub mod kernels;
pub mod reference;
pub mod signal;
pub mod variant;

pub use encoding::{
    AcorrOutput, EncodedSignal, F16Samples, F32Samples, MAX_Q15_SAMPLES, Q15_OUTPUT_SENTINEL,
    Q15Samples, SampleEncoding, SampleFormat,
};
pub use error::{KernelError, Result};
pub use kernels::{KernelSourceSet, kernel_source};
pub use reference::{Verification, reference_output, verify};
pub use signal::SignalSpec;
pub use variant::{KernelVariant, LaunchGeometry, kernel_name};

/// Number of samples benchmarked when nothing else is configured.
pub const DEFAULT_SAMPLE_COUNT: usize = 1024;

/// Local work-group size used by the tiled variant by default.
pub const DEFAULT_WORK_GROUP_SIZE: usize = 128;
