//! `acorr-harness`: the benchmark loop shared by every compute backend.
//!
//! A [`BenchPlan`] lists the encodings and kernel variants to time. For each
//! encoding the runner encodes the synthesized signal and hands it to the
//! [`AcorrBackend`]; for each variant it launches the kernel `iterations`
//! times, synchronizing after every launch, and records the wall-clock time
//! around the loop.
//!
//! [`ReferenceBackend`] runs the CPU reference so the loop can be exercised
//! without a GPU.

pub mod backend;
pub mod error;
pub mod plan;
pub mod report;
pub mod runner;

pub use backend::{AcorrBackend, ReferenceBackend};
pub use error::{HarnessError, Result};
pub use plan::BenchPlan;
pub use report::{BenchReport, VariantTiming};
pub use runner::{run_plan, run_plan_with};
