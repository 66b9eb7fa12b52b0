//! Harness error types.

use acorr_kernels::{KernelError, KernelVariant, SampleEncoding};
use thiserror::Error;

/// Errors produced while planning or running a benchmark.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("work group size {requested} exceeds device limit {max}")]
    WorkGroupTooLarge { requested: usize, max: usize },

    #[error("{stage} failed for {target}: {source}")]
    Backend {
        stage: &'static str,
        /// `encoding` or `encoding/variant` the stage was working on.
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl HarnessError {
    pub(crate) fn backend<E>(
        stage: &'static str,
        encoding: SampleEncoding,
        variant: Option<KernelVariant>,
        source: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let target = match variant {
            Some(v) => format!("{encoding}/{v}"),
            None => encoding.to_string(),
        };
        Self::Backend { stage, target, source: Box::new(source) }
    }

    /// The backend error behind this failure, if any.
    pub fn backend_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Backend { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, HarnessError>;
