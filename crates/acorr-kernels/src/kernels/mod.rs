//! Embedded OpenCL C sources for the autocorrelation kernels.
//!
//! Every encoding has its own program file defining the three variants
//! (see [`crate::variant::kernel_name`]). Sources are embedded at compile
//! time and can be swapped for files on disk with
//! [`KernelSourceSet::from_dir`].

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::encoding::SampleEncoding;
use crate::error::{KernelError, Result};
use crate::variant::{KernelVariant, kernel_name};

/// Static kernel source strings, embedded at compile time.
pub const ACORR_F32_SRC: &str = include_str!("acorr_f32.cl");
pub const ACORR_Q15_SRC: &str = include_str!("acorr_q15.cl");
pub const ACORR_F16_SRC: &str = include_str!("acorr_f16.cl");

/// File name of the program for `encoding`.
#[must_use]
pub fn source_file_name(encoding: SampleEncoding) -> &'static str {
    match encoding {
        SampleEncoding::F32 => "acorr_f32.cl",
        SampleEncoding::Q15 => "acorr_q15.cl",
        SampleEncoding::F16 => "acorr_f16.cl",
    }
}

/// Embedded program source for `encoding`.
#[must_use]
pub fn kernel_source(encoding: SampleEncoding) -> &'static str {
    match encoding {
        SampleEncoding::F32 => ACORR_F32_SRC,
        SampleEncoding::Q15 => ACORR_Q15_SRC,
        SampleEncoding::F16 => ACORR_F16_SRC,
    }
}

/// Entry points every program for `encoding` must define.
pub fn entry_points(encoding: SampleEncoding) -> impl Iterator<Item = &'static str> {
    KernelVariant::ALL.iter().map(move |&v| kernel_name(v, encoding))
}

/// Program sources for all three encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSourceSet {
    f32: Cow<'static, str>,
    q15: Cow<'static, str>,
    f16: Cow<'static, str>,
}

impl Default for KernelSourceSet {
    fn default() -> Self {
        Self::embedded()
    }
}

impl KernelSourceSet {
    /// Sources compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            f32: Cow::Borrowed(ACORR_F32_SRC),
            q15: Cow::Borrowed(ACORR_Q15_SRC),
            f16: Cow::Borrowed(ACORR_F16_SRC),
        }
    }

    /// Load `acorr_f32.cl`, `acorr_q15.cl` and `acorr_f16.cl` from `dir`.
    ///
    /// Each file must mention all of its entry points; anything else is left
    /// to the OpenCL compiler.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let load = |encoding: SampleEncoding| -> Result<Cow<'static, str>> {
            let path = dir.join(source_file_name(encoding));
            let text = std::fs::read_to_string(&path)
                .map_err(|source| KernelError::SourceIo { path: path.clone(), source })?;
            if let Some(missing) = entry_points(encoding).find(|name| !defines_kernel(&text, name))
            {
                return Err(KernelError::MissingEntryPoint {
                    path,
                    entry_point: missing.to_string(),
                });
            }
            debug!(path = %path.display(), bytes = text.len(), "loaded kernel source");
            Ok(Cow::Owned(text))
        };

        Ok(Self {
            f32: load(SampleEncoding::F32)?,
            q15: load(SampleEncoding::Q15)?,
            f16: load(SampleEncoding::F16)?,
        })
    }

    /// Program text for `encoding`.
    #[must_use]
    pub fn source(&self, encoding: SampleEncoding) -> &str {
        match encoding {
            SampleEncoding::F32 => self.f32.as_ref(),
            SampleEncoding::Q15 => self.q15.as_ref(),
            SampleEncoding::F16 => self.f16.as_ref(),
        }
    }

    /// Whether every source is the embedded one.
    pub fn is_embedded(&self) -> bool {
        SampleEncoding::ALL.iter().all(|&e| self.source(e) == kernel_source(e))
    }
}

/// Whether `source` declares a kernel function called `name`.
fn defines_kernel(source: &str, name: &str) -> bool {
    source.match_indices(name).any(|(pos, _)| {
        let before = source[..pos].trim_end();
        let after = source[pos + name.len()..].trim_start();
        before.ends_with("void") && after.starts_with('(')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_sources_define_their_entry_points() {
        for &e in SampleEncoding::ALL {
            for name in entry_points(e) {
                assert!(defines_kernel(kernel_source(e), name), "{e}: missing {name}");
            }
        }
    }

    #[test]
    fn prefix_names_do_not_match() {
        // "acorr" is a prefix of "acorr_local"; only the exact declaration counts.
        let src = "__kernel void acorr_local(const int n) {}";
        assert!(!defines_kernel(src, "acorr"));
        assert!(defines_kernel(src, "acorr_local"));
    }

    #[test]
    fn default_set_is_embedded() {
        assert!(KernelSourceSet::default().is_embedded());
    }
}
