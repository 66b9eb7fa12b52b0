//! Numeric representations the kernels are benchmarked under.
//!
//! [`SampleEncoding`] is the runtime tag; [`SampleFormat`] pins the device
//! types for each tag at compile time so buffers cannot be mixed up.

use half::f16;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KernelError;

/// Scale of the Q15 fixed-point format (15 fractional bits).
pub const Q15_SCALE: f64 = 32768.0;

/// Longest Q15 signal whose lag-0 sum still fits the `int` output.
pub const MAX_Q15_SAMPLES: usize = 65_535;

/// Q15 value written to the output before each variant runs.
pub const Q15_OUTPUT_SENTINEL: i32 = i32::MIN;

// ── SampleEncoding ──────────────────────────────────────────────────

/// Data representation of the sample buffer on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 32-bit IEEE float samples and results.
    #[serde(alias = "float")]
    F32,
    /// 16-bit signed fixed-point samples with 15 fractional bits.
    #[serde(alias = "fixed16", alias = "short")]
    Q15,
    /// 16-bit IEEE half samples, accumulated in f32.
    #[serde(alias = "half")]
    F16,
}

impl SampleEncoding {
    /// All encodings in benchmark order.
    pub const ALL: &[SampleEncoding] = &[Self::F32, Self::Q15, Self::F16];

    /// Size of one device sample in bytes.
    #[must_use]
    pub fn sample_bytes(self) -> usize {
        match self {
            Self::F32 => std::mem::size_of::<f32>(),
            Self::Q15 => std::mem::size_of::<i16>(),
            Self::F16 => std::mem::size_of::<u16>(),
        }
    }

    /// Size of one element of the local-memory tile used by the tiled variant.
    ///
    /// Halves are widened to `float` when staged in local memory.
    #[must_use]
    pub fn tile_elem_bytes(self) -> usize {
        match self {
            Self::F32 | Self::F16 => std::mem::size_of::<f32>(),
            Self::Q15 => std::mem::size_of::<i16>(),
        }
    }

    /// Size of one device output element in bytes.
    #[must_use]
    pub fn output_bytes(self) -> usize {
        match self {
            Self::F32 | Self::F16 => std::mem::size_of::<f32>(),
            Self::Q15 => std::mem::size_of::<i32>(),
        }
    }

    /// Short name used in kernel entry points and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::Q15 => "q15",
            Self::F16 => "f16",
        }
    }
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SampleEncoding {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f32" | "float" => Ok(Self::F32),
            "q15" | "fixed16" | "short" => Ok(Self::Q15),
            "f16" | "half" => Ok(Self::F16),
            other => Err(KernelError::UnknownEncoding(other.to_string())),
        }
    }
}

// ── SampleFormat ────────────────────────────────────────────────────

/// Compile-time description of one encoding's device types.
pub trait SampleFormat {
    /// Element type of the input buffer.
    type Sample: Copy + Default + Send + Sync + 'static;
    /// Element type of the output buffer.
    type Output: Copy + Default + Send + Sync + 'static;

    const ENCODING: SampleEncoding;

    /// Convert a real-valued sample into the device representation.
    fn encode(x: f32) -> Self::Sample;

    /// Convert one device output element back to real units.
    fn decode_output(y: Self::Output) -> f64;

    fn encode_all(samples: &[f32]) -> Vec<Self::Sample> {
        samples.iter().map(|&x| Self::encode(x)).collect()
    }
}

/// Marker for 32-bit float buffers.
#[derive(Debug, Clone, Copy)]
pub struct F32Samples;

/// Marker for Q15 fixed-point buffers.
#[derive(Debug, Clone, Copy)]
pub struct Q15Samples;

/// Marker for half-precision buffers.
#[derive(Debug, Clone, Copy)]
pub struct F16Samples;

impl SampleFormat for F32Samples {
    type Sample = f32;
    type Output = f32;
    const ENCODING: SampleEncoding = SampleEncoding::F32;

    fn encode(x: f32) -> f32 {
        x
    }

    fn decode_output(y: f32) -> f64 {
        f64::from(y)
    }
}

impl SampleFormat for Q15Samples {
    type Sample = i16;
    type Output = i32;
    const ENCODING: SampleEncoding = SampleEncoding::Q15;

    fn encode(x: f32) -> i16 {
        let scaled = (f64::from(x).clamp(-1.0, 1.0) * Q15_SCALE).round();
        scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
    }

    fn decode_output(y: i32) -> f64 {
        f64::from(y) / Q15_SCALE
    }
}

impl Q15Samples {
    /// Real value of one Q15 sample.
    pub fn decode_sample(s: i16) -> f64 {
        f64::from(s) / Q15_SCALE
    }
}

impl SampleFormat for F16Samples {
    /// Raw binary16 bits; the device reads them with `vload_half`.
    type Sample = u16;
    type Output = f32;
    const ENCODING: SampleEncoding = SampleEncoding::F16;

    fn encode(x: f32) -> u16 {
        f16::from_f32(x).to_bits()
    }

    fn decode_output(y: f32) -> f64 {
        f64::from(y)
    }
}

impl F16Samples {
    /// Widen one stored half to f32, as `vload_half` does on the device.
    pub fn decode_sample(bits: u16) -> f32 {
        f16::from_bits(bits).to_f32()
    }
}

// ── Typed payloads ──────────────────────────────────────────────────

/// Signal samples in one device representation.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedSignal {
    F32(Vec<f32>),
    Q15(Vec<i16>),
    F16(Vec<u16>),
}

impl EncodedSignal {
    /// Encode real-valued samples into `encoding`.
    pub fn encode(samples: &[f32], encoding: SampleEncoding) -> Self {
        match encoding {
            SampleEncoding::F32 => Self::F32(F32Samples::encode_all(samples)),
            SampleEncoding::Q15 => Self::Q15(Q15Samples::encode_all(samples)),
            SampleEncoding::F16 => Self::F16(F16Samples::encode_all(samples)),
        }
    }

    pub fn encoding(&self) -> SampleEncoding {
        match self {
            Self::F32(_) => SampleEncoding::F32,
            Self::Q15(_) => SampleEncoding::Q15,
            Self::F16(_) => SampleEncoding::F16,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::Q15(v) => v.len(),
            Self::F16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes occupied by the input buffer on the device.
    pub fn byte_len(&self) -> usize {
        self.len() * self.encoding().sample_bytes()
    }
}

/// Autocorrelation results as downloaded from the device.
#[derive(Debug, Clone, PartialEq)]
pub enum AcorrOutput {
    /// Float results (`f32` and `f16` encodings).
    F32(Vec<f32>),
    /// Q15-scaled integer results (`q15` encoding).
    Q15(Vec<i32>),
}

impl AcorrOutput {
    /// Zero-filled output of the shape `encoding` produces.
    pub fn zeroed(encoding: SampleEncoding, len: usize) -> Self {
        match encoding {
            SampleEncoding::F32 | SampleEncoding::F16 => Self::F32(vec![0.0; len]),
            SampleEncoding::Q15 => Self::Q15(vec![0; len]),
        }
    }

    /// Output no kernel can produce (NaN, or [`Q15_OUTPUT_SENTINEL`]), so a
    /// launch that writes nothing fails verification.
    pub fn poisoned(encoding: SampleEncoding, len: usize) -> Self {
        match encoding {
            SampleEncoding::F32 | SampleEncoding::F16 => Self::F32(vec![f32::NAN; len]),
            SampleEncoding::Q15 => Self::Q15(vec![Q15_OUTPUT_SENTINEL; len]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::Q15(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode every lag to real units.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::F32(v) => v.iter().map(|&y| F32Samples::decode_output(y)).collect(),
            Self::Q15(v) => v.iter().map(|&y| Q15Samples::decode_output(y)).collect(),
        }
    }
}
