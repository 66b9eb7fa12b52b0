//! CPU autocorrelation with the arithmetic of each device kernel.
//!
//! `r[k] = sum_{i=0}^{n-1-k} x[i] * x[i+k]` for every lag `k` in `0..n`.
//! Lag 0 is the signal energy and bounds every other lag.

use serde::{Deserialize, Serialize};

use crate::encoding::{
    AcorrOutput, EncodedSignal, F16Samples, Q15Samples, SampleEncoding, SampleFormat,
};

/// Relative tolerance for float encodings, scaled by the peak magnitude.
pub const FLOAT_RTOL: f64 = 1e-3;

/// Float autocorrelation, sequential f32 accumulation.
pub fn autocorrelate_f32(x: &[f32]) -> Vec<f32> {
    let n = x.len();
    (0..n)
        .map(|k| x[..n - k].iter().zip(&x[k..]).map(|(a, b)| a * b).sum::<f32>())
        .collect()
}

/// Q15 autocorrelation: exact i64 accumulation, then `>> 15` saturated to
/// `i32`. Signals up to [`crate::MAX_Q15_SAMPLES`] long never saturate.
pub fn autocorrelate_q15(x: &[i16]) -> Vec<i32> {
    let n = x.len();
    (0..n)
        .map(|k| {
            let acc: i64 = x[..n - k]
                .iter()
                .zip(&x[k..])
                .map(|(&a, &b)| i64::from(i32::from(a) * i32::from(b)))
                .sum();
            (acc >> 15).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        })
        .collect()
}

/// Half autocorrelation: samples widened to f32, f32 accumulation.
pub fn autocorrelate_f16(bits: &[u16]) -> Vec<f32> {
    let widened: Vec<f32> = bits.iter().map(|&b| F16Samples::decode_sample(b)).collect();
    autocorrelate_f32(&widened)
}

/// Reference output for an encoded signal.
pub fn reference_output(signal: &EncodedSignal) -> AcorrOutput {
    match signal {
        EncodedSignal::F32(x) => AcorrOutput::F32(autocorrelate_f32(x)),
        EncodedSignal::Q15(x) => AcorrOutput::Q15(autocorrelate_q15(x)),
        EncodedSignal::F16(x) => AcorrOutput::F32(autocorrelate_f16(x)),
    }
}

/// Outcome of comparing device output against the CPU reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    /// Largest per-lag absolute difference, in decoded units.
    pub max_abs_error: f64,
    /// Absolute tolerance the error was held to.
    pub tolerance: f64,
    pub passed: bool,
}

/// Compare `output` with `reference` under the tolerance of `encoding`.
///
/// Integer kernels must agree to one Q15 LSB; float kernels within
/// [`FLOAT_RTOL`] of the reference peak, since vectorized and tiled
/// kernels sum in a different order.
pub fn verify(
    encoding: SampleEncoding,
    output: &AcorrOutput,
    reference: &AcorrOutput,
) -> Verification {
    let got = output.to_f64();
    let want = reference.to_f64();
    let peak = want.iter().fold(1.0f64, |m, v| m.max(v.abs()));
    let tolerance = match encoding {
        SampleEncoding::Q15 => Q15Samples::decode_output(1),
        SampleEncoding::F32 | SampleEncoding::F16 => FLOAT_RTOL * peak,
    };

    if got.len() != want.len() {
        return Verification { max_abs_error: f64::INFINITY, tolerance, passed: false };
    }

    let max_abs_error = got
        .iter()
        .zip(&want)
        .map(|(g, w)| if g.is_nan() { f64::INFINITY } else { (g - w).abs() })
        .fold(0.0f64, f64::max);

    Verification { max_abs_error, tolerance, passed: max_abs_error <= tolerance }
}
