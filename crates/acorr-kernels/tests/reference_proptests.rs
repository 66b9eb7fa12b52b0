//! Property tests for sample encodings and the CPU reference.

use acorr_kernels::encoding::{F16Samples, Q15Samples, SampleFormat};
use acorr_kernels::reference::{autocorrelate_f16, autocorrelate_f32, autocorrelate_q15};
use acorr_kernels::{EncodedSignal, SampleEncoding, reference_output, verify};
use proptest::prelude::*;

fn signal() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0f32..=1.0, 1..96)
}

proptest! {
    #[test]
    fn q15_encoding_is_within_half_lsb(x in -1.0f32..=1.0) {
        let q = Q15Samples::encode(x);
        let back = Q15Samples::decode_sample(q);
        // 1.0 saturates to 32767, one full LSB below.
        let bound = if x > 0.99996 { 1.0 / 32768.0 } else { 0.5 / 32768.0 + 1e-9 };
        prop_assert!((back - f64::from(x)).abs() <= bound, "{x} -> {q} -> {back}");
    }

    #[test]
    fn f16_encoding_is_close(x in -1.0f32..=1.0) {
        let back = F16Samples::decode_sample(F16Samples::encode(x));
        prop_assert!((back - x).abs() <= 1e-3);
    }

    #[test]
    fn lag_zero_bounds_every_lag_f32(x in signal()) {
        let r = autocorrelate_f32(&x);
        prop_assert_eq!(r.len(), x.len());
        let tol = 1e-4 * (1.0 + r[0]);
        for &v in &r {
            prop_assert!(v.abs() <= r[0] + tol);
        }
    }

    #[test]
    fn lag_zero_bounds_every_lag_q15(x in signal()) {
        let r = autocorrelate_q15(&Q15Samples::encode_all(&x));
        for &v in &r {
            // Truncating shift can move a lag by one LSB.
            prop_assert!(v.abs() <= r[0] + 1);
        }
    }

    #[test]
    fn f16_reference_tracks_f32(x in signal()) {
        let full = autocorrelate_f32(&x);
        let halves = autocorrelate_f16(&F16Samples::encode_all(&x));
        let peak = full[0].max(1.0);
        for (a, b) in full.iter().zip(&halves) {
            prop_assert!((a - b).abs() <= 2e-3 * peak * x.len() as f32);
        }
    }

    #[test]
    fn reference_always_verifies_against_itself(x in signal()) {
        for &e in SampleEncoding::ALL {
            let r = reference_output(&EncodedSignal::encode(&x, e));
            prop_assert!(verify(e, &r, &r).passed);
        }
    }
}
