//! The timing loop.

use std::time::Instant;

use acorr_kernels::{EncodedSignal, reference_output, verify};
use tracing::{debug, info, warn};

use crate::backend::AcorrBackend;
use crate::error::{HarnessError, Result};
use crate::plan::BenchPlan;
use crate::report::{BenchReport, VariantTiming};

/// Run `plan` on `backend` and collect every timing.
pub fn run_plan<B: AcorrBackend>(backend: &mut B, plan: &BenchPlan) -> Result<BenchReport> {
    run_plan_with(backend, plan, |_| {})
}

/// Run `plan` on `backend`, calling `on_result` as each variant finishes.
pub fn run_plan_with<B, F>(
    backend: &mut B,
    plan: &BenchPlan,
    mut on_result: F,
) -> Result<BenchReport>
where
    B: AcorrBackend,
    F: FnMut(&VariantTiming),
{
    plan.validate()?;

    let n = plan.signal.sample_count;
    let max_wg = backend.max_work_group_size();
    let samples = plan.signal.synthesize();
    let pass_start = Instant::now();
    let mut timings = Vec::with_capacity(plan.len());

    info!(
        backend = backend.name(),
        device = backend.device_name(),
        samples = n,
        iterations = plan.iterations,
        "starting benchmark pass"
    );

    for &encoding in &plan.encodings {
        let signal = EncodedSignal::encode(&samples, encoding);
        backend
            .load(&signal)
            .map_err(|e| HarnessError::backend("load", encoding, None, e))?;
        let reference = plan.verify.then(|| reference_output(&signal));

        for &variant in &plan.variants {
            let geometry = variant.geometry(n, plan.work_group_size, encoding)?;
            if let Some(local) = geometry.local_work_size.filter(|&l| l > max_wg) {
                return Err(HarnessError::WorkGroupTooLarge { requested: local, max: max_wg });
            }
            debug!(%encoding, %variant, ?geometry, "launch geometry");
            backend
                .reset_output()
                .map_err(|e| HarnessError::backend("reset", encoding, Some(variant), e))?;

            for _ in 0..plan.warmup_iterations {
                backend
                    .launch(variant, &geometry)
                    .map_err(|e| HarnessError::backend("warmup", encoding, Some(variant), e))?;
            }

            let start = Instant::now();
            for _ in 0..plan.iterations {
                backend
                    .launch(variant, &geometry)
                    .map_err(|e| HarnessError::backend("launch", encoding, Some(variant), e))?;
            }
            let elapsed = start.elapsed();

            let output = backend
                .read_output()
                .map_err(|e| HarnessError::backend("read", encoding, Some(variant), e))?;

            let mut timing = VariantTiming::new(encoding, variant, plan.iterations, elapsed);
            if let Some(reference) = &reference {
                let v = verify(encoding, &output, reference);
                if !v.passed {
                    warn!(
                        kernel = %timing.kernel_name,
                        max_abs_error = v.max_abs_error,
                        tolerance = v.tolerance,
                        "output differs from CPU reference"
                    );
                }
                timing.verification = Some(v);
            }

            info!(
                kernel = %timing.kernel_name,
                elapsed_secs = timing.elapsed_secs,
                seconds_per_run = timing.seconds_per_run,
                "variant finished"
            );
            on_result(&timing);
            timings.push(timing);
        }
    }

    Ok(BenchReport {
        backend: backend.name().to_string(),
        device: backend.device_name().to_string(),
        sample_count: n,
        work_group_size: plan.work_group_size,
        iterations: plan.iterations,
        warmup_iterations: plan.warmup_iterations,
        timings,
        total_secs: pass_start.elapsed().as_secs_f64(),
    })
}
