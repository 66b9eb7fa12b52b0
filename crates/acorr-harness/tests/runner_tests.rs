//! Timing-loop tests driven through the CPU reference and a scripted backend.

use acorr_harness::{
    AcorrBackend, BenchPlan, HarnessError, ReferenceBackend, run_plan, run_plan_with,
};
use acorr_kernels::{
    AcorrOutput, EncodedSignal, KernelVariant, LaunchGeometry, SampleEncoding, SignalSpec,
};

// ── helpers ────────────────────────────────────────────────────────

fn small_plan() -> BenchPlan {
    BenchPlan {
        signal: SignalSpec { sample_count: 64, cycles: 3.5 },
        work_group_size: 16,
        iterations: 3,
        ..BenchPlan::default()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("scripted failure at {0}")]
struct ScriptedError(&'static str);

/// Records every call and can be told to fail, skip writes or corrupt its
/// output. Only launches write the output, like a device buffer.
#[derive(Default)]
struct ScriptedBackend {
    calls: Vec<String>,
    loaded: Option<EncodedSignal>,
    output: Option<AcorrOutput>,
    max_wg: usize,
    fail_on_launch: Option<usize>,
    /// Launches of this variant succeed without writing anything.
    silent_variant: Option<KernelVariant>,
    corrupt_output: bool,
    launches: usize,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self { max_wg: 256, ..Self::default() }
    }
}

impl AcorrBackend for ScriptedBackend {
    type Error = ScriptedError;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn device_name(&self) -> &str {
        "Scripted Device"
    }

    fn max_work_group_size(&self) -> usize {
        self.max_wg
    }

    fn load(&mut self, signal: &EncodedSignal) -> Result<(), ScriptedError> {
        self.calls.push(format!("load {}", signal.encoding()));
        self.output = Some(AcorrOutput::zeroed(signal.encoding(), signal.len()));
        self.loaded = Some(signal.clone());
        Ok(())
    }

    fn reset_output(&mut self) -> Result<(), ScriptedError> {
        self.calls.push("reset".into());
        let signal = self.loaded.as_ref().ok_or(ScriptedError("reset before load"))?;
        self.output = Some(AcorrOutput::poisoned(signal.encoding(), signal.len()));
        Ok(())
    }

    fn launch(
        &mut self,
        variant: KernelVariant,
        geometry: &LaunchGeometry,
    ) -> Result<(), ScriptedError> {
        self.launches += 1;
        if self.fail_on_launch == Some(self.launches) {
            return Err(ScriptedError("launch"));
        }
        self.calls.push(format!("launch {variant} {}", geometry.global_work_size));
        if self.silent_variant != Some(variant) {
            let signal = self.loaded.as_ref().ok_or(ScriptedError("launch before load"))?;
            self.output = Some(acorr_kernels::reference_output(signal));
        }
        Ok(())
    }

    fn read_output(&mut self) -> Result<AcorrOutput, ScriptedError> {
        self.calls.push("read".into());
        let mut out = self.output.clone().ok_or(ScriptedError("read before load"))?;
        if self.corrupt_output {
            match &mut out {
                AcorrOutput::F32(v) => v[0] += 100.0,
                AcorrOutput::Q15(v) => v[0] += 100,
            }
        }
        Ok(out)
    }
}

// ── reference backend ──────────────────────────────────────────────

#[test]
fn reference_pass_times_every_pair() {
    let mut backend = ReferenceBackend::new();
    let plan = BenchPlan { verify: true, ..small_plan() };

    let report = run_plan(&mut backend, &plan).unwrap();

    assert_eq!(report.timings.len(), 9);
    assert_eq!(report.backend, "reference");
    assert_eq!(report.sample_count, 64);
    assert!(report.all_verified());
    assert_eq!(backend.launches(), 9 * 3);
    for t in &report.timings {
        assert_eq!(t.iterations, 3);
        assert!(t.elapsed_secs >= 0.0);
        assert!(t.verification.is_some());
    }
}

#[test]
fn timings_follow_plan_order() {
    let mut backend = ReferenceBackend::new();
    let plan = BenchPlan {
        encodings: vec![SampleEncoding::Q15, SampleEncoding::F32],
        variants: vec![KernelVariant::Vec4, KernelVariant::Naive],
        ..small_plan()
    };

    let report = run_plan(&mut backend, &plan).unwrap();
    let names: Vec<&str> = report.timings.iter().map(|t| t.kernel_name.as_str()).collect();
    assert_eq!(names, ["acorr_vec4_q15", "acorr_q15", "acorr_vec4", "acorr"]);
}

#[test]
fn verification_skipped_unless_requested() {
    let mut backend = ReferenceBackend::new();
    let report = run_plan(&mut backend, &small_plan()).unwrap();
    assert!(report.timings.iter().all(|t| t.verification.is_none()));
}

// ── call sequence ──────────────────────────────────────────────────

#[test]
fn warmup_launches_precede_timed_launches() {
    let mut backend = ScriptedBackend::new();
    let plan = BenchPlan {
        encodings: vec![SampleEncoding::F16],
        variants: vec![KernelVariant::Local],
        iterations: 2,
        warmup_iterations: 1,
        ..small_plan()
    };

    run_plan(&mut backend, &plan).unwrap();

    assert_eq!(
        backend.calls,
        ["load f16", "reset", "launch local 64", "launch local 64", "launch local 64", "read"]
    );
}

#[test]
fn on_result_sees_each_timing_as_it_finishes() {
    let mut backend = ScriptedBackend::new();
    let mut seen = Vec::new();
    let report =
        run_plan_with(&mut backend, &small_plan(), |t| seen.push(t.kernel_name.clone())).unwrap();

    let collected: Vec<String> = report.timings.iter().map(|t| t.kernel_name.clone()).collect();
    assert_eq!(seen, collected);
}

// ── failures ───────────────────────────────────────────────────────

#[test]
fn launch_failure_names_stage_and_target() {
    let mut backend = ScriptedBackend { fail_on_launch: Some(4), ..ScriptedBackend::new() };

    let err = run_plan(&mut backend, &small_plan()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("launch failed for f32/local"), "{msg}");
    assert!(err.backend_source().unwrap().downcast_ref::<ScriptedError>().is_some());
}

#[test]
fn oversized_work_group_is_rejected_before_launch() {
    let mut backend = ScriptedBackend { max_wg: 8, ..ScriptedBackend::new() };
    let plan = BenchPlan { variants: vec![KernelVariant::Local], ..small_plan() };

    let err = run_plan(&mut backend, &plan).unwrap_err();
    assert!(matches!(err, HarnessError::WorkGroupTooLarge { requested: 16, max: 8 }));
    assert_eq!(backend.calls, ["load f32"]);
}

#[test]
fn corrupt_output_fails_verification_but_not_the_pass() {
    let mut backend = ScriptedBackend { corrupt_output: true, ..ScriptedBackend::new() };
    let plan = BenchPlan { verify: true, ..small_plan() };

    let report = run_plan(&mut backend, &plan).unwrap();
    assert!(!report.all_verified());
    assert_eq!(report.failures().count(), 9);
}

#[test]
fn kernel_that_writes_nothing_fails_verification() {
    let mut backend =
        ScriptedBackend { silent_variant: Some(KernelVariant::Local), ..ScriptedBackend::new() };
    // Local runs right after Naive, which leaves a correct result behind.
    let plan = BenchPlan { verify: true, ..small_plan() };

    let report = run_plan(&mut backend, &plan).unwrap();
    let failed: Vec<&str> = report.failures().map(|t| t.kernel_name.as_str()).collect();
    assert_eq!(failed, ["acorr_local", "acorr_local_q15", "acorr_local_f16"]);
}

#[test]
fn output_is_reset_before_every_variant() {
    let mut backend = ScriptedBackend::new();
    let plan = BenchPlan {
        encodings: vec![SampleEncoding::Q15],
        variants: vec![KernelVariant::Naive, KernelVariant::Vec4],
        iterations: 1,
        ..small_plan()
    };

    run_plan(&mut backend, &plan).unwrap();
    assert_eq!(
        backend.calls,
        ["load q15", "reset", "launch naive 64", "read", "reset", "launch vec4 64", "read"]
    );
}

#[test]
fn invalid_plan_touches_no_device() {
    let mut backend = ScriptedBackend::new();
    let plan = BenchPlan { iterations: 0, ..small_plan() };

    assert!(run_plan(&mut backend, &plan).is_err());
    assert!(backend.calls.is_empty());
}

#[test]
fn report_serializes_to_json() {
    let mut backend = ReferenceBackend::new();
    let plan = BenchPlan { verify: true, encodings: vec![SampleEncoding::Q15], ..small_plan() };
    let report = run_plan(&mut backend, &plan).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["timings"][0]["encoding"], "q15");
    assert_eq!(json["timings"][0]["variant"], "naive");
    assert_eq!(json["timings"][0]["verification"]["passed"], true);
}
