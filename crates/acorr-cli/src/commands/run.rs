//! The benchmark pass.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use acorr_harness::{AcorrBackend, BenchPlan, BenchReport, ReferenceBackend, run_plan_with};
use acorr_kernels::{KernelSourceSet, KernelVariant, SampleEncoding};
use acorr_opencl::{DeviceKind, OpenClBackend, runtime_compiled};

use crate::config::{BackendChoice, BenchConfig, ConfigOverrides};
use crate::exit::VerificationFailed;
use crate::output::{OutputConfig, print_summary, timing_line};

/// Run arguments. Every flag overrides the configuration file and
/// environment when given.
#[derive(Args, Debug, Default, Clone)]
pub struct RunCommand {
    /// Device index across all platforms
    #[arg(short, long, value_name = "N")]
    pub device: Option<usize>,

    /// Restrict enumeration to one device type (all, gpu, cpu, accelerator)
    #[arg(long, value_name = "TYPE")]
    pub device_type: Option<DeviceKind>,

    /// Backend to run on (auto, opencl, reference)
    #[arg(short, long, value_name = "BACKEND")]
    pub backend: Option<BackendChoice>,

    /// Number of signal samples
    #[arg(short = 'n', long, value_name = "N")]
    pub samples: Option<usize>,

    /// Sine cycles factor of the synthesized signal
    #[arg(long, value_name = "F")]
    pub cycles: Option<f64>,

    /// Local work-group size for the tiled kernels
    #[arg(short, long, value_name = "N")]
    pub work_group_size: Option<usize>,

    /// Timed launches per kernel
    #[arg(short, long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Untimed launches per kernel before timing
    #[arg(long, value_name = "N")]
    pub warmup: Option<usize>,

    /// Encodings to run (f32, q15, f16)
    #[arg(long, value_delimiter = ',', value_name = "LIST")]
    pub encodings: Vec<SampleEncoding>,

    /// Kernel variants to run (naive, local, vec4)
    #[arg(long, value_delimiter = ',', value_name = "LIST")]
    pub variants: Vec<KernelVariant>,

    /// Directory holding acorr_f32.cl, acorr_q15.cl and acorr_f16.cl
    #[arg(long, value_name = "PATH")]
    pub kernel_dir: Option<PathBuf>,

    /// Check every result against the CPU reference
    #[arg(long)]
    pub verify: bool,

    /// Also write the JSON report to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RunCommand {
    /// The flags that were given, as a partial configuration.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend,
            device: self.device,
            device_type: self.device_type,
            sample_count: self.samples,
            cycles: self.cycles,
            work_group_size: self.work_group_size,
            iterations: self.iterations,
            warmup: self.warmup,
            encodings: (!self.encodings.is_empty()).then(|| self.encodings.clone()),
            variants: (!self.variants.is_empty()).then(|| self.variants.clone()),
            verify: self.verify.then_some(true),
            kernel_dir: self.kernel_dir.clone(),
            ..ConfigOverrides::default()
        }
    }

    /// Overlay the flags that were given on `config`.
    pub fn apply(&self, config: BenchConfig) -> BenchConfig {
        config.merge_with(&self.overrides())
    }

    pub fn execute(&self, config: &BenchConfig, out: OutputConfig) -> Result<()> {
        let config = self.apply(config.clone());
        config.validate().context("invalid benchmark configuration")?;
        let plan = config.to_plan();

        let report = match resolve_backend(config.backend) {
            BackendChoice::Reference => {
                let mut backend = ReferenceBackend::new();
                out.line(format!("Using reference backend: {}", backend.device_name()));
                bench(&mut backend, &plan, out)?
            }
            _ => {
                let sources = load_sources(&config)?;
                let mut backend =
                    OpenClBackend::new(config.device, config.device_type, sources)
                        .with_context(|| format!("opening OpenCL device {}", config.device))?;
                out.line(format!("Using OpenCL device: {}", backend.device_name()));
                bench(&mut backend, &plan, out)?
            }
        };

        if let Some(path) = &self.output {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(path, json)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        out.emit_result(&report, print_summary)?;

        if plan.verify && !report.all_verified() {
            let failed = report.failures().count();
            return Err(VerificationFailed { failed, total: report.timings.len() }.into());
        }
        Ok(())
    }
}

/// `Auto` becomes OpenCL when the runtime is linked.
pub fn resolve_backend(choice: BackendChoice) -> BackendChoice {
    match choice {
        BackendChoice::Auto if runtime_compiled() => BackendChoice::OpenCl,
        BackendChoice::Auto => {
            warn!("OpenCL support not compiled in; falling back to the CPU reference backend");
            BackendChoice::Reference
        }
        other => other,
    }
}

fn load_sources(config: &BenchConfig) -> Result<KernelSourceSet> {
    match &config.kernel_dir {
        Some(dir) => KernelSourceSet::from_dir(dir)
            .with_context(|| format!("loading kernels from {}", dir.display())),
        None => Ok(KernelSourceSet::embedded()),
    }
}

fn bench<B: AcorrBackend>(
    backend: &mut B,
    plan: &BenchPlan,
    out: OutputConfig,
) -> Result<BenchReport> {
    run_plan_with(backend, plan, |timing| out.line(timing_line(timing)))
        .context("benchmark pass failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cmd = RunCommand {
            iterations: Some(5),
            encodings: vec![SampleEncoding::F16],
            verify: true,
            ..Default::default()
        };
        let base = BenchConfig { iterations: 100, warmup: 2, ..Default::default() };
        let cfg = cmd.apply(base);
        assert_eq!(cfg.iterations, 5);
        assert_eq!(cfg.warmup, 2);
        assert_eq!(cfg.encodings, vec![SampleEncoding::F16]);
        assert_eq!(cfg.variants, KernelVariant::ALL.to_vec());
        assert!(cfg.verify);
    }

    #[test]
    fn flag_equal_to_default_still_overrides() {
        let cmd = RunCommand { device: Some(0), warmup: Some(0), ..Default::default() };
        let cfg = cmd.apply(BenchConfig { device: 3, warmup: 9, ..Default::default() });
        assert_eq!(cfg.device, 0);
        assert_eq!(cfg.warmup, 0);
    }

    #[test]
    fn explicit_backends_are_kept() {
        assert_eq!(resolve_backend(BackendChoice::Reference), BackendChoice::Reference);
        assert_eq!(resolve_backend(BackendChoice::OpenCl), BackendChoice::OpenCl);
        let auto = resolve_backend(BackendChoice::Auto);
        assert_eq!(auto == BackendChoice::OpenCl, runtime_compiled());
    }

    #[test]
    fn reference_pass_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let cmd = RunCommand {
            backend: Some(BackendChoice::Reference),
            samples: Some(64),
            work_group_size: Some(16),
            iterations: Some(2),
            verify: true,
            output: Some(path.clone()),
            ..Default::default()
        };
        cmd.execute(&BenchConfig::default(), OutputConfig::default()).unwrap();

        let report: BenchReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report.backend, "reference");
        assert_eq!(report.timings.len(), 9);
        assert!(report.all_verified());
    }
}
