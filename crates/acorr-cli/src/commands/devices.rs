//! Device listing.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use acorr_opencl::{DeviceInfo, DeviceKind, enumerate_devices};

use crate::config::BenchConfig;
use crate::output::OutputConfig;

/// List every OpenCL device with the index `run --device` expects.
#[derive(Args, Debug, Default, Clone)]
pub struct DevicesCommand {
    /// Restrict enumeration to one device type (all, gpu, cpu, accelerator)
    #[arg(long, value_name = "TYPE")]
    pub device_type: Option<DeviceKind>,
}

impl DevicesCommand {
    pub fn execute(&self, config: &BenchConfig, out: OutputConfig) -> Result<()> {
        let kind = self.device_type.unwrap_or(config.device_type);
        let devices = enumerate_devices(kind).context("enumerating OpenCL devices")?;
        out.emit_result(&devices, |devices| print_devices(devices))
    }
}

fn print_devices(devices: &[DeviceInfo]) {
    println!("{}", style("OpenCL devices").bold().cyan());
    for d in devices {
        println!("  [{}] {} ({})", d.index, style(&d.name).bold(), d.class);
        println!("      platform: {}, vendor: {}", d.platform, d.vendor);
        println!(
            "      {}, {} compute units, max work group {}, {} KiB local memory",
            d.version,
            d.compute_units,
            d.max_work_group_size,
            d.local_mem_bytes / 1024
        );
    }
}
