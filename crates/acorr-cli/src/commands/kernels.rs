//! Kernel listing: entry points and launch geometry for the configured sizes.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;

use acorr_kernels::{KernelSourceSet, KernelVariant, SampleEncoding, kernel_name};

use crate::config::BenchConfig;
use crate::output::OutputConfig;

/// Show every encoding/variant pair the benchmark can run.
#[derive(Args, Debug, Default, Clone)]
pub struct KernelsCommand {
    /// Number of signal samples
    #[arg(short = 'n', long, value_name = "N")]
    pub samples: Option<usize>,

    /// Local work-group size for the tiled kernels
    #[arg(short, long, value_name = "N")]
    pub work_group_size: Option<usize>,
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelListing {
    pub encoding: SampleEncoding,
    pub variant: KernelVariant,
    pub entry_point: &'static str,
    pub global_work_size: usize,
    pub local_work_size: Option<usize>,
    pub local_mem_bytes: usize,
    /// Fraction of launched work items that map to a sample.
    pub efficiency: f64,
}

impl KernelsCommand {
    pub fn execute(&self, config: &BenchConfig, out: OutputConfig) -> Result<()> {
        let n = self.samples.unwrap_or(config.sample_count);
        let wg = self.work_group_size.unwrap_or(config.work_group_size);
        if let Some(dir) = &config.kernel_dir {
            KernelSourceSet::from_dir(dir)
                .with_context(|| format!("loading kernels from {}", dir.display()))?;
        }
        let rows = listings(n, wg)?;
        out.emit_result(&rows, |rows| print_listing(rows, n, wg))
    }
}

/// Entry point and geometry of every encoding/variant pair.
pub fn listings(n: usize, wg: usize) -> Result<Vec<KernelListing>> {
    let mut rows = Vec::with_capacity(SampleEncoding::ALL.len() * KernelVariant::ALL.len());
    for &encoding in SampleEncoding::ALL {
        for &variant in KernelVariant::ALL {
            let g = variant.geometry(n, wg, encoding)?;
            rows.push(KernelListing {
                encoding,
                variant,
                entry_point: kernel_name(variant, encoding),
                global_work_size: g.global_work_size,
                local_work_size: g.local_work_size,
                local_mem_bytes: g.local_mem_bytes,
                efficiency: g.efficiency(n),
            });
        }
    }
    Ok(rows)
}

fn print_listing(rows: &[KernelListing], n: usize, wg: usize) {
    println!("{} ({n} samples, work group {wg})", style("Kernels").bold().cyan());
    for r in rows {
        let local = r.local_work_size.map_or_else(|| "-".to_string(), |l| l.to_string());
        println!(
            "  {:<16} {:>4}/{:<6} global {:>8}  local {:>5}  lmem {:>6} B",
            style(r.entry_point).bold(),
            r.encoding,
            r.variant,
            r.global_work_size,
            local,
            r.local_mem_bytes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_rows_with_padded_local_geometry() {
        let rows = listings(1000, 128).unwrap();
        assert_eq!(rows.len(), 9);
        let q15_local = rows
            .iter()
            .find(|r| r.encoding == SampleEncoding::Q15 && r.variant == KernelVariant::Local)
            .unwrap();
        assert_eq!(q15_local.entry_point, "acorr_local_q15");
        assert_eq!(q15_local.global_work_size, 1024);
        assert_eq!(q15_local.local_work_size, Some(128));
        assert_eq!(q15_local.local_mem_bytes, 256);
    }

    #[test]
    fn zero_work_group_is_an_error() {
        assert!(listings(1024, 0).is_err());
    }
}
