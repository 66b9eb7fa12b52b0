//! Output rendering for CLI commands.
//!
//! Results go to stdout (text or JSON); status lines and logs go to stderr.

use std::io::Write;

use acorr_harness::{BenchReport, VariantTiming};
use console::style;
use serde::Serialize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'. Expected one of: text, json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Global output configuration derived from CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Print a text-mode line to stdout; JSON mode prints nothing.
    pub fn line(&self, msg: impl std::fmt::Display) {
        if self.is_text() {
            println!("{msg}");
        }
    }

    /// Emit a final result value. In JSON mode it is serialized to stdout;
    /// in text mode `text_fn` is called to render human output.
    pub fn emit_result<T: Serialize>(
        &self,
        value: &T,
        text_fn: impl FnOnce(&T),
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)?;
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}")?;
            }
            OutputFormat::Text => text_fn(value),
        }
        Ok(())
    }
}

/// Seconds as a short human figure ("12.35 us", "1.204 ms").
pub fn format_seconds(secs: f64) -> String {
    if secs >= 1.0 {
        format!("{secs:.3} s")
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else if secs >= 1e-6 {
        format!("{:.2} us", secs * 1e6)
    } else {
        format!("{:.0} ns", secs * 1e9)
    }
}

/// `acorr_local: 0.412345 sec (41.23 us/run)`, plus a verification mark.
pub fn timing_line(t: &VariantTiming) -> String {
    let mut line = format!(
        "{}: {:.6} sec ({}/run)",
        t.kernel_name,
        t.elapsed_secs,
        format_seconds(t.seconds_per_run)
    );
    match t.verification {
        Some(v) if v.passed => line.push_str(&format!(" {}", style("verified").green())),
        Some(v) => line.push_str(&format!(
            " {} (max error {:.3e} > {:.3e})",
            style("MISMATCH").red().bold(),
            v.max_abs_error,
            v.tolerance
        )),
        None => {}
    }
    line
}

/// Closing summary printed after all timings.
pub fn print_summary(report: &BenchReport) {
    println!();
    println!(
        "{} {} launches per kernel, {} samples, total {}",
        style("Done:").bold(),
        report.iterations,
        report.sample_count,
        format_seconds(report.total_secs)
    );
    if let Some(best) = report.fastest() {
        println!(
            "{} {} ({}/run)",
            style("Fastest:").bold(),
            style(&best.kernel_name).cyan(),
            format_seconds(best.seconds_per_run)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acorr_kernels::{KernelVariant, SampleEncoding};
    use std::time::Duration;

    #[test]
    fn format_parse_roundtrip() {
        for f in [OutputFormat::Text, OutputFormat::Json] {
            assert_eq!(f.to_string().parse::<OutputFormat>().unwrap(), f);
        }
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn seconds_pick_a_readable_unit() {
        assert_eq!(format_seconds(2.0), "2.000 s");
        assert_eq!(format_seconds(0.0125), "12.500 ms");
        assert_eq!(format_seconds(0.000_041_5), "41.50 us");
        assert_eq!(format_seconds(5e-8), "50 ns");
    }

    #[test]
    fn timing_line_names_kernel_and_seconds() {
        let t = VariantTiming::new(
            SampleEncoding::F32,
            KernelVariant::Local,
            1000,
            Duration::from_millis(500),
        );
        let line = timing_line(&t);
        assert!(line.starts_with("acorr_local: 0.500000 sec"), "{line}");
        assert!(line.contains("500.00 us/run"), "{line}");
    }
}
