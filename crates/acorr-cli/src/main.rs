//! acorr-bench
//!
//! Times OpenCL autocorrelation kernels (naive, local-memory tiled,
//! vectorized) over float, Q15 fixed-point and half-precision samples.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use tracing::debug;

use acorr_cli::commands::{DevicesCommand, KernelsCommand, RunCommand};
use acorr_cli::config::{BenchConfig, ConfigOverrides, LogFormat, LoggingConfig};
use acorr_cli::exit::{EXIT_SUCCESS, error_line, exit_code};
use acorr_cli::output::{OutputConfig, OutputFormat};

/// Default configuration file, read from the working directory when present.
const DEFAULT_CONFIG_FILE: &str = "acorr.toml";

/// OpenCL autocorrelation microbenchmark
#[derive(Parser)]
#[command(name = "acorr-bench")]
#[command(about = "OpenCL autocorrelation kernel microbenchmark")]
#[command(long_about = r#"
Synthesizes a sine test signal, uploads it to an OpenCL device and times
repeated launches of each autocorrelation kernel variant under each sample
encoding.

Examples:
  # Full pass on the first device
  acorr-bench

  # Second device, tiled kernels only, check results
  acorr-bench run --device 1 --variants local --verify

  # List devices
  acorr-bench devices
"#)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark (default)
    #[command(alias = "bench")]
    Run(RunCommand),

    /// List OpenCL devices
    #[command(alias = "list")]
    Devices(DevicesCommand),

    /// List kernel entry points and launch geometry
    Kernels(KernelsCommand),
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{}", style(error_line(&e)).red());
            for cause in e.chain().skip(1) {
                debug!("  Caused by: {}", cause);
            }
            exit_code(&e)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let config = load_configuration(&cli)?;
    setup_logging(&config.logging)?;
    if cli.config.is_none() && !Path::new(DEFAULT_CONFIG_FILE).exists() {
        debug!("No {DEFAULT_CONFIG_FILE} in the working directory; using defaults");
    }
    debug!(?config, "configuration loaded");

    let out = OutputConfig::new(cli.format);
    match cli.command {
        Some(Commands::Run(cmd)) => cmd.execute(&config, out),
        Some(Commands::Devices(cmd)) => cmd.execute(&config, out),
        Some(Commands::Kernels(cmd)) => cmd.execute(&config, out),
        None => RunCommand::default().execute(&config, out),
    }
}

/// Defaults, then the config file, then `ACORR_*`, then `--log-level`.
/// Subcommand flags are applied by the command itself.
fn load_configuration(cli: &Cli) -> Result<BenchConfig> {
    let path = match &cli.config {
        Some(path) if !path.exists() => bail!("config file {} does not exist", path.display()),
        Some(path) => path.clone(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };
    let file = BenchConfig::from_toml(&path)
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
    let env = ConfigOverrides::from_env().context("Failed to read ACORR_* environment")?;
    let mut config = file.merge_with(&env);

    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse().context("Invalid --log-level")?;
    }
    Ok(config)
}

/// Install the stderr subscriber; `RUST_LOG` overrides the configured level.
fn setup_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level.to_string()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match logging.format {
        LogFormat::Json => subscriber
            .json()
            .with_timer(tracing_subscriber::fmt::time::uptime())
            .try_init(),
        LogFormat::Compact => subscriber.compact().try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
