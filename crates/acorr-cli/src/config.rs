//! Benchmark configuration with TOML, environment variable, and default
//! sources.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, `ACORR_*`
//! environment variables, command-line flags.

use std::path::{Path, PathBuf};
use std::{env, fmt, fs};

use acorr_harness::BenchPlan;
use acorr_kernels::{KernelVariant, SampleEncoding, SignalSpec};
use acorr_opencl::DeviceKind;
use serde::{Deserialize, Serialize};

/// Errors produced by configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("invalid environment variable value for {key}: {value}")]
    InvalidEnvVar { key: String, value: String },
}

/// Which backend runs the kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// OpenCL when compiled in, the CPU reference otherwise.
    #[default]
    Auto,
    #[serde(alias = "cl")]
    OpenCl,
    #[serde(alias = "cpu")]
    Reference,
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::OpenCl => write!(f, "opencl"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

impl std::str::FromStr for BackendChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "opencl" | "cl" => Ok(Self::OpenCl),
            "reference" | "cpu" => Ok(Self::Reference),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
    }
}

/// Log line layout on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// The `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

/// On-disk layout: a `[bench]` table and a `[logging]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    bench: BenchConfig,
    logging: LoggingConfig,
}

/// Full configuration of one `acorr-bench` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub backend: BackendChoice,
    /// Index into the enumerated device list.
    pub device: usize,
    pub device_type: DeviceKind,
    pub sample_count: usize,
    pub cycles: f64,
    pub work_group_size: usize,
    pub iterations: usize,
    pub warmup: usize,
    pub encodings: Vec<SampleEncoding>,
    pub variants: Vec<KernelVariant>,
    pub verify: bool,
    /// Load `acorr_*.cl` from here instead of the embedded sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_dir: Option<PathBuf>,
    #[serde(skip)]
    pub logging: LoggingConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        let plan = BenchPlan::default();
        Self {
            backend: BackendChoice::Auto,
            device: 0,
            device_type: DeviceKind::All,
            sample_count: plan.signal.sample_count,
            cycles: plan.signal.cycles,
            work_group_size: plan.work_group_size,
            iterations: plan.iterations,
            warmup: plan.warmup_iterations,
            encodings: plan.encodings,
            variants: plan.variants,
            verify: plan.verify,
            kernel_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// A partial configuration: only the keys one source actually set.
///
/// Built from `ACORR_*` variables or command-line flags and applied with
/// [`BenchConfig::merge_with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub backend: Option<BackendChoice>,
    pub device: Option<usize>,
    pub device_type: Option<DeviceKind>,
    pub sample_count: Option<usize>,
    pub cycles: Option<f64>,
    pub work_group_size: Option<usize>,
    pub iterations: Option<usize>,
    pub warmup: Option<usize>,
    pub encodings: Option<Vec<SampleEncoding>>,
    pub variants: Option<Vec<KernelVariant>>,
    pub verify: Option<bool>,
    pub kernel_dir: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    /// Read every `ACORR_*` variable that is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut o = Self::default();

        if let Ok(v) = env::var("ACORR_BACKEND") {
            o.backend = Some(v.parse()?);
        }
        if let Ok(v) = env::var("ACORR_DEVICE") {
            o.device = Some(parse_env_usize("ACORR_DEVICE", &v)?);
        }
        if let Ok(v) = env::var("ACORR_DEVICE_TYPE") {
            o.device_type = Some(v.parse().map_err(|_| invalid_env("ACORR_DEVICE_TYPE", &v))?);
        }
        if let Ok(v) = env::var("ACORR_SAMPLES") {
            o.sample_count = Some(parse_env_usize("ACORR_SAMPLES", &v)?);
        }
        if let Ok(v) = env::var("ACORR_WORK_GROUP_SIZE") {
            o.work_group_size = Some(parse_env_usize("ACORR_WORK_GROUP_SIZE", &v)?);
        }
        if let Ok(v) = env::var("ACORR_ITERATIONS") {
            o.iterations = Some(parse_env_usize("ACORR_ITERATIONS", &v)?);
        }
        if let Ok(v) = env::var("ACORR_WARMUP") {
            o.warmup = Some(parse_env_usize("ACORR_WARMUP", &v)?);
        }
        if let Ok(v) = env::var("ACORR_VERIFY") {
            o.verify = Some(parse_env_bool("ACORR_VERIFY", &v)?);
        }
        if let Ok(v) = env::var("ACORR_KERNEL_DIR") {
            o.kernel_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("ACORR_LOG_LEVEL") {
            o.log_level = Some(v.parse()?);
        }

        Ok(o)
    }
}

impl BenchConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// Missing tables fall back to defaults. If the file does not exist,
    /// returns `Ok(Self::default())`.
    pub fn from_toml(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(Self { logging: file.logging, ..file.bench })
    }

    /// Serialize to TOML with `[bench]` and `[logging]` tables.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = ConfigFile { bench: self.clone(), logging: self.logging.clone() };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Defaults overlaid with every `ACORR_*` variable that is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::default().merge_with(&ConfigOverrides::from_env()?))
    }

    /// Overlay every field `overrides` sets, including values equal to the
    /// default.
    #[must_use]
    pub fn merge_with(&self, overrides: &ConfigOverrides) -> Self {
        let o = overrides.clone();
        Self {
            backend: o.backend.unwrap_or(self.backend),
            device: o.device.unwrap_or(self.device),
            device_type: o.device_type.unwrap_or(self.device_type),
            sample_count: o.sample_count.unwrap_or(self.sample_count),
            cycles: o.cycles.unwrap_or(self.cycles),
            work_group_size: o.work_group_size.unwrap_or(self.work_group_size),
            iterations: o.iterations.unwrap_or(self.iterations),
            warmup: o.warmup.unwrap_or(self.warmup),
            encodings: o.encodings.unwrap_or_else(|| self.encodings.clone()),
            variants: o.variants.unwrap_or_else(|| self.variants.clone()),
            verify: o.verify.unwrap_or(self.verify),
            kernel_dir: o.kernel_dir.or_else(|| self.kernel_dir.clone()),
            logging: LoggingConfig {
                level: o.log_level.unwrap_or(self.logging.level),
                format: o.log_format.unwrap_or(self.logging.format),
            },
        }
    }

    /// Report the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::Validation("sample_count must be >= 1".into()));
        }
        if self.sample_count > i32::MAX as usize {
            return Err(ConfigError::Validation(format!(
                "sample_count must fit in a 32-bit int (got {})",
                self.sample_count
            )));
        }
        if self.work_group_size == 0 {
            return Err(ConfigError::Validation("work_group_size must be >= 1".into()));
        }
        if self.iterations == 0 {
            return Err(ConfigError::Validation("iterations must be >= 1".into()));
        }
        if !self.cycles.is_finite() {
            return Err(ConfigError::Validation("cycles must be finite".into()));
        }
        if self.encodings.is_empty() {
            return Err(ConfigError::Validation("encodings must not be empty".into()));
        }
        if self.variants.is_empty() {
            return Err(ConfigError::Validation("variants must not be empty".into()));
        }
        self.to_plan().validate().map_err(|e| ConfigError::Validation(e.to_string()))?;
        if let Some(dir) = &self.kernel_dir {
            if !dir.is_dir() {
                return Err(ConfigError::Validation(format!(
                    "kernel_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// The benchmark pass this configuration describes.
    pub fn to_plan(&self) -> BenchPlan {
        BenchPlan {
            signal: SignalSpec { sample_count: self.sample_count, cycles: self.cycles },
            work_group_size: self.work_group_size,
            iterations: self.iterations,
            warmup_iterations: self.warmup,
            encodings: self.encodings.clone(),
            variants: self.variants.clone(),
            verify: self.verify,
        }
    }
}

fn invalid_env(key: &str, val: &str) -> ConfigError {
    ConfigError::InvalidEnvVar { key: key.to_string(), value: val.to_string() }
}

fn parse_env_usize(key: &str, val: &str) -> Result<usize, ConfigError> {
    val.parse::<usize>().map_err(|_| invalid_env(key, val))
}

fn parse_env_bool(key: &str, val: &str) -> Result<bool, ConfigError> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_env(key, val)),
    }
}
