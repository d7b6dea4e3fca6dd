use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Log output format.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Settings shared by every connection opened in this process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct General {
    /// Mapping resource used when the connect string doesn't name one.
    ///
    /// _Default:_ `/tmp/mapping.yaml`
    #[serde(default = "General::default_mapping")]
    pub default_mapping: String,

    /// Probe file used in discover mode when the connect string doesn't name one.
    ///
    /// _Default:_ `/tmp/probe.yaml`
    #[serde(default = "General::default_probe_file")]
    pub default_probe_file: PathBuf,

    /// Maximum number of statements waiting to be written to the probe file.
    /// Statements discovered while the queue is full are not written.
    ///
    /// _Default:_ `16384`
    #[serde(default = "General::warehouse_queue")]
    pub warehouse_queue: usize,

    /// How long to wait for the probe writer to drain on shutdown. Milliseconds.
    ///
    /// _Default:_ `5000`
    #[serde(default = "General::default_shutdown_timeout")]
    pub shutdown_timeout: u64,

    /// Log output format.
    ///
    /// _Default:_ `text`
    #[serde(default = "General::log_format")]
    pub log_format: LogFormat,
}

impl Default for General {
    fn default() -> Self {
        Self {
            default_mapping: Self::default_mapping(),
            default_probe_file: Self::default_probe_file(),
            warehouse_queue: Self::warehouse_queue(),
            shutdown_timeout: Self::default_shutdown_timeout(),
            log_format: Self::log_format(),
        }
    }
}

impl General {
    fn env_or_default<T: FromStr>(env_var: &str, default: T) -> T {
        env::var(env_var)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn env_string_or_default(env_var: &str, default: &str) -> String {
        env::var(env_var)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn default_mapping() -> String {
        Self::env_string_or_default("SQLFORWARD_DEFAULT_MAPPING", "/tmp/mapping.yaml")
    }

    fn default_probe_file() -> PathBuf {
        PathBuf::from(Self::env_string_or_default(
            "SQLFORWARD_DEFAULT_PROBE_FILE",
            "/tmp/probe.yaml",
        ))
    }

    pub fn warehouse_queue() -> usize {
        Self::env_or_default("SQLFORWARD_WAREHOUSE_QUEUE", 16384)
    }

    fn default_shutdown_timeout() -> u64 {
        Self::env_or_default("SQLFORWARD_SHUTDOWN_TIMEOUT", 5_000)
    }

    fn log_format() -> LogFormat {
        Self::env_or_default("SQLFORWARD_LOG_FORMAT", LogFormat::Text)
    }

    /// Get shutdown timeout as a duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout)
    }
}
