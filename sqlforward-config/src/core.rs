use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::error::Error;
use super::general::General;

/// sqlforward.toml
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: General,
}

impl Config {
    /// Parse configuration from TOML.
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }
}

/// Configuration together with where it came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigAndPath {
    /// sqlforward.toml
    pub config: Config,
    /// Path to sqlforward.toml.
    pub config_path: PathBuf,
}

impl ConfigAndPath {
    /// Load configuration from disk or use defaults.
    pub fn load(config_path: &Path) -> Result<Self, Error> {
        let config = if let Ok(source) = read_to_string(config_path) {
            let config = Config::from_toml(&source)?;
            info!("loaded \"{}\"", config_path.display());
            config
        } else {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                config_path.display()
            );
            Config::default()
        };

        Ok(Self {
            config,
            config_path: config_path.to_owned(),
        })
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;
    use crate::LogFormat;

    #[test]
    fn test_basic() {
        let source = r#"
[general]
default_mapping = "/opt/forward/mapping.yaml"
default_probe_file = "/opt/forward/probe.yaml"
warehouse_queue = 128
shutdown_timeout = 250
log_format = "json"
"#;

        let config = Config::from_toml(source).unwrap();
        assert_eq!(config.general.default_mapping, "/opt/forward/mapping.yaml");
        assert_eq!(
            config.general.default_probe_file,
            PathBuf::from("/opt/forward/probe.yaml")
        );
        assert_eq!(config.general.warehouse_queue, 128);
        assert_eq!(config.general.shutdown_timeout, 250);
        assert_eq!(config.general.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let source = r#"
[general]
warehouse_size = 128
"#;
        assert!(matches!(Config::from_toml(source), Err(Error::Toml(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\ndefault_mapping = \"/srv/mapping.yaml\"").unwrap();

        let loaded = ConfigAndPath::load(file.path()).unwrap();
        assert_eq!(loaded.config.general.default_mapping, "/srv/mapping.yaml");
        assert_eq!(loaded.config_path, file.path());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ConfigAndPath::load(&dir.path().join("sqlforward.toml")).unwrap();
        assert_eq!(loaded.config.general.default_mapping, "/tmp/mapping.yaml");
    }
}
