//! Configuration.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;

pub use sqlforward_config::*;

static CONFIG: Lazy<ArcSwap<ConfigAndPath>> =
    Lazy::new(|| ArcSwap::from_pointee(ConfigAndPath::default()));

/// Current configuration.
pub fn config() -> Arc<ConfigAndPath> {
    CONFIG.load().clone()
}

/// Load the configuration file from disk.
pub fn load(config_path: &Path) -> Result<ConfigAndPath, Error> {
    let config = ConfigAndPath::load(config_path)?;
    set(config.clone());
    Ok(config)
}

/// Replace the current configuration.
pub fn set(config: ConfigAndPath) {
    CONFIG.store(Arc::new(config));
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_and_set() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nwarehouse_queue = 3").unwrap();

        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.config.general.warehouse_queue, 3);
        assert_eq!(config().config.general.warehouse_queue, 3);
        assert_eq!(config().config_path, file.path());

        set(ConfigAndPath::default());
        assert_eq!(
            config().config.general.warehouse_queue,
            General::default().warehouse_queue
        );
    }
}
