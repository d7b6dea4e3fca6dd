//! Warehouse errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("probe file \"{path}\" could not be opened: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("warehouse writer could not be started: {0}")]
    Spawn(std::io::Error),
}
