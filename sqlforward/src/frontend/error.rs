//! Frontend errors.

use thiserror::Error;

/// Frontend error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] sqlforward_config::Error),

    #[error("{0}")]
    Translator(#[from] crate::translator::Error),

    #[error("{0}")]
    Warehouse(#[from] crate::warehouse::Error),
}
