//! Translator errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("mapping \"{location}\" could not be loaded: {reason}")]
    TranslationSource { location: String, reason: String },

    #[error("{0}")]
    Config(#[from] sqlforward_config::Error),

    #[error("statement has no \":{0}\" parameter")]
    UnknownParameter(String),

    #[error("missing parameter: ${0}")]
    UnboundParameter(usize),
}

impl Error {
    pub(crate) fn load(location: impl ToString, reason: impl ToString) -> Self {
        Self::TranslationSource {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}
