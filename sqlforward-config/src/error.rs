//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Url(#[from] url::ParseError),

    #[error("connect string \"{url}\" is not supported: {reason}")]
    MalformedTarget { url: String, reason: &'static str },

    #[error("\"{name}\" must be one of {allowed}, got \"{value}\"")]
    InvalidParameter {
        name: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("\"{0}\" parameter has no value")]
    MissingValue(String),

    #[error("\"{0}\" scheme is not supported")]
    UnsupportedScheme(String),
}

impl Error {
    pub(crate) fn malformed(url: &str, reason: &'static str) -> Self {
        Self::MalformedTarget {
            url: url.to_owned(),
            reason,
        }
    }

    pub(crate) fn invalid(name: &'static str, value: &str, allowed: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_owned(),
            allowed,
        }
    }
}
