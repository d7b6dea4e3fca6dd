//! Statement translation and redirection for database driver shims.
//!
//! A driver shim hands every connect string to [`Forward::connect`] and
//! every statement to [`Forward::prepare`]. Depending on the connection's
//! mode, statements are translated for a substitute backend or recorded
//! to a probe file for later translation.

pub mod cli;
pub mod config;
pub mod fingerprint;
pub mod frontend;
pub mod logger;
pub mod translator;
pub mod warehouse;

pub use fingerprint::Fingerprint;
pub use frontend::{Error, Forward, Interceptor, Prepared};
pub use sqlforward_config::{Backend, MappingFormat, Mode, RouteConfig};
pub use translator::{BindMap, Translator};
pub use warehouse::Warehouse;
