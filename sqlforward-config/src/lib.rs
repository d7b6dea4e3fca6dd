// Submodules
pub mod core;
pub mod error;
pub mod general;
pub mod location;
pub mod mode;
pub mod route;

pub use core::{Config, ConfigAndPath};
pub use error::Error;
pub use general::{General, LogFormat};
pub use location::MappingLocation;
pub use mode::{Backend, MappingFormat, Mode};
pub use route::RouteConfig;
