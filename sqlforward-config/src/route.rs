//! Parse the client's connect string into a route.
//!
//! Connect strings look like this:
//!
//! ```text
//! jdbc:oracle:thin:@//db.local:1521/ORCL?forward.mode=redirect&forward.backend=postgres&sslmode=require
//! ```
//!
//! The `forward.*` parameters configure this driver, everything
//! else is passed through to the backend.
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use super::{Backend, Error, General, MappingFormat, MappingLocation, Mode};

/// Prefix of every connect string we accept.
pub const SOURCE_PREFIX: &str = "jdbc:oracle:thin:";

/// Location of the mapping resource.
pub const MAPPING_URL: &str = "forward.mapping.url";
/// Mapping resource format, `table` or `map`.
pub const MAPPING_FORMAT: &str = "forward.mapping.format";
/// Backend engine, `postgres` or `mariadb`.
pub const BACKEND: &str = "forward.backend";
/// Operating mode, `redirect`, `discover` or `rewrite`.
pub const MODE: &str = "forward.mode";
/// Where discovered statements are written.
pub const PROBE_FILE: &str = "forward.probe.file";

/// Where and how a connection sends its statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteConfig {
    /// Operating mode.
    pub mode: Mode,
    /// Backend engine used in redirect mode.
    pub backend: Backend,
    /// Mapping resource.
    pub mapping: MappingLocation,
    /// Mapping resource format.
    pub mapping_format: MappingFormat,
    /// Probe file, used in discover mode.
    pub probe_file: PathBuf,
    /// Connect string handed to the backend driver.
    pub target: String,
}

impl RouteConfig {
    /// Parse a connect string using built-in defaults.
    pub fn parse(url: &str) -> Result<Self, Error> {
        Self::parse_with(url, &General::default())
    }

    /// Parse a connect string, taking defaults from the general config.
    pub fn parse_with(url: &str, general: &General) -> Result<Self, Error> {
        let rest = url
            .strip_prefix(SOURCE_PREFIX)
            .ok_or_else(|| Error::malformed(url, "missing jdbc:oracle:thin: prefix"))?;

        if rest.contains("TNS_ADMIN=") {
            return Err(Error::malformed(url, "TNS alias connect strings"));
        }

        if rest
            .trim_start()
            .to_ascii_uppercase()
            .starts_with("@(DESCRIPTION")
        {
            return Err(Error::malformed(url, "TNS descriptor connect strings"));
        }

        let (base, params) = match rest.split_once('?') {
            Some((base, params)) => (base, Some(params)),
            None => (rest, None),
        };

        let mut mode = Mode::default();
        let mut backend = Backend::default();
        let mut mapping_format = MappingFormat::default();
        let mut mapping = None;
        let mut probe_file = None;
        let mut passthrough = vec![];

        for param in params.unwrap_or_default().split('&') {
            if param.is_empty() {
                continue;
            }

            let Some((key, value)) = param.split_once('=') else {
                if is_ours(param) {
                    return Err(Error::MissingValue(param.to_owned()));
                }
                passthrough.push(param);
                continue;
            };

            match key {
                MAPPING_URL => mapping = Some(value),
                MAPPING_FORMAT => {
                    mapping_format = value
                        .parse()
                        .map_err(|_| Error::invalid(MAPPING_FORMAT, value, "table, map"))?
                }
                BACKEND => {
                    backend = value
                        .parse()
                        .map_err(|_| Error::invalid(BACKEND, value, "postgres, mariadb"))?
                }
                MODE => {
                    mode = value.parse().map_err(|_| {
                        Error::invalid(MODE, value, "redirect, discover, rewrite")
                    })?
                }
                PROBE_FILE => probe_file = Some(PathBuf::from(value)),
                _ => passthrough.push(param),
            }
        }

        let mut target = if mode.keeps_target() {
            format!("{}{}", SOURCE_PREFIX, base)
        } else {
            let host_port_db = base
                .strip_prefix("@//")
                .or_else(|| base.strip_prefix('@'))
                .filter(|host_port_db| !host_port_db.is_empty())
                .ok_or_else(|| Error::malformed(url, "only EZConnect connect strings"))?;
            format!("{}{}", backend.prefix(), host_port_db)
        };

        if !passthrough.is_empty() {
            target.push('?');
            target.push_str(&passthrough.join("&"));
        }

        // Only translating modes read the mapping.
        let mapping = match mapping {
            Some(value) if !mode.translates() => MappingLocation::new(value).or_else(|err| {
                debug!("mapping \"{}\" ignored in {} mode: {}", value, mode, err);
                MappingLocation::new(&general.default_mapping)
            })?,
            mapping => MappingLocation::new(mapping.unwrap_or(&general.default_mapping))?,
        };
        let probe_file = probe_file.unwrap_or_else(|| general.default_probe_file.clone());

        Ok(Self {
            mode,
            backend,
            mapping,
            mapping_format,
            probe_file,
            target,
        })
    }
}

impl FromStr for RouteConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ours(key: &str) -> bool {
    [MAPPING_URL, MAPPING_FORMAT, BACKEND, MODE, PROBE_FILE].contains(&key)
}
