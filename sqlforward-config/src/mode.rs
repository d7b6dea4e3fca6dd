use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the driver does with the statements it receives.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Connect to the substitute backend and rewrite statements
    /// using the mapping (default).
    #[default]
    Redirect,
    /// Keep the original connection and record every distinct
    /// statement to the probe file.
    Discover,
    /// Keep the original connection but rewrite statements
    /// using the mapping.
    Rewrite,
}

impl Mode {
    /// Statements go through the translation table.
    pub fn translates(&self) -> bool {
        matches!(self, Mode::Redirect | Mode::Rewrite)
    }

    /// The original connect string is forwarded as-is.
    pub fn keeps_target(&self) -> bool {
        matches!(self, Mode::Discover | Mode::Rewrite)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Mode::Redirect => "redirect",
            Mode::Discover => "discover",
            Mode::Rewrite => "rewrite",
        };
        f.write_str(value)
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redirect" => Ok(Mode::Redirect),
            "discover" => Ok(Mode::Discover),
            "rewrite" => Ok(Mode::Rewrite),
            _ => Err(()),
        }
    }
}

/// Database engine that actually executes the statements in redirect mode.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgres,
    MariaDb,
}

impl Backend {
    /// Connect string prefix used by the backend's own driver.
    pub fn prefix(&self) -> &'static str {
        match self {
            Backend::Postgres => "jdbc:postgresql://",
            Backend::MariaDb => "jdbc:mariadb://",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Backend::Postgres => "postgres",
            Backend::MariaDb => "mariadb",
        };
        f.write_str(value)
    }
}

impl FromStr for Backend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "mariadb" => Ok(Backend::MariaDb),
            _ => Err(()),
        }
    }
}

/// On-disk format of the mapping resource.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MappingFormat {
    /// Human-editable YAML table, one entry per source statement (default).
    #[default]
    Table,
    /// Binary key/text map produced by `sqlforward compile`.
    Map,
}

impl fmt::Display for MappingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            MappingFormat::Table => "table",
            MappingFormat::Map => "map",
        };
        f.write_str(value)
    }
}

impl FromStr for MappingFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(MappingFormat::Table),
            "map" => Ok(MappingFormat::Map),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("redirect".parse(), Ok(Mode::Redirect));
        assert_eq!("DISCOVER".parse(), Ok(Mode::Discover));
        assert_eq!("rewrite".parse(), Ok(Mode::Rewrite));
        assert!("probe".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Redirect);
    }

    #[test]
    fn test_mode_flags() {
        assert!(Mode::Redirect.translates());
        assert!(Mode::Rewrite.translates());
        assert!(!Mode::Discover.translates());

        assert!(!Mode::Redirect.keeps_target());
        assert!(Mode::Discover.keeps_target());
        assert!(Mode::Rewrite.keeps_target());
    }

    #[test]
    fn test_display_round_trips() {
        for mode in [Mode::Redirect, Mode::Discover, Mode::Rewrite] {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
        for backend in [Backend::Postgres, Backend::MariaDb] {
            assert_eq!(backend.to_string().parse(), Ok(backend));
        }
        for format in [MappingFormat::Table, MappingFormat::Map] {
            assert_eq!(format.to_string().parse(), Ok(format));
        }
    }
}
