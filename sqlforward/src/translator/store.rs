//! Mapping stores.
//!
//! A store answers one question: what should this statement be
//! replaced with? Two on-disk formats are supported:
//!
//! * `table`: YAML, one entry per statement, human-editable,
//! * `map`: MessagePack-encoded map, produced by `sqlforward compile`.
//!
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::read;
use std::path::Path;

use sqlforward_config::MappingFormat;
use tracing::info;

use super::Error;

/// Key to replacement text lookup.
pub trait Lookup: Send + Sync + Debug {
    /// Replacement for the key, if any.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store, loaded once and never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    entries: HashMap<String, String>,
}

impl Store {
    /// Load a store from disk.
    pub fn load(path: &Path, format: MappingFormat) -> Result<Self, Error> {
        let bytes = read(path).map_err(|err| Error::load(path.display(), err))?;

        let store = match format {
            MappingFormat::Table => std::str::from_utf8(&bytes)
                .map_err(|err| Error::load(path.display(), err))
                .and_then(|source| {
                    Self::from_table(source).map_err(|err| Error::load(path.display(), err))
                }),
            MappingFormat::Map => {
                Self::from_map(&bytes).map_err(|err| Error::load(path.display(), err))
            }
        }?;

        info!(
            "loaded {} statements from \"{}\" [{}]",
            store.len(),
            path.display(),
            format
        );

        Ok(store)
    }

    /// Parse a YAML table.
    pub fn from_table(source: &str) -> Result<Self, serde_yaml::Error> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let entries: Option<HashMap<String, String>> = serde_yaml::from_str(source)?;
        Ok(Self {
            entries: entries.unwrap_or_default(),
        })
    }

    /// Decode a binary map.
    pub fn from_map(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        Ok(Self {
            entries: rmp_serde::from_slice(bytes)?,
        })
    }

    /// Encode as a binary map.
    pub fn to_map(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(&self.entries)
    }

    /// Add an entry.
    pub fn insert(&mut self, source: impl ToString, replacement: impl ToString) {
        self.entries
            .insert(source.to_string(), replacement.to_string());
    }

    /// Keys of all entries.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|key| key.as_str())
    }
}

impl Lookup for Store {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|value| value.as_str())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<S: ToString, R: ToString> FromIterator<(S, R)> for Store {
    fn from_iter<T: IntoIterator<Item = (S, R)>>(iter: T) -> Self {
        let mut store = Self::default();
        for (source, replacement) in iter {
            store.insert(source, replacement);
        }
        store
    }
}
