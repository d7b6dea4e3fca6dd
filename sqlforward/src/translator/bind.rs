//! Named bind markers.
//!
//! The backend only understands positional parameters, so every `:name`
//! in the statement becomes one ordinal position. A name used three times
//! takes three positions, and the value bound to it is copied into all of them.
//!
//! Scanning is lexical. Markers inside string literals and comments are
//! picked up like any other marker.
use indexmap::IndexMap;
use serde::Serialize;

use super::Error;

/// Ordinal positions of each named marker in a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindMap {
    original: String,
    translated: String,
    markers: IndexMap<String, Vec<usize>>,
    parameters: usize,
}

impl BindMap {
    /// Scan a statement that is sent to the backend as-is.
    pub fn scan(statement: &str) -> Self {
        Self::new(statement, statement)
    }

    /// Scan the translated statement. Positions always refer to
    /// the statement the backend actually receives.
    pub fn new(original: &str, translated: &str) -> Self {
        let mut markers: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut parameters = 0;

        let bytes = translated.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            if bytes[pos] != b':' {
                pos += 1;
                continue;
            }

            // :: is a cast.
            if bytes.get(pos + 1) == Some(&b':') {
                while bytes.get(pos) == Some(&b':') {
                    pos += 1;
                }
                continue;
            }

            let start = pos + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }

            if end > start {
                parameters += 1;
                markers
                    .entry(translated[start..end].to_owned())
                    .or_default()
                    .push(parameters);
            }

            pos = end;
        }

        Self {
            original: original.to_owned(),
            translated: translated.to_owned(),
            markers,
            parameters,
        }
    }

    /// Statement as submitted by the client.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Statement sent to the backend.
    pub fn translated(&self) -> &str {
        &self.translated
    }

    /// Ordinal positions (1-based) taken by a marker.
    pub fn positions(&self, name: &str) -> Option<&[usize]> {
        self.markers.get(name).map(|positions| positions.as_slice())
    }

    /// Marker names, in the order they first appear.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(|name| name.as_str())
    }

    /// Markers and their positions, in the order they first appear.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.markers
            .iter()
            .map(|(name, positions)| (name.as_str(), positions.as_slice()))
    }

    /// Total number of positional parameters.
    pub fn parameters(&self) -> usize {
        self.parameters
    }

    /// The statement has no named markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Start binding values by name.
    pub fn binds<V: Clone>(&self) -> Binds<'_, V> {
        Binds {
            map: self,
            slots: vec![None; self.parameters],
        }
    }
}

/// Values bound by name, laid out by position.
#[derive(Debug)]
pub struct Binds<'a, V> {
    map: &'a BindMap,
    slots: Vec<Option<V>>,
}

impl<V: Clone> Binds<'_, V> {
    /// Bind a value to every position taken by the marker.
    pub fn set(&mut self, name: &str, value: V) -> Result<(), Error> {
        let positions = self
            .map
            .positions(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_owned()))?;

        for position in positions {
            self.slots[position - 1] = Some(value.clone());
        }

        Ok(())
    }

    /// Value currently bound to the marker.
    pub fn get(&self, name: &str) -> Option<&V> {
        let position = self.map.positions(name)?.first()?;
        self.slots[position - 1].as_ref()
    }

    /// Positional values, ready for the backend.
    pub fn finish(self) -> Result<Vec<V>, Error> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, value)| value.ok_or(Error::UnboundParameter(index + 1)))
            .collect()
    }
}
