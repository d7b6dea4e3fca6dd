//! Statement translation.
//!
//! Statements are looked up by their exact text in a mapping loaded once
//! at startup. Statements without an entry are sent to the backend unchanged.
//!
//! If the exact text isn't in the mapping, the statement's fingerprint is
//! tried instead. This lets a probe file, which is keyed by fingerprint, be
//! edited into a mapping without copying every statement into a key.

use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use sqlforward_config::{MappingFormat, MappingLocation};
use tracing::{debug, warn};

use crate::fingerprint::Fingerprint;

pub mod bind;
pub mod error;
pub mod store;

pub use bind::{BindMap, Binds};
pub use error::Error;
pub use store::{Lookup, Store};

static TRANSLATOR: OnceCell<Arc<Translator>> = OnceCell::new();

/// Translator statistics.
#[derive(Debug, Default)]
pub struct Stats {
    /// Statements found in the mapping.
    hits: AtomicUsize,
    /// Statements passed through unchanged.
    misses: AtomicUsize,
}

impl Stats {
    pub fn hits(&self) -> usize {
        self.hits.load(Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Relaxed)
    }
}

/// Statement translator.
#[derive(Debug)]
pub struct Translator {
    store: Box<dyn Lookup>,
    location: Option<MappingLocation>,
    stats: Stats,
}

impl Translator {
    /// Create a translator backed by a store.
    pub fn new(store: impl Lookup + 'static) -> Self {
        Self {
            store: Box::new(store),
            location: None,
            stats: Stats::default(),
        }
    }

    /// Load the mapping resource.
    pub fn load(location: &MappingLocation, format: MappingFormat) -> Result<Self, Error> {
        let path = location.path()?;
        let store = Store::load(&path, format)?;

        Ok(Self {
            location: Some(location.clone()),
            ..Self::new(store)
        })
    }

    /// Get the translator shared by all connections, loading it
    /// on first use. Only one caller ever loads the mapping;
    /// everyone else waits for it.
    pub fn shared(location: &MappingLocation, format: MappingFormat) -> Result<Arc<Self>, Error> {
        let translator =
            TRANSLATOR.get_or_try_init(|| Self::load(location, format).map(Arc::new))?;

        if translator.location.as_ref() != Some(location) {
            warn!(
                "mapping \"{}\" ignored, translator already loaded from \"{}\"",
                location,
                translator
                    .location
                    .as_ref()
                    .map(|location| location.to_string())
                    .unwrap_or_default()
            );
        }

        Ok(translator.clone())
    }

    /// Translate a statement, or return it unchanged if
    /// the mapping doesn't have it.
    pub fn translate<'a>(&'a self, statement: &'a str) -> &'a str {
        if let Some(replacement) = self.store.lookup(statement) {
            self.stats.hits.fetch_add(1, Relaxed);
            debug!("statement translated by text");
            return replacement;
        }

        let fingerprint = Fingerprint::new(statement);
        if let Some(replacement) = self.store.lookup(&fingerprint.id()) {
            self.stats.hits.fetch_add(1, Relaxed);
            debug!("statement translated by fingerprint [{}]", fingerprint);
            return replacement;
        }

        self.stats.misses.fetch_add(1, Relaxed);
        statement
    }

    /// Translate a statement and map its named markers
    /// to positions in the translated text.
    pub fn translate_and_bind(&self, statement: &str) -> BindMap {
        BindMap::new(statement, self.translate(statement))
    }

    /// Translator statistics.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of statements in the mapping.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::thread;

    use super::*;

    fn translator() -> Translator {
        Translator::new(
            [
                ("SELECT 1 FROM DUAL", "SELECT 1"),
                (
                    "SELECT ename FROM emp WHERE deptno = :dept AND ROWNUM <= :n",
                    "SELECT ename FROM emp WHERE deptno = :dept LIMIT :n",
                ),
                (
                    "SELECT NVL(comm, :dflt) FROM emp WHERE empno = :id",
                    "SELECT COALESCE(comm, :dflt) FROM emp WHERE empno = :id OR mgr = :id",
                ),
            ]
            .into_iter()
            .collect::<Store>(),
        )
    }

    #[test]
    fn test_translate_hit() {
        let translator = translator();
        assert_eq!(translator.translate("SELECT 1 FROM DUAL"), "SELECT 1");
        assert_eq!(translator.stats().hits(), 1);
    }

    #[test]
    fn test_translate_miss_passes_through() {
        let translator = translator();
        for statement in ["SELECT 2 FROM DUAL", "", "DELETE FROM emp"] {
            let once = translator.translate(statement);
            assert_eq!(once, statement);
            assert_eq!(translator.translate(once), once);
        }
        assert_eq!(translator.stats().misses(), 6);
    }

    #[test]
    fn test_exact_text_only() {
        let translator = translator();
        for statement in [
            "select 1 from dual",
            "SELECT 1 FROM DUAL ",
            "SELECT  1 FROM DUAL",
            "SELECT 1\nFROM DUAL",
        ] {
            assert_eq!(translator.translate(statement), statement);
        }
    }

    #[test]
    fn test_translate_by_fingerprint() {
        let statement = "SELECT SYSDATE FROM DUAL";
        let translator = Translator::new(
            [(Fingerprint::new(statement).id(), "SELECT now()")]
                .into_iter()
                .collect::<Store>(),
        );
        assert_eq!(translator.translate(statement), "SELECT now()");
        assert_eq!(translator.translate("SELECT SYSDATE  FROM DUAL"), "SELECT SYSDATE  FROM DUAL");
    }

    #[test]
    fn test_bind_positions_follow_translation() {
        let translator = translator();
        let map = translator
            .translate_and_bind("SELECT NVL(comm, :dflt) FROM emp WHERE empno = :id");

        assert_eq!(
            map.original(),
            "SELECT NVL(comm, :dflt) FROM emp WHERE empno = :id"
        );
        assert_eq!(
            map.translated(),
            "SELECT COALESCE(comm, :dflt) FROM emp WHERE empno = :id OR mgr = :id"
        );
        assert_eq!(map.positions("dflt"), Some(&[1][..]));
        assert_eq!(map.positions("id"), Some(&[2, 3][..]));
    }

    #[test]
    fn test_bind_on_miss() {
        let translator = translator();
        let map = translator.translate_and_bind("UPDATE emp SET sal = :sal WHERE empno = :id");
        assert_eq!(map.original(), map.translated());
        assert_eq!(map.positions("sal"), Some(&[1][..]));
        assert_eq!(map.positions("id"), Some(&[2][..]));
    }

    #[test]
    fn test_load_from_location() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"SELECT 1 FROM DUAL\": \"SELECT 1\"").unwrap();

        let location = MappingLocation::from_path(file.path()).unwrap();
        let translator = Translator::load(&location, MappingFormat::Table).unwrap();
        assert_eq!(translator.len(), 1);
        assert_eq!(translator.translate("SELECT 1 FROM DUAL"), "SELECT 1");
    }

    #[test]
    fn test_load_object_store_fails() {
        let location = MappingLocation::new("s3://bucket/mapping.yaml").unwrap();
        assert!(matches!(
            Translator::load(&location, MappingFormat::Table),
            Err(Error::Config(sqlforward_config::Error::UnsupportedScheme(_)))
        ));
    }

    #[test]
    fn test_shared_is_loaded_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"SELECT 1 FROM DUAL\": \"SELECT 1\"").unwrap();
        let location = MappingLocation::from_path(file.path()).unwrap();

        let translators = thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| Translator::shared(&location, MappingFormat::Table)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap().unwrap())
                .collect::<Vec<_>>()
        });

        for translator in &translators {
            assert!(Arc::ptr_eq(translator, &translators[0]));
        }
        assert_eq!(translators[0].translate("SELECT 1 FROM DUAL"), "SELECT 1");
    }
}
