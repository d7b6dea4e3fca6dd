//! Where the mapping resource lives.

use serde::{Deserialize, Serialize};
use std::env::current_dir;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use super::Error;

/// Object stores we recognize but can't read from (yet).
const OBJECT_STORES: &[&str] = &["s3", "gs", "az"];

/// Normalized mapping location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MappingLocation {
    url: Url,
}

impl MappingLocation {
    /// Normalize a location. Values without an explicit scheme
    /// are local paths and get the `file://` scheme.
    pub fn new(value: &str) -> Result<Self, Error> {
        if value.contains("://") {
            let url = Url::parse(value)?;
            if url.scheme() == "file" || OBJECT_STORES.contains(&url.scheme()) {
                Ok(Self { url })
            } else {
                Err(Error::UnsupportedScheme(url.scheme().to_owned()))
            }
        } else {
            Self::from_path(Path::new(value))
        }
    }

    /// Location of a local file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let path = if path.is_absolute() {
            path.to_owned()
        } else {
            current_dir()?.join(path)
        };

        let url = Url::from_file_path(&path)
            .map_err(|_| Error::UnsupportedScheme(path.display().to_string()))?;

        Ok(Self { url })
    }

    /// Location URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolve the location to a local path.
    ///
    /// Object store locations are accepted by the parser
    /// but can't be resolved.
    pub fn path(&self) -> Result<PathBuf, Error> {
        if self.url.scheme() != "file" {
            return Err(Error::UnsupportedScheme(self.url.scheme().to_owned()));
        }

        self.url
            .to_file_path()
            .map_err(|_| Error::UnsupportedScheme(self.url.to_string()))
    }
}

impl fmt::Display for MappingLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl From<MappingLocation> for String {
    fn from(value: MappingLocation) -> Self {
        value.url.to_string()
    }
}

impl TryFrom<String> for MappingLocation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_absolute_path_gets_file_scheme() {
        let location = MappingLocation::new("/opt/forward/mapping.yaml").unwrap();
        assert_eq!(location.to_string(), "file:///opt/forward/mapping.yaml");
        assert_eq!(
            location.path().unwrap(),
            PathBuf::from("/opt/forward/mapping.yaml")
        );
    }

    #[test]
    fn test_relative_path_is_resolved() {
        let location = MappingLocation::new("mapping.yaml").unwrap();
        assert_eq!(location.url().scheme(), "file");
        assert_eq!(
            location.path().unwrap(),
            current_dir().unwrap().join("mapping.yaml")
        );
    }

    #[test]
    fn test_explicit_file_scheme_is_kept() {
        let location = MappingLocation::new("file:///tmp/mapping.yaml").unwrap();
        assert_eq!(location.to_string(), "file:///tmp/mapping.yaml");
    }

    #[test]
    fn test_object_store_is_accepted_but_not_resolved() {
        let location = MappingLocation::new("s3://bucket/mapping.yaml").unwrap();
        assert_eq!(location.url().scheme(), "s3");
        assert!(matches!(
            location.path(),
            Err(Error::UnsupportedScheme(scheme)) if scheme == "s3"
        ));
    }

    #[test]
    fn test_other_schemes_are_rejected() {
        assert!(matches!(
            MappingLocation::new("https://example.com/mapping.yaml"),
            Err(Error::UnsupportedScheme(scheme)) if scheme == "https"
        ));
    }
}
