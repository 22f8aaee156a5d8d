use std::{collections::BTreeMap, fs, path::Path};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read author directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("author directory must be a JSON object mapping names to URLs")]
    NotAnObject,
    #[error("homepage for `{0}` must be a string")]
    NotAString(String),
}

/// Homepages of known authors, keyed by the display name the formatter renders.
#[derive(Clone, Debug, Default)]
pub struct AuthorDirectory {
    homepages: BTreeMap<String, String>,
}

impl AuthorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Parse `{"Ada Lovelace": "https://...", ...}`.
    pub fn from_json(text: &str) -> Result<Self, DirectoryError> {
        let Value::Object(map) = serde_json::from_str::<Value>(text)? else {
            return Err(DirectoryError::NotAnObject);
        };
        map.into_iter()
            .map(|(name, url)| match url {
                Value::String(url) => Ok((name, url)),
                _ => Err(DirectoryError::NotAString(name)),
            })
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, homepage: impl Into<String>) {
        self.homepages.insert(name.into(), homepage.into());
    }

    pub fn homepage(&self, name: &str) -> Option<&str> {
        self.homepages.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.homepages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homepages.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuthorDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directory = Self::new();
        for (name, homepage) in iter {
            directory.insert(name, homepage);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_name_to_url_object() {
        let dir = AuthorDirectory::from_json(
            r#"{"Ada Lovelace": "https://ada.example", "Kurt Gödel": "https://kg.example"}"#,
        )
        .unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.homepage("Kurt Gödel"), Some("https://kg.example"));
        assert_eq!(dir.homepage("Nobody"), None);
    }

    #[test]
    fn rejects_non_objects_and_non_strings() {
        assert!(matches!(
            AuthorDirectory::from_json("[1, 2]"),
            Err(DirectoryError::NotAnObject)
        ));
        assert!(matches!(
            AuthorDirectory::from_json(r#"{"Ada": 3}"#),
            Err(DirectoryError::NotAString(name)) if name == "Ada"
        ));
        assert!(matches!(
            AuthorDirectory::from_json("{"),
            Err(DirectoryError::Json(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut tmp = NamedTempFile::new().expect("tmp file");
        write!(tmp, r#"{{"Alan Turing": "https://turing.example"}}"#).unwrap();
        let dir = AuthorDirectory::load(tmp.path()).unwrap();
        assert_eq!(dir.homepage("Alan Turing"), Some("https://turing.example"));
    }

    #[test]
    fn collects_from_pairs() {
        let dir: AuthorDirectory = [("A", "https://a.example")].into_iter().collect();
        assert!(!dir.is_empty());
        assert_eq!(dir.homepage("A"), Some("https://a.example"));
    }
}
