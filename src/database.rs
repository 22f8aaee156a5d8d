use std::collections::HashMap;

use thiserror::Error;

use crate::entry::Entry;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("bibliography is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("malformed bibliography: {0}")]
    Syntax(String),
    #[error("duplicate citation key `{0}`")]
    DuplicateKey(String),
    #[error("entry `{key}` cross-references unknown entry `{target}`")]
    UnknownCrossref { key: String, target: String },
}

/// Entries keyed by citation key, kept in the order they appear in the source.
#[derive(Clone, Debug, Default)]
pub struct Database {
    entries: Vec<Entry>,
    /// Citation key to position in `entries`.
    index: HashMap<String, usize>,
    warnings: Vec<String>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: Entry) -> Result<(), ParseError> {
        if self.index.contains_key(entry.key()) {
            return Err(ParseError::DuplicateKey(entry.key().to_string()));
        }
        self.index.insert(entry.key().to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a non-fatal problem noticed while parsing.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Merge every `crossref`'d parent into its children.
    ///
    /// A child receives each parent field it lacks, except `crossref` itself. The parent's `title`
    /// also becomes the child's `booktitle`, and a child without authors takes the parent's.
    /// Only one level is followed: parents are read as they were before resolution started.
    pub fn resolve_crossrefs(&mut self) -> Result<(), ParseError> {
        let mut links = Vec::new();
        for (child, entry) in self.entries.iter().enumerate() {
            let Some(target) = entry.get("crossref") else {
                continue;
            };
            let parent = *self
                .index
                .get(target)
                .ok_or_else(|| ParseError::UnknownCrossref {
                    key: entry.key().to_string(),
                    target: target.to_string(),
                })?;
            links.push((child, parent));
        }

        let mut parents: HashMap<usize, Entry> = HashMap::new();
        for &(_, parent) in &links {
            parents
                .entry(parent)
                .or_insert_with(|| self.entries[parent].clone());
        }

        for (child, parent) in links {
            let parent = &parents[&parent];
            let child = &mut self.entries[child];

            for (name, value) in parent.fields() {
                if name != "crossref" && !child.contains(name) {
                    child.set(name, value);
                }
            }
            if !child.contains("booktitle")
                && let Some(title) = parent.get("title")
            {
                child.set("booktitle", title);
            }
            if child.authors().is_empty() && !parent.authors().is_empty() {
                child.set_authors(parent.authors().to_vec());
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Author;

    fn db(entries: Vec<Entry>) -> Database {
        let mut db = Database::new();
        for e in entries {
            db.insert(e).expect("unique keys");
        }
        db
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let mut db = db(vec![Entry::new("a", "misc")]);
        let err = db.insert(Entry::new("a", "article")).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateKey(k) if k == "a"));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let db = db(vec![
            Entry::new("zeta", "misc"),
            Entry::new("alpha", "misc"),
            Entry::new("mu", "misc"),
        ]);
        let keys: Vec<_> = db.iter().map(Entry::key).collect();
        assert_eq!(keys, ["zeta", "alpha", "mu"]);
    }

    #[test]
    fn crossref_fills_missing_fields_only() {
        let mut db = db(vec![
            Entry::new("paper", "inproceedings")
                .with_field("crossref", "conf")
                .with_field("title", "Paper")
                .with_field("pages", "1-2"),
            Entry::new("conf", "proceedings")
                .with_field("title", "Proc. of Things")
                .with_field("year", "2019")
                .with_field("pages", "1-300")
                .with_authors(vec![Author::new("Ed", "Itor")]),
        ]);
        db.resolve_crossrefs().unwrap();

        let paper = db.get("paper").unwrap();
        assert_eq!(paper.get("title"), Some("Paper"));
        assert_eq!(paper.get("pages"), Some("1-2"));
        assert_eq!(paper.get("year"), Some("2019"));
        assert_eq!(paper.get("booktitle"), Some("Proc. of Things"));
        assert_eq!(paper.get("crossref"), Some("conf"));
        assert_eq!(paper.authors(), [Author::new("Ed", "Itor")]);

        // the parent itself is untouched
        assert_eq!(db.get("conf").unwrap().get("booktitle"), None);
    }

    #[test]
    fn crossref_keeps_existing_booktitle() {
        let mut db = db(vec![
            Entry::new("paper", "inproceedings")
                .with_field("crossref", "conf")
                .with_field("booktitle", "Own Venue"),
            Entry::new("conf", "proceedings").with_field("title", "Parent Venue"),
        ]);
        db.resolve_crossrefs().unwrap();
        assert_eq!(db.get("paper").unwrap().get("booktitle"), Some("Own Venue"));
    }

    #[test]
    fn crossref_to_unknown_key_fails() {
        let mut db = db(vec![Entry::new("paper", "article").with_field("crossref", "ghost")]);
        let err = db.resolve_crossrefs().unwrap_err();
        assert_eq!(
            err.to_string(),
            "entry `paper` cross-references unknown entry `ghost`"
        );
    }

    #[test]
    fn lookup_and_crossrefs_scale_with_large_databases() {
        const COUNT: usize = 20_000;
        let mut db = Database::new();
        db.insert(Entry::new("proc", "proceedings").with_field("year", "2001"))
            .unwrap();
        for i in 0..COUNT {
            let paper = Entry::new(format!("paper{i}"), "inproceedings").with_field("crossref", "proc");
            db.insert(paper).unwrap();
        }
        assert!(matches!(
            db.insert(Entry::new("paper7", "misc")),
            Err(ParseError::DuplicateKey(k)) if k == "paper7"
        ));

        db.resolve_crossrefs().unwrap();
        assert_eq!(db.len(), COUNT + 1);
        for i in (0..COUNT).step_by(997) {
            let entry = db.get(&format!("paper{i}")).unwrap();
            assert_eq!(entry.key(), format!("paper{i}"));
            assert_eq!(entry.get("year"), Some("2001"));
        }
        assert!(db.get("paper20000").is_none());
    }
}
