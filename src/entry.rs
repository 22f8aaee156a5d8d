use std::collections::BTreeMap;

/// A person credited on an entry, split the way BibTeX splits names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Author {
    pub given: String,
    /// The "von" part, e.g. `van der` in `Johannes van der Waals`.
    pub prefix: String,
    pub family: String,
    pub suffix: String,
}

impl Author {
    pub fn new(given: impl Into<String>, family: impl Into<String>) -> Self {
        Author {
            given: given.into(),
            family: family.into(),
            ..Default::default()
        }
    }

    /// `Given von Family, Suffix`, with empty parts left out.
    pub fn display_name(&self) -> String {
        let mut name = [&self.given, &self.prefix, &self.family]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if !self.suffix.is_empty() {
            name.push_str(", ");
            name.push_str(&self.suffix);
        }
        name
    }

    /// `von Family, Suffix, Given`, the form BibTeX reads back unambiguously.
    fn bibtex_name(&self) -> String {
        let mut last = [&self.prefix, &self.family]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if !self.suffix.is_empty() {
            last.push_str(", ");
            last.push_str(&self.suffix);
        }
        if self.given.is_empty() {
            last
        } else {
            format!("{last}, {}", self.given)
        }
    }
}

/// One bibliographic record.
///
/// Field names are stored lower-cased; values are plain strings as handed over by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    key: String,
    entry_type: String,
    fields: BTreeMap<String, String>,
    authors: Vec<Author>,
    source: Option<String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Entry {
            key: key.into(),
            entry_type: entry_type.into().to_lowercase(),
            fields: BTreeMap::new(),
            authors: Vec::new(),
            source: None,
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_lowercase())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn set_authors(&mut self, authors: Vec<Author>) {
        self.authors = authors;
    }

    /// Keep the entry's text exactly as it appeared in the database.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// BibTeX shown in the Cite block: the original source when the parser kept it, the
    /// re-serialized fields otherwise.
    pub fn cite_text(&self) -> String {
        match &self.source {
            Some(source) => source.clone(),
            None => self.to_bibtex(),
        }
    }

    /// Render the entry back to BibTeX source.
    ///
    /// Months are written as they were given rather than as macros, and lines are never wrapped.
    /// When the entry carries parsed authors but no raw `author` field, the field is rebuilt
    /// from the authors.
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{},\n", self.entry_type, self.key);
        if !self.fields.contains_key("author") && !self.authors.is_empty() {
            let names = self
                .authors
                .iter()
                .map(Author::bibtex_name)
                .collect::<Vec<_>>()
                .join(" and ");
            out.push_str(&format!("  author = {{{names}}},\n"));
        }
        for (name, value) in &self.fields {
            out.push_str(&format!("  {name} = {{{value}}},\n"));
        }
        out.push_str("}\n");
        out
    }
}
