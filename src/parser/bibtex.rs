use std::collections::HashMap;

use biblatex::{Bibliography, Chunk, Person, Spanned};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    database::{Database, ParseError},
    entry::{Author, Entry},
    parser::BibParser,
};

/// `@type{key,` or `@type(key,` at the head of an entry.
static ENTRY_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\s*[A-Za-z]+\s*([{(])\s*([^,\s{}()]+)\s*,").unwrap());

/// [`BibParser`] backed by the `biblatex` crate.
///
/// `@string` abbreviations, month macros and common accent commands are resolved by `biblatex`
/// itself; any TeX it leaves behind is kept in the field values as-is. Each entry also keeps its
/// own source text for the Cite block, so abbreviations and markup show up as the author wrote
/// them.
pub struct BibtexParser;

impl BibParser for BibtexParser {
    fn parse(&self, source: &[u8]) -> Result<Database, ParseError> {
        let text = std::str::from_utf8(source)?;
        let bib = Bibliography::parse(text).map_err(|e| ParseError::Syntax(e.to_string()))?;

        let sources = entry_sources(text);
        let mut db = Database::new();
        for raw in bib.iter() {
            let source = match sources.get(raw.key.as_str()) {
                Some(slice) => slice.to_string(),
                None => raw.to_biblatex_string(),
            };
            let mut entry =
                Entry::new(raw.key.as_str(), raw.entry_type.to_string()).with_source(source);
            for (name, chunks) in &raw.fields {
                entry.set(name, chunks_to_string(chunks));
            }
            match raw.author() {
                Ok(people) => entry.set_authors(people.iter().map(to_author).collect()),
                Err(e) if entry.contains("author") => {
                    db.warn(format!("{}: could not read authors: {e}", raw.key))
                }
                Err(_) => {}
            }
            db.insert(entry)?;
        }
        Ok(db)
    }
}

/// Source text of every entry, by key. The first occurrence of a key wins.
fn entry_sources(text: &str) -> HashMap<&str, &str> {
    let mut sources = HashMap::new();
    for head in ENTRY_HEAD.captures_iter(text) {
        let (Some(whole), Some(open), Some(key)) = (head.get(0), head.get(1), head.get(2)) else {
            continue;
        };
        if let Some(end) = closing_delimiter(text, open.start()) {
            sources
                .entry(key.as_str())
                .or_insert(&text[whole.start()..=end]);
        }
    }
    sources
}

/// Byte offset of the delimiter closing the one at `open`, skipping nested braces.
fn closing_delimiter(text: &str, open: usize) -> Option<usize> {
    let parens = text[open..].starts_with('(');
    let mut depth = 0usize;
    let mut escaped = false;
    for (offset, c) in text[open..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 && !parens {
                    return Some(open + offset);
                }
            }
            ')' if parens && depth == 0 && offset > 0 => return Some(open + offset),
            _ => {}
        }
    }
    None
}

/// Flatten a field. Math stays between `$` so it can be typeset later, and a dollar that
/// `biblatex` already unescaped in running text is escaped again so it is not read as math.
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        match &chunk.v {
            Chunk::Math(s) => {
                out.push('$');
                out.push_str(s);
                out.push('$');
            }
            Chunk::Verbatim(s) => out.push_str(s),
            Chunk::Normal(s) => {
                let mut prev = None;
                for c in s.chars() {
                    if c == '$' && prev != Some('\\') {
                        out.push('\\');
                    }
                    out.push(c);
                    prev = Some(c);
                }
            }
        }
    }
    out
}

fn to_author(person: &Person) -> Author {
    Author {
        given: person.given_name.clone(),
        prefix: person.prefix.clone(),
        family: person.name.clone(),
        suffix: person.suffix.clone(),
    }
}
