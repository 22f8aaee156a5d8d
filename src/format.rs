//! Rendering of a single entry into an HTML fragment.
//!
//! The class names used here (`shortAuthors`, `longAuthors`, `bibhidden`, ...) are the contract
//! with the inlined stylesheet and script, which toggle them client-side.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use thiserror::Error;

use crate::{directory::AuthorDirectory, entry::Entry, tex};

pub const DOI_RESOLVER: &str = "https://dx.doi.org/";

/// Field holding the secondary PDF link shown next to the main one.
pub const PRELOGGING_URL_FIELD: &str = "prelogging.infourl";

/// How many authors the collapsed list shows.
pub const SHORT_AUTHOR_COUNT: usize = 5;

const DOI_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("entry `{key}` has no `{field}` field")]
    MissingField { key: String, field: &'static str },
}

pub fn doi_url(doi: &str) -> String {
    format!("{DOI_RESOLVER}{}", utf8_percent_encode(doi.trim(), DOI_ENCODE_SET))
}

/// Escape only `<` and `>`, enough to keep BibTeX source inert inside a `<pre>`.
pub fn escape_angle_brackets(source: &str) -> String {
    source.replace('<', "&lt;").replace('>', "&gt;")
}

/// Journal or booktitle in italics followed by volume, issue and pages.
///
/// Starts with `???` when the entry names neither a journal nor a book.
pub fn venue(entry: &Entry) -> String {
    let mut place = ["journal", "booktitle"]
        .into_iter()
        .find_map(|field| entry.get(field))
        .map_or_else(|| "???".to_string(), |name| format!("<i>{name}</i>"));
    if let Some(volume) = entry.get("volume") {
        place.push_str(", ");
        place.push_str(volume);
    }
    if let Some(issue) = entry.get("issue") {
        place.push_str(", ");
        place.push_str(issue);
    }
    if let Some(pages) = entry.get("pages") {
        place.push_str(", pp. ");
        place.push_str(pages);
    }
    tex::to_unicode(&place.replace("\\ ", " "))
}

/// Link buttons for whichever of `url`, the prelogging link and `doi` the entry has.
pub fn buttons(entry: &Entry) -> String {
    let mut out = String::new();
    if let Some(url) = entry.get("url") {
        out.push_str(&format!(r#" <a class="button" href="{url}">PDF</a>"#));
    }
    if let Some(url) = entry.get(PRELOGGING_URL_FIELD) {
        out.push_str(&format!(
            r#" <a class="button" href="{url}">Prelogging.info PDF</a>"#
        ));
    }
    if let Some(doi) = entry.get("doi") {
        out.push_str(&format!(
            r#" <a class="custombutton buttondoi" href="{}" target="_blank" rel="noopener noreferrer">DOI</a>"#,
            doi_url(doi)
        ));
    }
    out
}

pub struct Formatter<'a> {
    directory: &'a AuthorDirectory,
}

impl<'a> Formatter<'a> {
    pub fn new(directory: &'a AuthorDirectory) -> Self {
        Formatter { directory }
    }

    /// Display names of the entry's authors, linked to their homepage when the directory knows
    /// them.
    pub fn authors(&self, entry: &Entry) -> Vec<String> {
        entry
            .authors()
            .iter()
            .map(|author| {
                let name = tex::to_unicode(&author.display_name());
                match self.directory.homepage(&name) {
                    Some(homepage) => format!(r#"<a target="_blank" href="{homepage}">{name}</a>"#),
                    None => name,
                }
            })
            .collect()
    }

    /// Render `entry`, with its title linking to the DOI.
    pub fn render(&self, entry: &Entry) -> Result<String, FormatError> {
        let doi = entry.get("doi").ok_or_else(|| FormatError::MissingField {
            key: entry.key().to_string(),
            field: "doi",
        })?;
        Ok(self.compose(entry, Some(doi_url(doi))))
    }

    /// Render an entry that lacks a DOI: the title links to `url` if there is one.
    pub fn render_without_doi(&self, entry: &Entry) -> String {
        self.compose(entry, entry.get("url").map(str::to_string))
    }

    fn compose(&self, entry: &Entry, main_url: Option<String>) -> String {
        let raw_title = entry.get("title").unwrap_or(entry.key());
        let title = tex::to_unicode(raw_title);
        let title = match main_url {
            Some(url) => {
                format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{title}</a>"#)
            }
            None => title,
        };

        let authors = self.authors(entry);
        let short_authors = authors
            .iter()
            .take(SHORT_AUTHOR_COUNT)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let all_authors = authors.join(", ");

        let mut html = String::new();
        html.push_str(&format!(
            "\n     <span class=\"title\">{title}</span>\n     <br>\n"
        ));
        html.push_str(&format!(
            "     <span class=\"shortAuthors\">{short_authors} <a class=\"button\" style=\"cursor: pointer;\" onClick=\"expandAuthors(this)\">(et al.)</a></span>\n"
        ));
        html.push_str(&format!(
            "     <span class=\"longAuthors\">{all_authors}<a class=\"button\" style=\"cursor: pointer;\" onClick=\"expandAuthors(this)\"> (collapse)</a></span>\n"
        ));
        html.push_str(&format!(
            "     <span class=\"journal\">{}</span>\n     <br>\n",
            venue(entry)
        ));
        html.push_str("     <span class=\"buttonline\">\n");
        html.push_str(
            "     <a class=\"custombutton\" style=\"cursor: pointer;\" onClick=\"showBibHere(this);\">Cite</a>\n",
        );
        html.push_str(&format!("     {}\n     </span>\n", buttons(entry)));
        let mut cite = escape_angle_brackets(&entry.cite_text());
        if !cite.ends_with('\n') {
            cite.push('\n');
        }
        html.push_str(&format!(
            "     <pre class=\"bibhidden\">\n{cite}</pre>\n    "
        ));
        html
    }
}
