use crate::database::{Database, ParseError};

pub mod bibtex;

/// Turns the raw bytes of a bibliography file into entries.
///
/// Implementations only parse; cross-references are resolved by [`load`].
pub trait BibParser {
    fn parse(&self, source: &[u8]) -> Result<Database, ParseError>;
}

/// Parse `source` with `parser` and resolve cross-references.
pub fn load(parser: &impl BibParser, source: &[u8]) -> Result<Database, ParseError> {
    let mut db = parser.parse(source)?;
    db.resolve_crossrefs()?;
    Ok(db)
}
