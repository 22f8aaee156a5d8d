//! Turn a BibTeX database into a static HTML publication list.
//!
//! Entries are loaded through a [`parser::BibParser`], bucketed by year in [`group`], rendered
//! one by one by [`format::Formatter`] and stitched into a single fragment by [`emit::Emitter`].

pub mod log;

pub mod database;
pub mod directory;
pub mod emit;
pub mod entry;
pub mod format;
pub mod group;
pub mod month;
pub mod parser;
pub mod tex;
