use std::path::PathBuf;

use clap::Parser;

use publist::emit::MissingDoi;

/// Generate a static publication list from BibTeX
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input BibTeX file
    #[arg(value_name = "BIBTEX")]
    pub bibtex: PathBuf,

    /// Output filename
    #[arg(long, short, default_value = "publications.html")]
    pub output: PathBuf,

    /// Wrap the output in {% raw %} markers so Jekyll leaves it alone
    #[arg(long, short)]
    pub escape: bool,

    /// Insert YAML front-matter for the page
    #[arg(long, short)]
    pub yaml: bool,

    /// Stylesheet inlined into the output
    #[arg(long, default_value = "pubs.css")]
    pub css: PathBuf,

    /// Script inlined into the output
    #[arg(long, default_value = "pubs.js")]
    pub js: PathBuf,

    /// JSON object mapping author names to homepage URLs
    #[arg(long, short)]
    pub authors: Option<PathBuf>,

    /// What to do with entries that have no DOI
    #[arg(long, value_enum, default_value_t = MissingDoi::Abort)]
    pub missing_doi: MissingDoi,
}
