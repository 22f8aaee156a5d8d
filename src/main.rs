use std::fs;

use anyhow::Context;
use clap::Parser;
use publist::{
    directory::AuthorDirectory,
    emit::{self, Assets, Emitter, Options},
    format::Formatter,
    group::YearGroups,
    log,
    parser::{self, BibParser, bibtex::BibtexParser},
};

use crate::cli::Cli;

mod cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    run(&args, &BibtexParser)
}

fn run(args: &Cli, parser: &impl BibParser) -> anyhow::Result<()> {
    let assets = Assets::load(&args.css, &args.js)?;
    let directory = match &args.authors {
        Some(path) => AuthorDirectory::load(path)
            .with_context(|| format!("failed to load authors from {}", path.display()))?,
        None => AuthorDirectory::new(),
    };

    let source = fs::read(&args.bibtex)
        .with_context(|| format!("failed to read {}", args.bibtex.display()))?;
    let db = parser::load(parser, &source)
        .with_context(|| format!("failed to parse {}", args.bibtex.display()))?;
    for warning in db.warnings() {
        log!(warn "load"; "{warning}");
    }
    log!("load"; "{} entries from {}", db.len(), args.bibtex.display());

    let groups = YearGroups::build(&db)?;
    let options = Options {
        front_matter: args.yaml,
        escape: args.escape,
        missing_doi: args.missing_doi,
    };
    let emitter = Emitter::new(Formatter::new(&directory), &assets, options);

    let progress = log::progress(groups.entry_count());
    let rendered = emitter.render(&groups, &progress);
    progress.finish_and_clear();
    let (html, report) = rendered?;

    for key in &report.skipped {
        log!(warn "render"; "skipped `{key}`: no doi");
    }
    for key in &report.placeholders {
        log!(warn "render"; "`{key}` has no doi, rendered without DOI link");
    }

    emit::write_atomic(&args.output, &html)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::summary(report.rendered, report.skipped.len(), args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use publist::{
        database::{Database, ParseError},
        entry::{Author, Entry},
    };
    use tempfile::TempDir;

    /// Hands back a fixed database, whatever the input bytes are.
    struct Canned(Vec<Entry>);

    impl BibParser for Canned {
        fn parse(&self, _: &[u8]) -> Result<Database, ParseError> {
            let mut db = Database::new();
            for entry in &self.0 {
                db.insert(entry.clone())?;
            }
            Ok(db)
        }
    }

    fn setup() -> (TempDir, Cli) {
        let dir = tempfile::tempdir().expect("tmp dir");
        for (name, body) in [("in.bib", ""), ("s.css", "p {}\n"), ("s.js", "// js\n")] {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let path = |name: &str| dir.path().join(name).display().to_string();
        let cli = Cli::try_parse_from([
            "publist".to_string(),
            "--css".into(),
            path("s.css"),
            "--js".into(),
            path("s.js"),
            "-o".into(),
            path("out.html"),
            path("in.bib"),
        ])
        .expect("parse");
        (dir, cli)
    }

    #[test]
    fn run_writes_rendered_entries() {
        let (dir, cli) = setup();
        let parser = Canned(vec![
            Entry::new("x", "article")
                .with_field("year", "2024")
                .with_field("title", "Injected")
                .with_field("booktitle", "Proc. Z")
                .with_field("doi", "10.5555/x")
                .with_authors(vec![Author::new("Grace", "Hopper")]),
        ]);
        run(&cli, &parser).unwrap();
        let html = fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert!(html.contains("<style>\np {}\n</style>"));
        assert!(html.contains("<i>Proc. Z</i>"));
        assert!(html.contains("Grace Hopper"));
    }

    #[test]
    fn run_fails_before_writing_on_missing_year() {
        let (dir, cli) = setup();
        let parser = Canned(vec![Entry::new("undated", "misc").with_field("doi", "10.1/u")]);
        let err = run(&cli, &parser).unwrap_err();
        assert!(err.to_string().contains("entry `undated` has no `year` field"));
        assert!(!dir.path().join("out.html").exists());
    }
}
