use std::{fs, io, io::Write, path::Path};

use anyhow::Context;
use indicatif::ProgressBar;
use tempfile::NamedTempFile;

use crate::{
    format::{FormatError, Formatter},
    group::YearGroups,
};

/// Jekyll front-matter for the generated page.
pub const FRONT_MATTER: &str = "---\nlayout: archive\ntitle: \"Publications\"\npermalink: /publications/\nauthor_profile: true\n---\n";

/// Liquid markers that stop the templating engine from touching the fragment.
pub const ESCAPE_START: &str = "{% raw %}";
pub const ESCAPE_END: &str = "{% endraw %}";

/// Credits the projects this page layout comes from.
const FOOTER: &str = concat!(
    "\n <div class=\"footnotecomment\">\n",
    "  generated by <a target=\"_blank\" rel=\"noopener noreferrer\" ",
    "href=\"https://github.com/rlaker/publications-for-website\">publications-for-website</a>",
    " which was forked from <a target=\"_blank\" rel=\"noopener noreferrer\" ",
    "href=\"https://github.com/t-wissmann/publistgen\">t-wissmann</a>\n",
    " </div>\n</div> <!-- end of publicationlist -->\n",
);

/// What to do with an entry that has no DOI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingDoi {
    /// Stop and write nothing
    #[default]
    Abort,
    /// Leave the entry out
    Skip,
    /// Render it without the DOI link
    Placeholder,
}

/// Stylesheet and script inlined at the top of the fragment.
#[derive(Clone, Debug, Default)]
pub struct Assets {
    pub css: String,
    pub js: String,
}

impl Assets {
    pub fn load(css: &Path, js: &Path) -> anyhow::Result<Self> {
        Ok(Assets {
            css: fs::read_to_string(css)
                .with_context(|| format!("failed to read stylesheet {}", css.display()))?,
            js: fs::read_to_string(js)
                .with_context(|| format!("failed to read script {}", js.display()))?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    pub front_matter: bool,
    pub escape: bool,
    pub missing_doi: MissingDoi,
}

/// Entries that did not render normally.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub rendered: usize,
    pub skipped: Vec<String>,
    pub placeholders: Vec<String>,
}

pub struct Emitter<'a> {
    formatter: Formatter<'a>,
    assets: &'a Assets,
    options: Options,
}

impl<'a> Emitter<'a> {
    pub fn new(formatter: Formatter<'a>, assets: &'a Assets, options: Options) -> Self {
        Emitter {
            formatter,
            assets,
            options,
        }
    }

    /// Build the whole document in memory.
    ///
    /// Under [`MissingDoi::Abort`] the first entry without a DOI fails the render and nothing is
    /// returned.
    pub fn render(
        &self,
        groups: &YearGroups<'_>,
        progress: &ProgressBar,
    ) -> Result<(String, Report), FormatError> {
        let mut out = String::new();
        let mut report = Report::default();

        if self.options.front_matter {
            out.push_str(FRONT_MATTER);
        }
        if self.options.escape {
            out.push_str(ESCAPE_START);
            out.push('\n');
        }
        out.push_str("<div class=\"publicationlist\">\n");
        out.push_str(&format!("<style>\n{}</style>\n", self.assets.css));
        out.push_str(&format!("<script>\n{}</script>\n", self.assets.js));

        for (year, entries) in groups.iter() {
            out.push_str(&format!("<h3>{year}</h3>\n"));
            out.push_str("<table cellspacing=\"0\" class=\"yeartable\">\n");
            for entry in entries {
                progress.set_message(entry.key().to_string());
                let html = match self.formatter.render(entry) {
                    Ok(html) => html,
                    Err(err) => match self.options.missing_doi {
                        MissingDoi::Abort => return Err(err),
                        MissingDoi::Skip => {
                            report.skipped.push(entry.key().to_string());
                            progress.inc(1);
                            continue;
                        }
                        MissingDoi::Placeholder => {
                            report.placeholders.push(entry.key().to_string());
                            self.formatter.render_without_doi(entry)
                        }
                    },
                };
                out.push_str(&format!(
                    "\n<tr id=\"{}\">\n <td class=\"bibitemtext\" valign=\"center\">{html}</td>\n</tr>\n",
                    entry.key()
                ));
                report.rendered += 1;
                progress.inc(1);
            }
            out.push_str("</table>\n");
        }

        out.push_str(FOOTER);
        if self.options.escape {
            out.push_str(ESCAPE_END);
            out.push('\n');
        }
        Ok((out, report))
    }
}

/// Replace `path` with `contents` in one step, via a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
