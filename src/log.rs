//! Status lines on stderr.
//!
//! Every line carries a bracketed stage prefix, e.g. `[load] 12 entries from refs.bib`. Colour
//! follows owo-colors' stderr detection, so `NO_COLOR` and pipes get plain text.

use std::fmt::Display;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::{OwoColorize, Stream::Stderr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

/// Log a message under a stage prefix.
///
/// ```ignore
/// log!("render"; "{} entries", count);
/// log!(warn "render"; "skipped {}", key);
/// ```
#[macro_export]
macro_rules! log {
    (warn $stage:expr; $($arg:tt)*) => {{
        $crate::log::line($crate::log::Level::Warn, $stage, &format!($($arg)*))
    }};
    ($stage:expr; $($arg:tt)*) => {{
        $crate::log::line($crate::log::Level::Info, $stage, &format!($($arg)*))
    }};
}

pub fn line(level: Level, stage: &str, message: &str) {
    let prefix = format!("[{stage}]");
    match level {
        Level::Info => eprintln!(
            "{} {message}",
            prefix.if_supports_color(Stderr, |p| p.cyan())
        ),
        Level::Warn => eprintln!(
            "{} {}",
            prefix.if_supports_color(Stderr, |p| p.yellow()),
            message.if_supports_color(Stderr, |m| m.yellow())
        ),
    }
}

/// `✓ <ok> ✗ <failed>`, green and red.
pub fn summary(ok: usize, failed: usize, destination: impl Display) {
    eprintln!(
        "{} {} {}",
        format!("✓ {ok}").if_supports_color(Stderr, |s| s.green()),
        format!("✗ {failed}").if_supports_color(Stderr, |s| s.red()),
        destination
    );
}

/// Progress over `total` entries; draws nothing unless stderr is a terminal.
pub fn progress(total: usize) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("[render] {bar:30} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}
