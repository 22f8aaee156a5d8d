use chrono::Month;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("unrecognised month `{0}`")]
    Unrecognized(String),
}

/// Turn a BibTeX month into a number.
///
/// The first three letters are matched case-insensitively against English month names, so
/// `Jan`, `jan` and `January` are all 1. Anything else must be a plain number, which is returned
/// as-is without range checking.
pub fn ordinal(value: &str) -> Result<u32, MonthError> {
    let prefix = value.chars().take(3).collect::<String>().to_lowercase();
    if let Ok(month) = prefix.parse::<Month>() {
        return Ok(month.number_from_month());
    }
    value
        .trim()
        .parse()
        .map_err(|_| MonthError::Unrecognized(value.to_string()))
}

/// Sort key for an optional month; entries without one get 0 and therefore sort last when
/// ordering newest first.
pub fn sort_key(month: Option<&str>) -> Result<u32, MonthError> {
    month.map_or(Ok(0), ordinal)
}
