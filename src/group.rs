use std::{cmp::Ordering, collections::BTreeMap};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    entry::Entry,
    month::{self, MonthError},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("entry `{0}` has no `year` field")]
    MissingYear(String),
    #[error("entry `{key}`: {source}")]
    Month {
        key: String,
        #[source]
        source: MonthError,
    },
}

/// Entries bucketed by year, newest year first and newest month first within a year.
#[derive(Debug)]
pub struct YearGroups<'a> {
    groups: Vec<(String, Vec<&'a Entry>)>,
}

impl<'a> YearGroups<'a> {
    /// Bucket `entries` by their `year` field.
    ///
    /// Years are compared as exact strings. Within a year the order is by descending month, and
    /// entries sharing a month keep the order they were given in.
    pub fn build(entries: impl IntoIterator<Item = &'a Entry>) -> Result<Self, GroupError> {
        let mut buckets: BTreeMap<String, Vec<(u32, &'a Entry)>> = BTreeMap::new();
        for entry in entries {
            let year = year_of(entry).ok_or_else(|| GroupError::MissingYear(entry.key().into()))?;
            let month = month::sort_key(entry.get("month")).map_err(|source| GroupError::Month {
                key: entry.key().into(),
                source,
            })?;
            buckets.entry(year).or_default().push((month, entry));
        }

        let mut groups: Vec<(String, Vec<&'a Entry>)> = buckets
            .into_iter()
            .map(|(year, mut members)| {
                // stable, so equal months stay in source order
                members.sort_by(|a, b| b.0.cmp(&a.0));
                (year, members.into_iter().map(|(_, e)| e).collect())
            })
            .collect();
        groups.sort_by(|a, b| newest_year_first(&a.0, &b.0));
        Ok(YearGroups { groups })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Entry])> {
        self.groups
            .iter()
            .map(|(year, entries)| (year.as_str(), entries.as_slice()))
    }

    pub fn get(&self, year: &str) -> Option<&[&'a Entry]> {
        self.groups
            .iter()
            .find(|(y, _)| y == year)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(year, _)| year.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|(_, entries)| entries.len()).sum()
    }
}

/// The `year` field, or the leading year of a BibLaTeX `date` when `year` is absent.
fn year_of(entry: &Entry) -> Option<String> {
    static DATE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d{4})").unwrap());

    entry.get("year").map(str::to_string).or_else(|| {
        let date = entry.get("date")?;
        DATE_YEAR_RE
            .captures(date)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Numeric years descending, then anything non-numeric in descending string order.
fn newest_year_first(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x).then_with(|| b.cmp(a)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => b.cmp(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, year: &str) -> Entry {
        Entry::new(key, "article").with_field("year", year)
    }

    fn keys(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|e| e.key().to_string()).collect()
    }

    #[test]
    fn groups_by_year_newest_first() {
        let entries = [entry("e1", "2020"), entry("e2", "2019"), entry("e3", "2020")];
        let groups = YearGroups::build(&entries).unwrap();
        assert_eq!(groups.years().collect::<Vec<_>>(), ["2020", "2019"]);
        assert_eq!(keys(groups.get("2020").unwrap()), ["e1", "e3"]);
        assert_eq!(keys(groups.get("2019").unwrap()), ["e2"]);
        assert_eq!(groups.entry_count(), 3);
    }

    #[test]
    fn months_descending_with_missing_last() {
        let entries = [
            entry("none", "2021"),
            entry("mar", "2021").with_field("month", "mar"),
            entry("dec", "2021").with_field("month", "December"),
            entry("jul", "2021").with_field("month", "7"),
        ];
        let groups = YearGroups::build(&entries).unwrap();
        assert_eq!(keys(groups.get("2021").unwrap()), ["dec", "jul", "mar", "none"]);
    }

    #[test]
    fn years_are_not_normalized() {
        let entries = [entry("a", "2020"), entry("b", " 2020")];
        let groups = YearGroups::build(&entries).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn numeric_years_sort_numerically_before_others() {
        let entries = [
            entry("a", "999"),
            entry("b", "in press"),
            entry("c", "2020"),
            entry("d", "forthcoming"),
        ];
        let groups = YearGroups::build(&entries).unwrap();
        assert_eq!(
            groups.years().collect::<Vec<_>>(),
            ["2020", "999", "in press", "forthcoming"]
        );
    }

    #[test]
    fn date_field_stands_in_for_year() {
        let entries = [Entry::new("d", "online").with_field("date", "2018-04-01")];
        let groups = YearGroups::build(&entries).unwrap();
        assert_eq!(groups.years().collect::<Vec<_>>(), ["2018"]);
    }

    #[test]
    fn missing_year_and_bad_month_are_errors() {
        let err = YearGroups::build(&[Entry::new("x", "misc")]).unwrap_err();
        assert_eq!(err, GroupError::MissingYear("x".into()));

        let err = YearGroups::build(&[entry("y", "2020").with_field("month", "spring")]).unwrap_err();
        assert_eq!(err.to_string(), "entry `y`: unrecognised month `spring`");
    }

    #[test]
    fn same_month_keeps_source_order() {
        proptest::proptest!(|(specs in proptest::collection::vec((0u8..3, 0u8..4), 1..40))| {
            let years = ["2019", "2020", "2021"];
            let months = ["jan", "jun", "dec", ""];
            let entries: Vec<Entry> = specs
                .iter()
                .enumerate()
                .map(|(i, (y, m))| {
                    let e = entry(&format!("e{i:02}"), years[*y as usize]);
                    match months[*m as usize] {
                        "" => e,
                        month => e.with_field("month", month),
                    }
                })
                .collect();
            let groups = YearGroups::build(&entries).unwrap();

            let mut previous_year: Option<i64> = None;
            for (year, members) in groups.iter() {
                let year: i64 = year.parse().unwrap();
                if let Some(prev) = previous_year {
                    proptest::prop_assert!(prev > year);
                }
                previous_year = Some(year);

                for pair in members.windows(2) {
                    let a = month::sort_key(pair[0].get("month")).unwrap();
                    let b = month::sort_key(pair[1].get("month")).unwrap();
                    proptest::prop_assert!(a >= b);
                    if a == b {
                        // keys encode source position
                        proptest::prop_assert!(pair[0].key() < pair[1].key());
                    }
                }
            }
            proptest::prop_assert_eq!(groups.entry_count(), entries.len());
        })
    }
}
