//! Calendar resolution of the shared x axis.
//!
//! Axis labels print only day and month ("Sun Feb 16"); the year comes from
//! the report's emission date. The first and last labels bound an inclusive
//! range of days, numbered from 1.

use std::sync::OnceLock;

use chrono::format::{Parsed, StrftimeItems, parse};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use regex::Regex;

use crate::error::{ChartError, Result};
use crate::text::PlotSummary;

/// Accepted layouts, tried in order once ordinal suffixes and commas are
/// dropped. `%B` and `%A` take full or abbreviated names.
const DATE_FORMATS: [&str; 3] = ["%B %d %Y", "%A %B %d %Y", "%d %B %Y"];

fn ordinal_regex() -> &'static Regex {
    static ORDINAL_RE: OnceLock<Regex> = OnceLock::new();
    ORDINAL_RE.get_or_init(|| Regex::new(r"(\d)(?:st|nd|rd|th)\b").unwrap())
}

/// Parses loosely formatted dates such as `March 29, 2020`,
/// `Sun Feb 16 2020` or `24 April 2020`.
///
/// A leading weekday name is read but not checked against the date: axis
/// labels get their year from the emission date, which can be the wrong
/// year for the weekday until a New Year crossing is resolved.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let cleaned = ordinal_regex()
        .replace_all(text.trim(), "$1")
        .replace(',', " ");
    DATE_FORMATS
        .iter()
        .find_map(|layout| {
            let mut parsed = Parsed::new();
            parse(&mut parsed, &cleaned, StrftimeItems::new(layout)).ok()?;
            NaiveDate::from_ymd_opt(parsed.year()?, parsed.month()?, parsed.day()?)
        })
        .ok_or_else(|| ChartError::DateParse(text.to_string()))
}

/// Bijection between 1-based day indices and calendar dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateIndexTable {
    dates: Vec<NaiveDate>,
}

impl DateIndexTable {
    /// Every day from `first` to `last` inclusive.
    pub fn from_range(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        if last < first {
            return Err(ChartError::DateParse(format!("{last} precedes {first}")));
        }
        let days = (last - first).num_days() as usize + 1;
        Ok(Self {
            dates: first.iter_days().take(days).collect(),
        })
    }

    /// Builds the table from the emission date and one chart's axis labels.
    ///
    /// A range whose first label falls after its last is taken to cross New
    /// Year and starts in the previous year.
    pub fn resolve<S: AsRef<str>>(emission_date: &str, xlabels: &[S]) -> Result<Self> {
        let (Some(first), Some(last)) = (xlabels.first(), xlabels.last()) else {
            return Err(ChartError::MissingDateAxis);
        };
        let year = parse_date(emission_date)?.year();
        let mut start = parse_date(&format!("{} {year}", first.as_ref()))?;
        let end = parse_date(&format!("{} {year}", last.as_ref()))?;
        if start > end {
            tracing::warn!(%start, %end, "axis crosses New Year");
            start = start
                .with_year(year - 1)
                .ok_or_else(|| ChartError::DateParse(first.as_ref().to_string()))?;
        }
        Self::from_range(start, end)
    }

    /// Builds the table from a report's summaries, which must all share
    /// one (emission date, axis labels) pair.
    pub fn from_summaries(summaries: &[PlotSummary]) -> Result<Self> {
        let pairs: Vec<(&str, &[String])> = summaries
            .iter()
            .map(|s| (s.date_string.as_str(), s.xlabels.as_slice()))
            .unique()
            .collect();
        match pairs.as_slice() {
            [] => Err(ChartError::MissingDateAxis),
            [(date, xlabels)] => Self::resolve(date, *xlabels),
            _ => Err(ChartError::NonUniqueDateAxis { count: pairs.len() }),
        }
    }

    /// Rebuilds a table from `(index, date)` rows, e.g. a stored lookup file.
    /// Indices must run densely from 1.
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, NaiveDate)>) -> Result<Self> {
        let mut entries: Vec<(u32, NaiveDate)> = entries.into_iter().collect();
        entries.sort_by_key(|(index, _)| *index);
        for (expected, (index, _)) in (1u32..).zip(&entries) {
            if *index != expected {
                return Err(ChartError::DateParse(format!(
                    "lookup index {index} where {expected} was expected"
                )));
            }
        }
        Ok(Self {
            dates: entries.into_iter().map(|(_, date)| date).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date of a 1-based day index.
    pub fn get(&self, day_index: u32) -> Option<NaiveDate> {
        let i = usize::try_from(day_index).ok()?.checked_sub(1)?;
        self.dates.get(i).copied()
    }

    /// `(day_index, date)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (1u32..).zip(self.dates.iter().copied())
    }

    /// Logs a warning when the table does not cover `xspan + 1` days.
    pub fn check_span(&self, xspan: u32) -> bool {
        let expected = xspan as usize + 1;
        if self.len() != expected {
            tracing::warn!(days = self.len(), expected, "date table does not match the x axis span");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("March 29, 2020").unwrap(), date(2020, 3, 29));
        assert_eq!(parse_date("Sun Feb 16 2020").unwrap(), date(2020, 2, 16));
        assert_eq!(parse_date("24 April 2020").unwrap(), date(2020, 4, 24));
        assert_eq!(parse_date("Sun March 8 2020").unwrap(), date(2020, 3, 8));
        assert_eq!(parse_date("May 1st, 2020").unwrap(), date(2020, 5, 1));
        assert_eq!(parse_date("Feb 16 2020").unwrap(), date(2020, 2, 16));
    }

    #[test]
    fn test_weekday_is_not_checked() {
        // 2021-12-27 is a Monday
        assert_eq!(parse_date("Sun Dec 27 2021").unwrap(), date(2021, 12, 27));
    }

    #[test]
    fn test_parse_date_rejects() {
        assert!(parse_date("Feb 30 2020").is_err());
        assert!(parse_date("Soon 16 2020").is_err());
        assert!(parse_date("February").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_resolve_axis() {
        let table = DateIndexTable::resolve("March 29, 2020", &["Sun Feb 16", "Sun March 29"]).unwrap();
        assert_eq!(table.len(), 43);
        assert_eq!(table.get(1), Some(date(2020, 2, 16)));
        assert_eq!(table.get(43), Some(date(2020, 3, 29)));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(44), None);
        assert!(table.check_span(42));
    }

    #[test]
    fn test_new_year_crossing() {
        let table = DateIndexTable::resolve("January 26, 2021", &["Sun Dec 27", "Tue Jan 26"]).unwrap();
        assert_eq!(table.get(1), Some(date(2020, 12, 27)));
        assert_eq!(table.len(), 31);
    }

    #[test]
    fn test_from_entries_requires_dense_indices() {
        let table = DateIndexTable::from_entries([(2, date(2020, 1, 2)), (1, date(2020, 1, 1))]).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), [(1, date(2020, 1, 1)), (2, date(2020, 1, 2))]);
        assert!(DateIndexTable::from_entries([(1, date(2020, 1, 1)), (3, date(2020, 1, 3))]).is_err());
    }
}
