//! Comparison of a run's full records against a previous run.

use std::fmt;

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::records::FullRecord;

type RecordKey = (Option<u32>, usize, Option<NaiveDate>);

fn key(record: &FullRecord) -> RecordKey {
    (record.page_num, record.plot_num, record.date)
}

/// A value that changed between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChange {
    pub page_num: Option<u32>,
    pub plot_num: usize,
    pub date: Option<NaiveDate>,
    pub previous: Option<f64>,
    pub current: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunComparison {
    pub previous: usize,
    pub current: usize,
    /// Rows present in both runs with the same value, or missing in both
    pub matching: usize,
    pub differing: Vec<ValueChange>,
}

impl RunComparison {
    /// Rows found in only one of the two runs.
    pub fn unpaired(&self) -> usize {
        let paired = self.matching + self.differing.len();
        self.previous.saturating_sub(paired) + self.current.saturating_sub(paired)
    }
}

fn same_value(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
        (None, None) => true,
        (Some(v), None) | (None, Some(v)) => v.is_nan(),
    }
}

/// Pairs rows on (page, chart, date) and counts agreeing values.
///
/// Rows are compared after rounding to the three decimals they are
/// stored with, so a run compared against its own written output matches.
pub fn compare_runs(previous: &[FullRecord], current: &[FullRecord]) -> RunComparison {
    let stored = |v: Option<f64>| v.map(|v| (v * 1000.0).round() / 1000.0);

    let mut by_key: FxHashMap<RecordKey, Option<f64>> = FxHashMap::default();
    for record in previous {
        by_key.insert(key(record), stored(record.value));
    }

    let mut comparison = RunComparison {
        previous: previous.len(),
        current: current.len(),
        matching: 0,
        differing: Vec::new(),
    };
    for record in current {
        let Some(&old) = by_key.get(&key(record)) else {
            continue;
        };
        let new = stored(record.value);
        if same_value(old, new) {
            comparison.matching += 1;
        } else {
            comparison.differing.push(ValueChange {
                page_num: record.page_num,
                plot_num: record.plot_num,
                date: record.date,
                previous: old,
                current: new,
            });
        }
    }
    tracing::debug!(
        matching = comparison.matching,
        differing = comparison.differing.len(),
        "compared runs"
    );
    comparison
}

impl fmt::Display for RunComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Previous rows: {}", self.previous)?;
        writeln!(f, "Current rows: {}", self.current)?;
        writeln!(f, "Matching values: {}", self.matching)?;
        writeln!(f, "Differing values: {}", self.differing.len())?;
        for change in &self.differing {
            let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
            let date = change.date.map_or_else(|| "-".to_string(), |d| d.to_string());
            writeln!(
                f,
                "  plot {} on {}: {} -> {}",
                change.plot_num,
                date,
                show(change.previous),
                show(change.current)
            )?;
        }
        Ok(())
    }
}
