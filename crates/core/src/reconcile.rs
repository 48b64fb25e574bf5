//! Cross-check of extracted series against printed headline figures.
//!
//! Advisory only: mismatches are itemized for a reviewer and never stop
//! output from being written.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::text::PlotSummary;
use crate::utils::round_half_even;

/// Phrase printed instead of a figure when a chart has no recent data.
pub const NOT_ENOUGH_DATA: &str = "Not enough data";

/// Printed headline of one chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Headline {
    Percent(f64),
    /// The report printed no figure for this chart
    NotEnoughData,
    /// Text that could not be read as a figure
    Unreadable,
}

/// Parses `"-64%"`, treating the not-enough-data phrase as missing.
pub fn parse_headline(text: &str) -> Headline {
    if text.contains(NOT_ENOUGH_DATA) {
        return Headline::NotEnoughData;
    }
    match text.replace('%', "").trim().parse::<f64>() {
        Ok(value) => Headline::Percent(value),
        Err(_) => Headline::Unreadable,
    }
}

/// A chart whose last drawn value disagrees with its headline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub page_num: u32,
    pub plot_num: usize,
    pub country: String,
    pub region: String,
    pub plot_name: String,
    /// Last known value of the drawn series
    pub value: f64,
    pub headline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    /// Charts with both a readable headline and at least one value
    pub plots_with_data: usize,
    pub threshold: f64,
    /// Rounded last value differs from the headline at all
    pub exact: Vec<Mismatch>,
    /// Rounded last value differs by more than `threshold`
    pub beyond_threshold: Vec<Mismatch>,
    /// Charts whose headline text was neither a figure nor the missing-data phrase
    pub unreadable: Vec<usize>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.exact.is_empty() && self.unreadable.is_empty()
    }
}

/// Compares every chart's chronologically last value with its headline.
pub fn reconcile(
    summaries: &[PlotSummary],
    daily: &BTreeMap<usize, BTreeMap<u32, f64>>,
    threshold: f64,
) -> ReconciliationReport {
    let mut report = ReconciliationReport {
        plots_with_data: 0,
        threshold,
        exact: Vec::new(),
        beyond_threshold: Vec::new(),
        unreadable: Vec::new(),
    };

    for summary in summaries {
        let headline = match parse_headline(&summary.headline) {
            Headline::Percent(v) => v,
            Headline::NotEnoughData => continue,
            Headline::Unreadable => {
                tracing::warn!(plot = summary.plot_num, headline = %summary.headline, "unreadable headline");
                report.unreadable.push(summary.plot_num);
                continue;
            }
        };
        let Some(&value) = daily
            .get(&summary.plot_num)
            .and_then(|values| values.values().next_back())
        else {
            continue;
        };

        report.plots_with_data += 1;
        let rounded = round_half_even(value);
        if rounded == headline {
            continue;
        }
        let mismatch = Mismatch {
            page_num: summary.page_num,
            plot_num: summary.plot_num,
            country: summary.country.clone(),
            region: summary.region.clone(),
            plot_name: summary.plot_name.clone(),
            value,
            headline,
        };
        if (rounded - headline).abs() > threshold {
            report.beyond_threshold.push(mismatch.clone());
        }
        report.exact.push(mismatch);
    }

    tracing::debug!(
        plots = report.plots_with_data,
        exact = report.exact.len(),
        beyond_threshold = report.beyond_threshold.len(),
        "reconciled headlines"
    );
    report
}

fn write_table(f: &mut fmt::Formatter<'_>, rows: &[Mismatch], digits: usize) -> fmt::Result {
    writeln!(f, "| country | region | plot_name | value | headline |")?;
    writeln!(f, "|---|---|---|---|---|")?;
    for row in rows {
        writeln!(
            f,
            "| {} | {} | {} | {:.*} | {} |",
            row.country, row.region, row.plot_name, digits, row.value, row.headline
        )?;
    }
    Ok(())
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plots with data: {}", self.plots_with_data)?;
        writeln!(
            f,
            "Plots where last point doesn't match headline: {}",
            self.exact.len()
        )?;
        if !self.exact.is_empty() {
            write_table(f, &self.exact, 3)?;
        }
        writeln!(
            f,
            "Plots where last point is more than {} away: {}",
            self.threshold,
            self.beyond_threshold.len()
        )?;
        if !self.beyond_threshold.is_empty() {
            write_table(f, &self.beyond_threshold, 0)?;
        }
        if !self.unreadable.is_empty() {
            writeln!(f, "Plots with unreadable headlines: {:?}", self.unreadable)?;
        }
        Ok(())
    }
}
