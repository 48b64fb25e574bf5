//! Output records and the sink they are written through.
//!
//! Storage is not this crate's concern: callers implement [`RecordSink`]
//! for whatever backs their output (the command line writes CSV).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize, Serializer};

use crate::chart::NormalizedSeries;
use crate::config::CollisionPolicy;
use crate::dates::DateIndexTable;
use crate::error::Result;
use crate::text::PlotSummary;

/// Floats are written with three decimals, missing values as empty fields.
fn fixed3<S: Serializer>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.collect_str(&format_args!("{v:.3}")),
        None => serializer.serialize_none(),
    }
}

/// Headline row of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub country: String,
    pub page_num: u32,
    pub plot_num: usize,
    pub region: String,
    pub plot_name: String,
    pub asterisk: bool,
    pub headline: String,
}

impl From<&PlotSummary> for SummaryRecord {
    fn from(s: &PlotSummary) -> Self {
        Self {
            country: s.country.clone(),
            page_num: s.page_num,
            plot_num: s.plot_num,
            region: s.region.clone(),
            plot_name: s.plot_name.clone(),
            asterisk: s.asterisk,
            headline: s.headline.clone(),
        }
    }
}

/// One calendar day of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    #[serde(serialize_with = "fixed3")]
    pub value: Option<f64>,
    pub date: NaiveDate,
    pub graph_num: usize,
}

/// Summary columns joined with one day of the chart's series.
///
/// Summary columns are empty for charts found only in the graphics, date
/// and value are empty for charts found only in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRecord {
    pub country: Option<String>,
    pub page_num: Option<u32>,
    pub plot_num: usize,
    pub region: Option<String>,
    pub plot_name: Option<String>,
    pub asterisk: Option<bool>,
    pub date: Option<NaiveDate>,
    #[serde(serialize_with = "fixed3")]
    pub value: Option<f64>,
    pub headline: Option<String>,
}

/// A value on a calendar day, or the gap where the chart drew nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedValue {
    pub day_index: u32,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Spreads a chart's daily values over the whole date table.
pub fn join_dates(daily: &BTreeMap<u32, f64>, table: &DateIndexTable) -> Vec<DatedValue> {
    let outside = daily.keys().filter(|&&day| table.get(day).is_none()).count();
    if outside > 0 {
        tracing::warn!(days = outside, "values outside the date table dropped");
    }
    table
        .iter()
        .map(|(day_index, date)| DatedValue {
            day_index,
            date,
            value: daily.get(&day_index).copied(),
        })
        .collect()
}

/// Daily values of every chart, combined per `policy`, keyed by chart.
pub fn daily_values(
    series: &[NormalizedSeries],
    policy: CollisionPolicy,
) -> BTreeMap<usize, BTreeMap<u32, f64>> {
    series
        .iter()
        .map(|s| (s.chart, s.daily(policy)))
        .collect()
}

pub fn series_records(chart: usize, dated: &[DatedValue]) -> Vec<SeriesRecord> {
    dated
        .iter()
        .map(|d| SeriesRecord {
            value: d.value,
            date: d.date,
            graph_num: chart,
        })
        .collect()
}

/// Outer join of summaries and dated series on chart number.
pub fn full_records(
    summaries: &[PlotSummary],
    dated: &BTreeMap<usize, Vec<DatedValue>>,
) -> Vec<FullRecord> {
    let summary_row = |s: &PlotSummary, date: Option<NaiveDate>, value: Option<f64>| FullRecord {
        country: Some(s.country.clone()),
        page_num: Some(s.page_num),
        plot_num: s.plot_num,
        region: Some(s.region.clone()),
        plot_name: Some(s.plot_name.clone()),
        asterisk: Some(s.asterisk),
        date,
        value,
        headline: Some(s.headline.clone()),
    };
    let graphics_row = |plot_num: usize, d: &DatedValue| FullRecord {
        country: None,
        page_num: None,
        plot_num,
        region: None,
        plot_name: None,
        asterisk: None,
        date: Some(d.date),
        value: d.value,
        headline: None,
    };

    let mut sorted: Vec<&PlotSummary> = summaries.iter().collect();
    sorted.sort_by_key(|s| s.plot_num);

    sorted
        .into_iter()
        .merge_join_by(dated.iter(), |s, (plot_num, _)| s.plot_num.cmp(*plot_num))
        .flat_map(|pair| -> Vec<FullRecord> {
            match pair {
                EitherOrBoth::Both(s, (_, values)) if !values.is_empty() => values
                    .iter()
                    .map(|d| summary_row(s, Some(d.date), d.value))
                    .collect(),
                EitherOrBoth::Both(s, _) | EitherOrBoth::Left(s) => vec![summary_row(s, None, None)],
                EitherOrBoth::Right((plot_num, values)) => {
                    values.iter().map(|d| graphics_row(*plot_num, d)).collect()
                }
            }
        })
        .collect()
}

/// Destination for output records.
pub trait RecordSink<R> {
    fn write(&mut self, record: &R) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<R: Clone> RecordSink<R> for Vec<R> {
    fn write(&mut self, record: &R) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes every record and finishes the sink, returning the record count.
pub fn write_all<'a, R: 'a, S>(sink: &mut S, records: impl IntoIterator<Item = &'a R>) -> Result<usize>
where
    S: RecordSink<R> + ?Sized,
{
    let mut count = 0;
    for record in records {
        sink.write(record)?;
        count += 1;
    }
    sink.finish()?;
    Ok(count)
}
