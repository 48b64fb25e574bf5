//! End-to-end extraction of one document.
//!
//! Graphics and page text are processed independently and joined on chart
//! number at the end. Per-chart and date failures are collected as
//! diagnostics; only unreadable inputs fail the whole call.

use std::collections::BTreeMap;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::chart::{
    Chart, NormalizedSeries, Rename, classify_all, correct_reading_order, normalize, resolve, segment,
};
use crate::config::ExtractConfig;
use crate::dates::DateIndexTable;
use crate::diagnostics::{Diagnostics, Subject};
use crate::error::{ChartError, Result};
use crate::graphics::{Primitive, SvgGraphics};
use crate::reconcile::{ReconciliationReport, reconcile};
use crate::records::{
    DatedValue, FullRecord, SeriesRecord, SummaryRecord, daily_values, full_records, join_dates,
    series_records,
};
use crate::text::{PageLayout, PlotSummary, summarise};

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Classifies and segments primitives into charts, in reading order when
/// `config.reorder` is set.
pub fn split_charts(
    primitives: impl IntoIterator<Item = Primitive>,
    config: &ExtractConfig,
) -> (Vec<Chart>, Vec<Rename>) {
    let elements = classify_all(primitives, &config.classifier);
    let charts = segment(elements);
    if config.reorder {
        correct_reading_order(charts)
    } else {
        (charts, Vec::new())
    }
}

/// Resolves and normalizes every chart on a worker pool.
///
/// Charts that fail are left out of the returned series and recorded in
/// the diagnostics under their ordinal, as are charts whose fragmentation
/// correction had to take trend strokes as axis lines.
pub fn normalize_charts(
    charts: &[Chart],
    config: &ExtractConfig,
) -> Result<(Vec<NormalizedSeries>, Diagnostics)> {
    let thread_count = match config.threads {
        0 => default_thread_count(),
        n => n,
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .map_err(|e| ChartError::ThreadPool(e.to_string()))?;

    let span = config.span;
    let mut results: Vec<(usize, Result<(NormalizedSeries, Option<String>)>)> = pool.install(|| {
        charts
            .par_iter()
            .map(|chart| {
                let outcome = resolve(chart).and_then(|resolved| {
                    let note = resolved.promotion_note();
                    normalize(&resolved, span).map(|series| (series, note))
                });
                (chart.ordinal, outcome)
            })
            .collect()
    });
    results.sort_by_key(|(ordinal, _)| *ordinal);

    let mut series = Vec::with_capacity(results.len());
    let mut diagnostics = Diagnostics::new();
    for (ordinal, result) in results {
        match result {
            Ok((s, note)) => {
                if let Some(note) = note {
                    diagnostics.push(Subject::Chart(ordinal), note);
                }
                series.push(s);
            }
            Err(e) => diagnostics.record(Subject::Chart(ordinal), &e),
        }
    }
    tracing::debug!(
        charts = charts.len(),
        normalized = series.len(),
        failed = diagnostics.len(),
        "normalized charts"
    );
    Ok((series, diagnostics))
}

/// Everything recovered from one chart-bearing surface.
#[derive(Debug, Clone, Default)]
pub struct GraphicsOutput {
    pub charts: Vec<Chart>,
    /// Ordinal changes applied by reading-order correction
    pub renames: Vec<Rename>,
    pub series: Vec<NormalizedSeries>,
    pub diagnostics: Diagnostics,
}

impl GraphicsOutput {
    /// Daily values per chart under the configured collision policy.
    pub fn daily(&self, config: &ExtractConfig) -> BTreeMap<usize, BTreeMap<u32, f64>> {
        daily_values(&self.series, config.collision)
    }
}

pub fn process_graphics(graphics: SvgGraphics, config: &ExtractConfig) -> Result<GraphicsOutput> {
    let mut diagnostics = Diagnostics::new();
    for warning in &graphics.warnings {
        diagnostics.push(Subject::Document, warning.clone());
    }
    let (charts, renames) = split_charts(graphics.primitives, config);
    let (series, failures) = normalize_charts(&charts, config)?;
    diagnostics.extend(failures);
    Ok(GraphicsOutput {
        charts,
        renames,
        series,
        diagnostics,
    })
}

/// Dated values of every chart, spread over the date table.
pub fn dated_series(
    daily: &BTreeMap<usize, BTreeMap<u32, f64>>,
    table: &DateIndexTable,
) -> BTreeMap<usize, Vec<DatedValue>> {
    daily
        .iter()
        .map(|(&chart, values)| (chart, join_dates(values, table)))
        .collect()
}

/// Daily values of every chart restricted to the days the table dates.
///
/// Headlines are printed for the last dated day, so drawn days past the
/// end of the table must not take part in reconciliation.
pub fn dated_daily(
    daily: &BTreeMap<usize, BTreeMap<u32, f64>>,
    table: &DateIndexTable,
) -> BTreeMap<usize, BTreeMap<u32, f64>> {
    dated_series(daily, table)
        .into_iter()
        .map(|(chart, dated)| {
            let values = dated
                .into_iter()
                .filter_map(|d| d.value.map(|value| (d.day_index, value)))
                .collect();
            (chart, values)
        })
        .collect()
}

/// Joined text and graphics of one report.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    pub summaries: Vec<PlotSummary>,
    pub graphics: GraphicsOutput,
    /// Absent when the date axis could not be resolved
    pub dates: Option<DateIndexTable>,
    pub daily: BTreeMap<usize, BTreeMap<u32, f64>>,
    pub report: ReconciliationReport,
    /// Graphics diagnostics plus document-level ones
    pub diagnostics: Diagnostics,
}

impl DocumentOutput {
    pub fn summary_records(&self) -> Vec<SummaryRecord> {
        self.summaries.iter().map(SummaryRecord::from).collect()
    }

    /// Per-chart daily rows; empty without a date table.
    pub fn series_records(&self) -> Vec<SeriesRecord> {
        let Some(table) = &self.dates else {
            return Vec::new();
        };
        dated_series(&self.daily, table)
            .iter()
            .flat_map(|(&chart, dated)| series_records(chart, dated))
            .collect()
    }

    /// Summary rows joined with dated values; charts contribute a single
    /// undated row when there is no date table.
    pub fn full_records(&self) -> Vec<FullRecord> {
        let dated = match &self.dates {
            Some(table) => dated_series(&self.daily, table),
            None => BTreeMap::new(),
        };
        full_records(&self.summaries, &dated)
    }
}

/// Extracts a whole report from its page layouts and chart graphics.
///
/// Fails only when the summaries cannot be built. A date axis that cannot
/// be resolved leaves `dates` empty and is recorded as a document
/// diagnostic; reconciliation then falls back to the last drawn value.
pub fn full_document(
    pages: Vec<PageLayout>,
    graphics: SvgGraphics,
    config: &ExtractConfig,
) -> Result<DocumentOutput> {
    let summaries = summarise(pages, &config.layout)?;
    let graphics = process_graphics(graphics, config)?;
    let mut diagnostics = graphics.diagnostics.clone();

    let dates = match DateIndexTable::from_summaries(&summaries) {
        Ok(table) => {
            table.check_span(config.span.xspan);
            Some(table)
        }
        Err(e) => {
            diagnostics.record(Subject::Document, &e);
            None
        }
    };

    if summaries.len() != graphics.charts.len() {
        diagnostics.push(
            Subject::Document,
            format!(
                "{} plot summaries but {} charts in the graphics",
                summaries.len(),
                graphics.charts.len()
            ),
        );
    }

    let daily = graphics.daily(config);
    let report = match &dates {
        Some(table) => reconcile(&summaries, &dated_daily(&daily, table), config.threshold),
        None => reconcile(&summaries, &daily, config.threshold),
    };
    Ok(DocumentOutput {
        summaries,
        graphics,
        dates,
        daily,
        report,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{GraphicElement, Role};
    use crate::graphics::Path;

    fn line(y: f64) -> GraphicElement {
        GraphicElement::new(Role::AxisLine, Path::line((0.0, y), (42.0, y)), None)
    }

    fn trend(points: &[(f64, f64)]) -> GraphicElement {
        GraphicElement::new(Role::TrendCurve, Path::polyline(points), None)
    }

    #[test]
    fn test_failed_chart_is_isolated() {
        let good = Chart::new(
            1,
            vec![
                line(0.0),
                line(40.0),
                line(80.0),
                line(120.0),
                line(160.0),
                trend(&[(0.0, 80.0), (21.0, 60.0), (42.0, 40.0)]),
            ],
        );
        let bad = Chart::new(2, vec![line(0.0), line(80.0), trend(&[(0.0, 80.0), (1.0, 70.0), (2.0, 60.0)])]);
        let config = ExtractConfig {
            threads: 2,
            ..ExtractConfig::default()
        };

        let (series, diagnostics) = normalize_charts(&[good, bad], &config).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].chart, 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.for_chart(2).count(), 1);
    }

    #[test]
    fn test_promoted_trend_stroke_is_reported() {
        let chart = Chart::new(
            1,
            vec![
                line(0.0),
                line(40.0),
                line(80.0),
                line(120.0),
                GraphicElement::new(Role::TrendCurve, Path::line((0.0, 160.0), (42.0, 161.0)), None),
                GraphicElement::new(Role::TrendCurve, Path::line((0.0, 70.0), (10.0, 60.0)), None),
            ],
        );
        let (series, diagnostics) = normalize_charts(&[chart], &ExtractConfig::default()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.subject, Subject::Chart(1));
        assert!(diagnostic.message.contains("taken as axis lines"));
    }

    #[test]
    fn test_dated_daily_drops_undated_days() {
        let table = DateIndexTable::resolve("March 29, 2020", &["Sun Feb 16", "Tue Feb 18"]).unwrap();
        let daily = BTreeMap::from([(1, BTreeMap::from([(1, -1.0), (3, -3.0), (4, -4.0)]))]);
        let dated = dated_daily(&daily, &table);
        assert_eq!(dated[&1], BTreeMap::from([(1, -1.0), (3, -3.0)]));
    }
}
