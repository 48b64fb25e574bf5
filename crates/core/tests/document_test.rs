//! Scenario tests joining page text with chart graphics.

mod common;

use chartmine_core::ExtractConfig;
use chartmine_core::chart::{classify_all, correct_reading_order, segment};
use chartmine_core::compare::compare_runs;
use chartmine_core::dates::DateIndexTable;
use chartmine_core::diagnostics::Subject;
use chartmine_core::error::ChartError;
use chartmine_core::graphics::read_svg;
use chartmine_core::pipeline::full_document;
use chartmine_core::text::{PageLayout, summarise};

use chrono::NaiveDate;
use common::{first_page, simple_chart_svg, summary_chart_boxes, svg_document};

const AXIS: (&str, &str) = ("Sun Feb 16", "Sun Mar 29");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn two_chart_graphics() -> String {
    let body = format!(
        "{}{}",
        simple_chart_svg(0.0, 0.0, 0.0, -64.2),
        simple_chart_svg(0.0, 300.0, 20.0, 3.0)
    );
    svg_document(&body)
}

#[test]
fn test_full_document() {
    let pages = vec![first_page(&[("Retail & recreation", "-64%"), ("Parks*", "+12%")], AXIS)];
    let graphics = read_svg(&two_chart_graphics()).unwrap();
    let output = full_document(pages, graphics, &ExtractConfig::default()).unwrap();

    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert_eq!(output.summaries.len(), 2);
    assert_eq!(output.summaries[0].plot_name, "Retail & recreation");
    assert_eq!(output.summaries[0].headline, "-64%");
    assert!(output.summaries[1].asterisk);
    assert_eq!(output.summaries[1].plot_name, "Parks");

    let dates = output.dates.as_ref().unwrap();
    assert_eq!(dates.len(), 43);
    assert_eq!(dates.get(1), Some(date(2020, 2, 16)));
    assert_eq!(dates.get(43), Some(date(2020, 3, 29)));

    // Chart 2 ends at +3 against a printed +12.
    assert_eq!(output.report.plots_with_data, 2);
    assert_eq!(output.report.exact.len(), 1);
    assert_eq!(output.report.beyond_threshold.len(), 1);
    assert_eq!(output.report.beyond_threshold[0].plot_name, "Parks");

    let full = output.full_records();
    assert_eq!(full.len(), 86);
    let last = &full[42];
    assert_eq!(last.plot_num, 1);
    assert_eq!(last.date, Some(date(2020, 3, 29)));
    assert_eq!(last.country.as_deref(), Some("Ruritania"));
    assert!((last.value.unwrap() - -64.2).abs() < 1e-6);

    let series = output.series_records();
    assert_eq!(series.len(), 86);
    assert_eq!(series[43].graph_num, 2);
    assert_eq!(series[43].date, date(2020, 2, 16));
}

#[test]
fn test_reconciles_on_last_dated_day() {
    // 40 labelled days against a trend drawn over 43.
    let pages = vec![first_page(&[("Retail", "-60%")], ("Sun Feb 16", "Thu Mar 26"))];
    let graphics = read_svg(&svg_document(&simple_chart_svg(0.0, 0.0, 0.0, -64.2))).unwrap();
    let output = full_document(pages, graphics, &ExtractConfig::default()).unwrap();

    let dates = output.dates.as_ref().unwrap();
    assert_eq!(dates.len(), 40);
    assert_eq!(dates.get(40), Some(date(2020, 3, 26)));

    // Day 40 sits at -59.6; the undated day 43 would read -64.
    assert_eq!(output.report.plots_with_data, 1);
    assert!(output.report.is_clean(), "{}", output.report);
    assert_eq!(output.full_records().len(), 40);
}

/// Two summary pages whose charts print different axis ranges.
fn conflicting_pages() -> Vec<PageLayout> {
    vec![
        first_page(&[("Retail", "-64%")], AXIS),
        PageLayout {
            page: 2,
            boxes: summary_chart_boxes(300.0, 600.0, "Parks", "+12%", ("Sun Feb 23", "Sun Apr 5")),
        },
    ]
}

#[test]
fn test_conflicting_axes_keep_numeric_output() {
    let graphics = read_svg(&two_chart_graphics()).unwrap();
    let output = full_document(conflicting_pages(), graphics, &ExtractConfig::default()).unwrap();

    assert!(output.dates.is_none());
    let diagnostic = output.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.subject, Subject::Document);
    assert!(diagnostic.message.contains("found 2 distinct"));

    assert_eq!(output.daily.len(), 2);
    assert_eq!(output.report.plots_with_data, 2);
    assert!(output.series_records().is_empty());
    // Summaries are still emitted, one undated row per chart.
    assert_eq!(output.full_records().len(), 2);

    let summaries = summarise(conflicting_pages(), &ExtractConfig::default().layout).unwrap();
    let err = DateIndexTable::from_summaries(&summaries).unwrap_err();
    assert!(matches!(err, ChartError::NonUniqueDateAxis { count: 2 }));
}

#[test]
fn test_chart_count_mismatch_is_reported() {
    let pages = vec![first_page(&[("Retail", "-64%")], AXIS)];
    let graphics = read_svg(&two_chart_graphics()).unwrap();
    let output = full_document(pages, graphics, &ExtractConfig::default()).unwrap();

    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.diagnostics.iter().next().unwrap().message.contains("1 plot summaries but 2 charts"));
    // The graphics-only chart still reaches the joined output.
    let full = output.full_records();
    assert_eq!(full.len(), 86);
    assert!(full[43..].iter().all(|r| r.plot_num == 2 && r.country.is_none()));
}

#[test]
fn test_rerun_matches_previous_output() {
    let run = || {
        let pages = vec![first_page(&[("Retail", "-64%"), ("Parks", "+12%")], AXIS)];
        let graphics = read_svg(&two_chart_graphics()).unwrap();
        full_document(pages, graphics, &ExtractConfig::default())
            .unwrap()
            .full_records()
    };
    let comparison = compare_runs(&run(), &run());
    assert_eq!(comparison.previous, 86);
    assert_eq!(comparison.matching, 86);
    assert!(comparison.differing.is_empty());
}

#[test]
fn test_leading_row_is_never_reordered() {
    let graphics = read_svg(&two_chart_graphics()).unwrap();
    let config = ExtractConfig::default();
    let charts = segment(classify_all(graphics.primitives, &config.classifier));
    let (_, renames) = correct_reading_order(charts);
    assert!(renames.is_empty());
}
