//! Reading-order correction for grid pages.
//!
//! The leading single-row charts come out of segmentation in order. Grid
//! pages draw their charts column by column, so every later block of up to
//! twelve (two rows of six) is re-sorted by row bucket, then by x.

use ordered_float::OrderedFloat;

use crate::utils::round_to_digits;

use super::Chart;

/// Charts at the start of a document already in reading order.
pub const FIRST_ROW_CHARTS: usize = 6;

/// Charts per grid page block.
pub const GRID_BLOCK_CHARTS: usize = 12;

/// An ordinal change applied by reading-order correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    pub from: usize,
    pub to: usize,
}

/// Sort key of a chart: the y of its first trend start, bucketed to
/// hundreds, then its x.
pub fn reading_order_key(chart: &Chart) -> OrderedFloat<f64> {
    let (x, y) = chart.first_trend_start().unwrap_or((0.0, 0.0));
    OrderedFloat(round_to_digits(y, -2) * 1000.0 + x)
}

/// Reorders charts into reading order and renumbers them from 1.
///
/// Returns the reordered charts together with every ordinal that changed.
pub fn correct_reading_order(charts: Vec<Chart>) -> (Vec<Chart>, Vec<Rename>) {
    let mut charts = charts.into_iter();
    let mut ordered: Vec<Chart> = charts.by_ref().take(FIRST_ROW_CHARTS).collect();
    let rest: Vec<Chart> = charts.collect();

    for block in rest.chunks(GRID_BLOCK_CHARTS) {
        let mut block = block.to_vec();
        block.sort_by_key(reading_order_key);
        ordered.extend(block);
    }

    let mut renames = Vec::new();
    for (i, chart) in ordered.iter_mut().enumerate() {
        let to = i + 1;
        if chart.ordinal != to {
            renames.push(Rename {
                from: chart.ordinal,
                to,
            });
            chart.ordinal = to;
        }
    }
    tracing::debug!(
        charts = ordered.len(),
        renamed = renames.len(),
        "corrected reading order"
    );
    (ordered, renames)
}
