//! Reference-line resolution.
//!
//! Of the five horizontal strokes only the outer pair and the middle one
//! are needed: sorted by drawing-space y they are top (+yspan), gridline,
//! baseline (0), gridline, bottom (-yspan). Drawing space grows downward,
//! so the smallest y is the visual top.

use std::cmp::Ordering;

use crate::error::{ChartError, Result};

use super::classify::{GraphicElement, Role};
use super::segment::AXIS_LINES_PER_CHART;
use super::Chart;

/// The three reference strokes a chart is normalized against.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLines {
    pub top: GraphicElement,
    pub baseline: GraphicElement,
    pub bottom: GraphicElement,
}

/// Vertical position of a horizontal stroke.
fn line_y(element: &GraphicElement) -> f64 {
    match (element.path.start(), element.path.end()) {
        (Some(a), Some(b)) => (a.1 + b.1) / 2.0,
        _ => f64::NAN,
    }
}

impl ReferenceLines {
    /// Picks the reference strokes from five axis lines (positions 0, 2
    /// and 4 by ascending y) or orders three already-resolved ones.
    pub fn from_axis_lines(chart: usize, mut lines: Vec<GraphicElement>) -> Result<Self> {
        lines.sort_by(|a, b| line_y(a).partial_cmp(&line_y(b)).unwrap_or(Ordering::Equal));
        let picked: Vec<GraphicElement> = match lines.len() {
            AXIS_LINES_PER_CHART => lines.into_iter().step_by(2).collect(),
            3 => lines,
            found => return Err(ChartError::MalformedChart { chart, found }),
        };
        let [top, baseline, bottom]: [GraphicElement; 3] = picked
            .try_into()
            .map_err(|v: Vec<_>| ChartError::MalformedChart { chart, found: v.len() })?;
        Ok(Self {
            top,
            baseline,
            bottom,
        })
    }

    /// The three strokes by ascending y.
    pub fn to_vec(&self) -> Vec<GraphicElement> {
        vec![self.top.clone(), self.baseline.clone(), self.bottom.clone()]
    }

    pub fn top_y(&self) -> f64 {
        line_y(&self.top)
    }

    pub fn baseline_y(&self) -> f64 {
        line_y(&self.baseline)
    }

    pub fn bottom_y(&self) -> f64 {
        line_y(&self.bottom)
    }

    /// Horizontal extent of the baseline, `(x_min, x_max)`.
    pub fn x_range(&self) -> (f64, f64) {
        match (self.baseline.path.start(), self.baseline.path.end()) {
            (Some(a), Some(b)) => (a.0.min(b.0), a.0.max(b.0)),
            _ => (f64::NAN, f64::NAN),
        }
    }
}

/// A chart whose reference lines have been picked out.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChart {
    pub ordinal: usize,
    pub lines: ReferenceLines,
    /// Trend elements in draw order
    pub trend: Vec<GraphicElement>,
    /// Whether more than five single-segment lines were found
    pub fragmented: bool,
    /// Strokes not drawn as axis lines that were kept as axis lines
    pub promoted: usize,
    /// Axis-styled strokes folded back into the trend
    pub demoted: usize,
}

impl ResolvedChart {
    /// Describes a fragmentation correction that took a stroke out of the
    /// trend. Such a chart may be normalized against the wrong lines.
    pub fn promotion_note(&self) -> Option<String> {
        (self.promoted > 0).then(|| {
            format!(
                "{} trend stroke(s) taken as axis lines and {} axis-styled stroke(s) \
                 taken as trend; values may be wrong",
                self.promoted, self.demoted
            )
        })
    }
}

struct AxisSplit {
    axes: Vec<GraphicElement>,
    trend: Vec<GraphicElement>,
    fragmented: bool,
    promoted: usize,
    demoted: usize,
}

/// Splits a chart into axis candidates and trend, applying the
/// fragmentation correction when too many straight strokes were drawn.
///
/// Candidates rank axis-styled strokes first, then by length; only when
/// fewer than five axis-styled strokes exist are other strokes promoted.
fn split_axes(chart: &Chart) -> AxisSplit {
    let mut candidates: Vec<(usize, bool, f64)> = chart
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.path.is_single_line())
        .map(|(i, e)| (i, e.role == Role::AxisLine, e.path.length()))
        .collect();

    if candidates.len() <= AXIS_LINES_PER_CHART {
        return AxisSplit {
            axes: chart.axis_lines().cloned().collect(),
            trend: chart.trend().cloned().collect(),
            fragmented: false,
            promoted: 0,
            demoted: 0,
        };
    }

    candidates.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
    });
    let mut keep: Vec<usize> = candidates[..AXIS_LINES_PER_CHART]
        .iter()
        .map(|(i, _, _)| *i)
        .collect();
    keep.sort_unstable();

    let mut split = AxisSplit {
        axes: Vec::with_capacity(AXIS_LINES_PER_CHART),
        trend: Vec::new(),
        fragmented: true,
        promoted: 0,
        demoted: 0,
    };
    for (i, element) in chart.elements.iter().enumerate() {
        let is_axis = element.role == Role::AxisLine;
        if keep.binary_search(&i).is_ok() {
            split.promoted += usize::from(!is_axis);
            split.axes.push(element.with_role(Role::AxisLine));
        } else if is_axis {
            split.demoted += 1;
            split.trend.push(element.with_role(Role::TrendCurve));
        } else if element.role.is_trend() {
            split.trend.push(element.clone());
        }
    }
    if split.promoted > 0 || split.demoted > 0 {
        tracing::warn!(
            chart = chart.ordinal,
            single_lines = candidates.len(),
            promoted = split.promoted,
            demoted = split.demoted,
            "fragmented chart, reclassified straight strokes"
        );
    }
    split
}

/// Resolves a chart's reference lines.
///
/// Fails with [`ChartError::MalformedChart`] unless the chart carries five
/// (or three already-resolved) axis lines after fragmentation correction.
pub fn resolve(chart: &Chart) -> Result<ResolvedChart> {
    let split = split_axes(chart);
    let lines = ReferenceLines::from_axis_lines(chart.ordinal, split.axes)?;
    Ok(ResolvedChart {
        ordinal: chart.ordinal,
        lines,
        trend: split.trend,
        fragmented: split.fragmented,
        promoted: split.promoted,
        demoted: split.demoted,
    })
}
