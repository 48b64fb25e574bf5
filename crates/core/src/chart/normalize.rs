//! Drawing-space to (day index, percent) conversion.
//!
//! With `x_min..x_max` the baseline extent and `y_scale` the mean distance
//! from the baseline to the outer reference lines:
//!
//! ```text
//! day_index = 1 + round(xspan * (x - x_min) / (x_max - x_min))
//! value     = yspan * (baseline_y - y) / y_scale
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{AxisSpan, CollisionPolicy};
use crate::error::{ChartError, Result};
use crate::graphics::run_vertices;
use crate::utils::{EPSILON, Point, rect_center, round_half_even};

use super::classify::GraphicElement;
use super::resolve::ResolvedChart;

/// One trend sample in output space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    /// 1-based day on the shared x axis
    pub day_index: u32,
    /// Percentage change against the baseline
    pub value: f64,
}

/// Normalized trend of one chart.
///
/// Samples are grouped into runs; a new run starts wherever the drawn
/// trend had a gap, so missing days stay detectable downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedSeries {
    pub chart: usize,
    pub runs: Vec<Vec<NormalizedPoint>>,
}

impl NormalizedSeries {
    /// All samples in draw order. Backtracking curves are not re-sorted.
    pub fn points(&self) -> impl Iterator<Item = &NormalizedPoint> {
        self.runs.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One value per day index, combining colliding samples per `policy`.
    pub fn daily(&self, policy: CollisionPolicy) -> BTreeMap<u32, f64> {
        let mut grouped: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for point in self.points() {
            grouped.entry(point.day_index).or_default().push(point.value);
        }
        grouped
            .into_iter()
            .filter_map(|(day, values)| {
                if values.len() > 1 {
                    tracing::debug!(chart = self.chart, day, samples = values.len(), "day collision");
                }
                let value = match policy {
                    CollisionPolicy::First => *values.first()?,
                    CollisionPolicy::Last => *values.last()?,
                    CollisionPolicy::Mean => values.iter().sum::<f64>() / values.len() as f64,
                };
                Some((day, value))
            })
            .collect()
    }
}

/// Drawing-space samples of one trend element, grouped by run.
fn element_samples(element: &GraphicElement) -> Vec<Vec<Point>> {
    if element.path.starts_with_cubic() {
        return element
            .path
            .bbox()
            .map(|bbox| vec![vec![rect_center(bbox)]])
            .unwrap_or_default();
    }
    element
        .path
        .continuous_subpaths()
        .into_iter()
        .map(run_vertices)
        .collect()
}

/// Maps drawing space onto the output axes of one chart.
struct Transform {
    chart: usize,
    span: AxisSpan,
    x_min: f64,
    x_scale: f64,
    baseline_y: f64,
    y_scale: f64,
}

impl Transform {
    fn new(chart: &ResolvedChart, span: AxisSpan) -> Result<Self> {
        let (x_min, x_max) = chart.lines.x_range();
        let baseline_y = chart.lines.baseline_y();
        let x_scale = x_max - x_min;
        let y_scale = ((chart.lines.top_y() - baseline_y).abs()
            + (baseline_y - chart.lines.bottom_y()).abs())
            / 2.0;
        if !(x_scale > EPSILON && y_scale > EPSILON) {
            return Err(ChartError::DegenerateAxis {
                chart: chart.ordinal,
            });
        }
        Ok(Self {
            chart: chart.ordinal,
            span,
            x_min,
            x_scale,
            baseline_y,
            y_scale,
        })
    }

    fn apply(&self, (x, y): Point) -> NormalizedPoint {
        let xspan = f64::from(self.span.xspan);
        let raw_day = 1.0 + round_half_even(xspan * (x - self.x_min) / self.x_scale);
        let day = raw_day.clamp(1.0, xspan + 1.0);
        let yspan = self.span.yspan.abs();
        let raw_value = yspan * (self.baseline_y - y) / self.y_scale;
        let value = raw_value.max(-yspan).min(yspan);
        if day != raw_day || value != raw_value {
            tracing::warn!(
                chart = self.chart,
                day = raw_day,
                value = raw_value,
                "sample outside the chart frame, clamped"
            );
        }
        NormalizedPoint {
            day_index: day as u32,
            value,
        }
    }
}

/// Normalizes every trend element of a resolved chart.
pub fn normalize(chart: &ResolvedChart, span: AxisSpan) -> Result<NormalizedSeries> {
    let transform = Transform::new(chart, span)?;
    let runs: Vec<Vec<NormalizedPoint>> = chart
        .trend
        .iter()
        .flat_map(element_samples)
        .map(|run| run.into_iter().map(|p| transform.apply(p)).collect())
        .collect();
    let series = NormalizedSeries {
        chart: chart.ordinal,
        runs,
    };
    tracing::debug!(chart = chart.ordinal, samples = series.len(), "normalized chart");
    Ok(series)
}
