//! Splitting a classified element stream into per-chart groups.
//!
//! Charts are drawn as a quintet of reference strokes followed by a
//! variable-length trend, with no delimiter in between. The segmenter is a
//! two-state automaton over that stream:
//!
//! - `CollectingAxes`: axis lines accumulate; a sixth axis line closes the
//!   buffer as a trend-less chart first. A trend element moves to
//!   `CollectingTrend`.
//! - `CollectingTrend`: trend elements accumulate; an axis line closes the
//!   chart and starts the next one.
//!
//! Discarded elements never enter a buffer.

use super::classify::{GraphicElement, Role};
use super::Chart;

/// Number of reference strokes drawn per chart.
pub const AXIS_LINES_PER_CHART: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    CollectingAxes,
    CollectingTrend,
}

/// Streaming segmenter. Feed elements in draw order with [`push`](Self::push)
/// and close the stream with [`finish`](Self::finish).
#[derive(Debug)]
pub struct Segmenter {
    state: SegmenterState,
    buffer: Vec<GraphicElement>,
    axis_count: usize,
    emitted: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            state: SegmenterState::CollectingAxes,
            buffer: Vec::new(),
            axis_count: 0,
            emitted: 0,
        }
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    /// Number of charts emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Advances the automaton by one element, returning a chart when the
    /// element closes one.
    pub fn push(&mut self, element: GraphicElement) -> Option<Chart> {
        match (self.state, element.role) {
            (_, Role::Discard) => None,
            (SegmenterState::CollectingAxes, Role::AxisLine) => {
                let closed = if self.axis_count == AXIS_LINES_PER_CHART {
                    tracing::debug!(chart = self.emitted + 1, "axis quintet without trend");
                    self.flush()
                } else {
                    None
                };
                self.axis_count += 1;
                self.buffer.push(element);
                closed
            }
            (SegmenterState::CollectingAxes, _) => {
                if self.axis_count != AXIS_LINES_PER_CHART {
                    tracing::warn!(
                        chart = self.emitted + 1,
                        axis_lines = self.axis_count,
                        "trend element before a complete axis quintet"
                    );
                }
                self.state = SegmenterState::CollectingTrend;
                self.buffer.push(element);
                None
            }
            (SegmenterState::CollectingTrend, Role::AxisLine) => {
                let closed = self.flush();
                self.axis_count = 1;
                self.buffer.push(element);
                closed
            }
            (SegmenterState::CollectingTrend, _) => {
                self.buffer.push(element);
                None
            }
        }
    }

    /// Closes the stream, returning the last open chart if any.
    pub fn finish(mut self) -> Option<Chart> {
        self.flush()
    }

    fn flush(&mut self) -> Option<Chart> {
        self.state = SegmenterState::CollectingAxes;
        self.axis_count = 0;
        if self.buffer.is_empty() {
            return None;
        }
        self.emitted += 1;
        let elements = std::mem::take(&mut self.buffer);
        Some(Chart::new(self.emitted, elements))
    }
}

/// Segments a whole element stream into charts numbered from 1.
pub fn segment<I>(elements: I) -> Vec<Chart>
where
    I: IntoIterator<Item = GraphicElement>,
{
    let mut segmenter = Segmenter::new();
    let mut charts: Vec<Chart> = elements
        .into_iter()
        .filter_map(|element| segmenter.push(element))
        .collect();
    charts.extend(segmenter.finish());
    tracing::debug!(charts = charts.len(), "segmented element stream");
    charts
}
