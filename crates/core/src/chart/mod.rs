//! Chart geometry pipeline.
//!
//! Classified elements flow through segmentation, reference-line
//! resolution, reading-order correction and normalization:
//!
//! ```text
//! primitives -> classify -> segment -> reorder -> resolve -> normalize
//! ```

mod classify;
mod normalize;
mod reorder;
mod resolve;
mod segment;

pub use classify::{GraphicElement, Role, classify, classify_all};
pub use normalize::{NormalizedPoint, NormalizedSeries, normalize};
pub use reorder::{FIRST_ROW_CHARTS, GRID_BLOCK_CHARTS, Rename, correct_reading_order, reading_order_key};
pub use resolve::{ReferenceLines, ResolvedChart, resolve};
pub use segment::{AXIS_LINES_PER_CHART, Segmenter, SegmenterState, segment};

use crate::graphics::Primitive;
use crate::utils::Point;

/// Elements of one subplot, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// 1-based position in the document
    pub ordinal: usize,
    pub elements: Vec<GraphicElement>,
}

impl Chart {
    pub fn new(ordinal: usize, elements: Vec<GraphicElement>) -> Self {
        Self { ordinal, elements }
    }

    pub fn axis_lines(&self) -> impl Iterator<Item = &GraphicElement> {
        self.elements.iter().filter(|e| e.role == Role::AxisLine)
    }

    pub fn axis_count(&self) -> usize {
        self.axis_lines().count()
    }

    pub fn trend(&self) -> impl Iterator<Item = &GraphicElement> {
        self.elements.iter().filter(|e| e.role.is_trend())
    }

    /// Start of the first trend element, or of the first element when the
    /// chart has no trend.
    pub fn first_trend_start(&self) -> Option<Point> {
        self.trend()
            .next()
            .or_else(|| self.elements.first())
            .and_then(GraphicElement::start)
    }

    /// Elements as drawable primitives, for writing the subplot back out.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.elements
            .iter()
            .map(|e| Primitive::new(e.path.clone(), e.style.clone()))
            .collect()
    }
}
