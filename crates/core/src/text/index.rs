//! Immutable spatial index over the text boxes of one page.
//!
//! Built once per page from a static Hilbert-packed R-tree and queried many
//! times. Query results come back in insertion order so that concatenated
//! text reads the way the page was laid out.

use geo_index::rtree::sort::HilbertSort;
use geo_index::rtree::{RTree, RTreeBuilder, RTreeIndex, SimpleDistanceMetric};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::utils::{HasBBox, Point, Rect, rect_center, rects_intersect};

/// One laid-out text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// `(x0, y0, x1, y1)` in page units, origin at the bottom left
    pub bbox: Rect,
    pub text: String,
}

impl TextBox {
    pub fn new(bbox: Rect, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }
}

impl HasBBox for TextBox {
    fn x0(&self) -> f64 {
        self.bbox.0
    }
    fn y0(&self) -> f64 {
        self.bbox.1
    }
    fn x1(&self) -> f64 {
        self.bbox.2
    }
    fn y1(&self) -> f64 {
        self.bbox.3
    }
}

/// Bottom-left corner of a recurring label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub left: f64,
    pub bottom: f64,
}

impl Anchor {
    pub fn new(left: f64, bottom: f64) -> Self {
        Self { left, bottom }
    }

    /// Query box at `offset` (left, bottom, right, top deltas) from the anchor.
    pub fn region(&self, offset: Rect) -> Rect {
        (
            self.left + offset.0,
            self.bottom + offset.1,
            self.left + offset.2,
            self.bottom + offset.3,
        )
    }
}

/// Lookup key of a label: asterisks dropped, surrounding whitespace trimmed.
pub fn anchor_key(text: &str) -> String {
    text.replace('*', "").trim().to_string()
}

/// Euclidean distance from a point to the nearest edge of a box (zero
/// inside it). Never exceeds the distance to the box center, so it bounds
/// every box below an R-tree node from below.
struct EdgeDistance;

impl SimpleDistanceMetric<f64> for EdgeDistance {
    fn distance(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        (x1 - x2).hypot(y1 - y2)
    }

    fn distance_to_bbox(
        &self,
        x: f64,
        y: f64,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> f64 {
        self.distance(x, y, x.clamp(min_x, max_x), y.clamp(min_y, max_y))
    }
}

fn center_distance(point: Point, b: &TextBox) -> f64 {
    let (cx, cy) = rect_center(b.bbox);
    (point.0 - cx).hypot(point.1 - cy)
}

/// Text boxes of one page with a spatial index and a label lookup.
pub struct TextIndex {
    /// Boxes in insertion order (id == index), text trimmed
    boxes: Vec<TextBox>,
    tree: Option<RTree<f64>>,
    anchors: FxHashMap<String, Vec<Anchor>>,
}

impl std::fmt::Debug for TextIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextIndex")
            .field("boxes", &self.boxes.len())
            .field("labels", &self.anchors.len())
            .finish()
    }
}

impl TextIndex {
    pub fn new(boxes: impl IntoIterator<Item = TextBox>) -> Self {
        let mut anchors: FxHashMap<String, Vec<Anchor>> = FxHashMap::default();
        let boxes: Vec<TextBox> = boxes
            .into_iter()
            .map(|b| {
                anchors
                    .entry(anchor_key(&b.text))
                    .or_default()
                    .push(Anchor::new(b.x0(), b.y0()));
                TextBox::new(b.bbox, b.text.trim())
            })
            .collect();

        let tree = if boxes.is_empty() {
            None
        } else {
            let mut builder: RTreeBuilder<f64> = RTreeBuilder::new(boxes.len() as u32);
            for b in &boxes {
                builder.add(b.x0(), b.y0(), b.x1(), b.y1());
            }
            Some(builder.finish::<HilbertSort>())
        };

        Self {
            boxes,
            tree,
            anchors,
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> &[TextBox] {
        &self.boxes
    }

    /// Every occurrence of a label, in insertion order.
    pub fn anchors(&self, label: &str) -> &[Anchor] {
        self.anchors
            .get(&anchor_key(label))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Boxes intersecting `bbox`, touching edges included.
    pub fn intersecting(&self, bbox: Rect) -> Vec<&TextBox> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let (x0, y0, x1, y1) = bbox;
        let mut ids: Vec<usize> = tree
            .search(x0, y0, x1, y1)
            .into_iter()
            .map(|id| id as usize)
            .filter(|&id| rects_intersect(self.boxes[id].bbox, bbox))
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| &self.boxes[id]).collect()
    }

    /// Concatenated text of the boxes intersecting `bbox`; empty when none do.
    pub fn text_in(&self, bbox: Rect) -> String {
        self.intersecting(bbox)
            .into_iter()
            .map(|b| b.text.as_str())
            .collect()
    }

    /// Up to `k` boxes whose centers lie closest to `point`, closest first.
    ///
    /// The tree is searched by edge distance: the `k` nearest boxes by edge
    /// give an upper bound on the `k`-th center distance, and every box
    /// within that bound by edge is then ranked by center.
    pub fn nearest(&self, point: Point, k: usize) -> Vec<&TextBox> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }
        let (x, y) = point;
        let bound = tree
            .neighbors_with_simple_distance(x, y, Some(k), None, &EdgeDistance)
            .into_iter()
            .map(|id| center_distance(point, &self.boxes[id as usize]))
            .fold(0.0, f64::max);
        let slack = bound * 1e-9 + 1e-9;

        let mut found: Vec<(usize, f64)> = tree
            .neighbors_with_simple_distance(x, y, None, Some(bound + slack), &EdgeDistance)
            .into_iter()
            .map(|id| (id as usize, center_distance(point, &self.boxes[id as usize])))
            .collect();
        found.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        found.truncate(k);
        found.into_iter().map(|(id, _)| &self.boxes[id]).collect()
    }
}
