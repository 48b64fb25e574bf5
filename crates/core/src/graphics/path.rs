//! Paths in drawing space.
//!
//! Drawing space is the native coordinate system of the source graphic:
//! x grows to the right and y grows downward. Segment geometry comes from
//! kurbo (`d` parsing, arcs converted to cubics, extrema, arc length);
//! this module adds gap detection and the shape tests used by the
//! classifier.

use kurbo::{BezPath, Line, ParamCurve, ParamCurveArclen, ParamCurveExtrema, PathSeg};

use crate::error::Result;
use crate::utils::{Point, Rect, points_close};

/// Accuracy of curve lengths, in drawing units.
const ARCLEN_ACCURACY: f64 = 1e-6;

fn to_point(p: kurbo::Point) -> Point {
    (p.x, p.y)
}

pub fn segment_start(segment: &PathSeg) -> Point {
    to_point(segment.start())
}

pub fn segment_end(segment: &PathSeg) -> Point {
    to_point(segment.end())
}

/// Vertices of one continuous run: every segment start plus the last end.
pub fn run_vertices(run: &[PathSeg]) -> Vec<Point> {
    let mut vertices: Vec<Point> = run.iter().map(segment_start).collect();
    if let Some(last) = run.last() {
        vertices.push(segment_end(last));
    }
    vertices
}

/// An ordered sequence of segments, possibly with gaps between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSeg>,
}

impl Path {
    pub fn new(segments: Vec<PathSeg>) -> Self {
        Self { segments }
    }

    /// A path made of one straight segment.
    pub fn line(start: Point, end: Point) -> Self {
        Self::new(vec![PathSeg::Line(Line::new(start, end))])
    }

    /// A path of straight segments joining consecutive points.
    pub fn polyline(points: &[Point]) -> Self {
        Self::new(
            points
                .windows(2)
                .map(|w| PathSeg::Line(Line::new(w[0], w[1])))
                .collect(),
        )
    }

    /// Parses an SVG `d` attribute. Move-only data gives an empty path.
    pub fn from_svg(d: &str) -> Result<Self> {
        let bez = BezPath::from_svg(d)?;
        Ok(Self::new(bez.segments().collect()))
    }

    /// Absolute SVG path data; a moveto is written at every gap.
    pub fn to_svg(&self) -> String {
        BezPath::from_path_segments(self.segments.iter().copied()).to_svg()
    }

    pub fn push(&mut self, segment: PathSeg) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[PathSeg] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(segment_start)
    }

    /// Final endpoint; `None` when the path has no drawn segment.
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(segment_end)
    }

    /// True when the path is exactly one straight segment.
    pub fn is_single_line(&self) -> bool {
        matches!(self.segments.as_slice(), [PathSeg::Line(_)])
    }

    /// True when the first segment is a cubic Bezier (filled point markers).
    pub fn starts_with_cubic(&self) -> bool {
        matches!(self.segments.first(), Some(PathSeg::Cubic(_)))
    }

    pub fn length(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.arclen(ARCLEN_ACCURACY))
            .sum()
    }

    /// Tight bounding box over every segment's extrema.
    pub fn bbox(&self) -> Option<Rect> {
        self.segments
            .iter()
            .map(ParamCurveExtrema::bounding_box)
            .reduce(|a, b| a.union(b))
            .map(|r| (r.x0, r.y0, r.x1, r.y1))
    }

    /// Splits the path into maximal runs of touching segments.
    ///
    /// A run ends wherever a segment does not start at the previous end,
    /// which is how missing data shows up in a drawn trend.
    pub fn continuous_subpaths(&self) -> Vec<&[PathSeg]> {
        let mut runs = Vec::new();
        let mut run_start = 0;
        for i in 1..self.segments.len() {
            if !points_close(segment_end(&self.segments[i - 1]), segment_start(&self.segments[i])) {
                runs.push(&self.segments[run_start..i]);
                run_start = i;
            }
        }
        if run_start < self.segments.len() {
            runs.push(&self.segments[run_start..]);
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;

    #[test]
    fn test_continuous_subpaths_split_on_gap() {
        let path = Path::from_svg("M0 0 L1 1 L2 0 M5 0 L6 1").unwrap();
        let runs = path.continuous_subpaths();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 1);
        assert_eq!(run_vertices(runs[0]), [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
    }

    #[test]
    fn test_cubic_bbox_includes_extrema() {
        // y(t) = 30t(1 - t), peaking at 7.5 for t = 0.5.
        let path = Path::from_svg("M0 0 C0 10 10 10 10 0").unwrap();
        assert!(path.starts_with_cubic());
        let (x0, y0, x1, y1) = path.bbox().unwrap();
        assert_eq!((x0, x1), (0.0, 10.0));
        assert_eq!(y0, 0.0);
        assert!((y1 - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_line_length_and_single_line() {
        let path = Path::line((0.0, 0.0), (3.0, 4.0));
        assert!(path.is_single_line());
        assert!((path.length() - 5.0).abs() < 1e-12);
        assert_eq!(path.end(), Some((3.0, 4.0)));
    }

    #[test]
    fn test_empty_path_has_no_end() {
        let path = Path::default();
        assert_eq!(path.end(), None);
        assert_eq!(path.bbox(), None);
        assert!(Path::from_svg("M 5 5").unwrap().is_empty());
    }

    #[test]
    fn test_semicircle_arc_bbox() {
        let path = Path::from_svg("M0 0 A5 5 0 0 1 10 0").unwrap();
        let (x0, y0, x1, y1) = path.bbox().unwrap();
        assert!(x0.abs() < 1e-6);
        assert!((x1 - 10.0).abs() < 1e-6);
        // Sweep flag set: with y growing downward the arc passes through y = -5.
        assert!((y0 + 5.0).abs() < 0.1);
        assert!(y1.abs() < 1e-6);
        assert!((path.length() - 5.0 * std::f64::consts::PI).abs() < 0.1);
    }

    #[test]
    fn test_relative_and_axis_aligned_commands() {
        let path = Path::from_svg("m1,1 2,0 0,2").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.end(), Some((3.0, 3.0)));

        let closed = Path::from_svg("M0 0H10V10Z").unwrap();
        assert_eq!(closed.len(), 3);
        assert_eq!(closed.end(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Path::from_svg("M 0 0 L x 1"),
            Err(ChartError::PathData(_))
        ));
    }

    #[test]
    fn test_svg_output_keeps_gaps() {
        let path = Path::from_svg("M0 0L1 1M5 5L6 6").unwrap();
        let reread = Path::from_svg(&path.to_svg()).unwrap();
        assert_eq!(reread, path);
        assert_eq!(reread.continuous_subpaths().len(), 2);
    }
}
