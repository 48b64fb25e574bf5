//! Miscellaneous routines shared by the graphics and text pipelines.
//!
//! Provides:
//! - Geometric vocabulary (Point, Rect, HasBBox)
//! - Bounding box helpers
//! - Rounding that matches banker's rounding of the source charts' tooling

/// Floating-point infinity for bounding box calculations.
pub const INF_F64: f64 = f64::MAX;

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is the minimum
/// corner and (x1, y1) the maximum corner.
pub type Rect = (f64, f64, f64, f64);

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Compares two points for approximate equality.
#[inline]
pub fn points_close(a: Point, b: Point) -> bool {
    approx_eq(a.0, b.0, EPSILON) && approx_eq(a.1, b.1, EPSILON)
}

/// Trait for objects that have a bounding box.
pub trait HasBBox {
    fn x0(&self) -> f64;
    fn y0(&self) -> f64;
    fn x1(&self) -> f64;
    fn y1(&self) -> f64;

    fn bbox(&self) -> Rect {
        (self.x0(), self.y0(), self.x1(), self.y1())
    }

    fn width(&self) -> f64 {
        self.x1() - self.x0()
    }

    fn height(&self) -> f64 {
        self.y1() - self.y0()
    }
}

/// Returns the tightest rectangle containing all points.
pub fn get_bound<I: IntoIterator<Item = Point>>(pts: I) -> Rect {
    let mut x0 = INF_F64;
    let mut y0 = INF_F64;
    let mut x1 = -INF_F64;
    let mut y1 = -INF_F64;

    for (x, y) in pts {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }

    (x0, y0, x1, y1)
}

/// Returns the center of a rectangle.
#[inline]
pub fn rect_center(rect: Rect) -> Point {
    ((rect.0 + rect.2) / 2.0, (rect.1 + rect.3) / 2.0)
}

/// Inclusive rectangle intersection (touching edges count).
#[inline]
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.0 <= b.2 && b.0 <= a.2 && a.1 <= b.3 && b.1 <= a.3
}

/// Rounds half to even, e.g. `2.5 -> 2`, `3.5 -> 4`.
#[inline]
pub fn round_half_even(x: f64) -> f64 {
    x.round_ties_even()
}

/// Rounds to a power of ten, half to even: `round_to_digits(1234.0, -2) == 1200.0`.
pub fn round_to_digits(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(-digits);
    (x / scale).round_ties_even() * scale
}
