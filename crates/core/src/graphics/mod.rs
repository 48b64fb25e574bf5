//! Drawn primitives: geometry, paint style and the SVG surface they come from.
//!
//! - `path`: paths in drawing space, parsed from SVG `d` data
//! - `style`: stroke/fill descriptors
//! - `svg`: reading primitives from, and writing them back to, SVG documents

mod path;
mod style;
mod svg;

pub use path::{Path, run_vertices};
pub use style::{Color, StyleDescriptor};
pub use svg::{SvgGraphics, read_svg, read_svg_file, write_svg};

/// One drawn primitive in document draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Geometry; empty when the source had no drawable segment
    pub path: Path,
    /// Paint attributes; `None` when the source carried no style at all
    pub style: Option<StyleDescriptor>,
}

impl Primitive {
    pub fn new(path: Path, style: Option<StyleDescriptor>) -> Self {
        Self { path, style }
    }
}
