//! SVG surface reader and subplot writer.
//!
//! Reads `<path>`, `<line>`, `<polyline>` and `<polygon>` elements in
//! document order. Group transforms are not applied: chart renderings
//! place every primitive in one drawing space.

use std::path::Path as FsPath;

use kurbo::{Line, PathSeg};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use rustc_hash::FxHashMap;

use crate::error::{ChartError, Result};
use crate::utils::{Point, get_bound};

use super::path::Path;
use super::style::StyleDescriptor;
use super::Primitive;

/// Primitives read from one SVG surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgGraphics {
    /// Primitives in draw order
    pub primitives: Vec<Primitive>,
    /// Elements whose geometry could not be parsed (kept as empty paths)
    pub warnings: Vec<String>,
}

/// Element attributes by local name.
struct AttrMap {
    attrs: FxHashMap<String, String>,
}

impl AttrMap {
    fn from_event(e: &BytesStart<'_>) -> Self {
        let mut attrs = FxHashMap::default();
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
            };
            attrs.insert(key, value);
        }
        Self { attrs }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn get_f64(&self, key: &str) -> f64 {
        self.get(key)
            .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
            .unwrap_or(0.0)
    }

    /// Presentation attributes first, then the `style` attribute on top.
    fn style(&self) -> Option<StyleDescriptor> {
        let presentation = ["stroke", "fill", "stroke-width"];
        let has_presentation = presentation.iter().any(|k| self.attrs.contains_key(*k));
        let css = self.get("style");
        if !has_presentation && css.is_none() {
            return None;
        }
        let mut style = StyleDescriptor::default();
        for key in presentation {
            if let Some(value) = self.get(key) {
                style.apply(key, value);
            }
        }
        if let Some(css) = css {
            style.apply_css(css);
        }
        Some(style)
    }
}

/// Parses a `points` list. A coordinate that is not a number, or an odd
/// coordinate count, rejects the whole list.
fn parse_points(points: &str) -> Result<Vec<Point>> {
    let coords = points
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| ChartError::PointList(format!("bad coordinate {s:?}")))
        })
        .collect::<Result<Vec<f64>>>()?;
    if coords.len() % 2 != 0 {
        return Err(ChartError::PointList(format!(
            "odd number of coordinates ({})",
            coords.len()
        )));
    }
    Ok(coords.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}

fn polygon(points: &[Point]) -> Path {
    let mut path = Path::polyline(points);
    if let (Some(&first), Some(&last)) = (points.first(), points.last())
        && points.len() > 1
        && first != last
    {
        path.push(PathSeg::Line(Line::new(last, first)));
    }
    path
}

fn element_path(tag: &str, attrs: &AttrMap) -> Option<Result<Path>> {
    let points = || parse_points(attrs.get("points").unwrap_or_default());
    match tag {
        "path" => Some(Path::from_svg(attrs.get("d").unwrap_or_default())),
        "line" => Some(Ok(Path::line(
            (attrs.get_f64("x1"), attrs.get_f64("y1")),
            (attrs.get_f64("x2"), attrs.get_f64("y2")),
        ))),
        "polyline" => Some(points().map(|p| Path::polyline(&p))),
        "polygon" => Some(points().map(|p| polygon(&p))),
        _ => None,
    }
}

/// Reads drawn primitives from SVG text.
pub fn read_svg(content: &str) -> Result<SvgGraphics> {
    let mut graphics = SvgGraphics::default();
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let attrs = AttrMap::from_event(&e);
                if let Some(parsed) = element_path(&tag, &attrs) {
                    let path = parsed.unwrap_or_else(|err| {
                        tracing::warn!(element = %tag, error = %err, "unparseable geometry");
                        graphics
                            .warnings
                            .push(format!("<{tag}> #{}: {err}", graphics.primitives.len() + 1));
                        Path::default()
                    });
                    graphics.primitives.push(Primitive::new(path, attrs.style()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(primitives = graphics.primitives.len(), "read svg surface");
    Ok(graphics)
}

/// Reads drawn primitives from an SVG file.
pub fn read_svg_file(path: &FsPath) -> Result<SvgGraphics> {
    let content = std::fs::read_to_string(path)?;
    read_svg(&content)
}

/// Fraction of the content size added around it in the written viewBox.
const VIEWBOX_MARGIN: f64 = 0.1;

/// Writes primitives to a standalone SVG document.
pub fn write_svg<'a, I>(primitives: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Primitive>,
{
    let primitives: Vec<&Primitive> = primitives.into_iter().collect();
    let boxes: Vec<_> = primitives.iter().filter_map(|p| p.path.bbox()).collect();
    let (x0, y0, x1, y1) = if boxes.is_empty() {
        (0.0, 0.0, 1.0, 1.0)
    } else {
        get_bound(boxes.iter().flat_map(|b| [(b.0, b.1), (b.2, b.3)]))
    };
    let dx = (x1 - x0).max(1.0) * VIEWBOX_MARGIN;
    let dy = (y1 - y0).max(1.0) * VIEWBOX_MARGIN;
    let view_box = format!(
        "{} {} {} {}",
        x0 - dx,
        y0 - dy,
        (x1 - x0) + 2.0 * dx,
        (y1 - y0) + 2.0 * dy
    );

    let xml_err = |e: quick_xml::Error| ChartError::Xml(e.to_string());
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    svg.push_attribute(("version", "1.1"));
    svg.push_attribute(("viewBox", view_box.as_str()));
    writer.write_event(Event::Start(svg)).map_err(xml_err)?;

    for primitive in primitives {
        if primitive.path.is_empty() {
            continue;
        }
        let d = primitive.path.to_svg();
        let mut elem = BytesStart::new("path");
        elem.push_attribute(("d", d.as_str()));
        if let Some(style) = &primitive.style {
            let css = style.to_css();
            elem.push_attribute(("style", css.as_str()));
        }
        writer.write_event(Event::Empty(elem)).map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("svg")))
        .map_err(xml_err)?;
    String::from_utf8(writer.into_inner()).map_err(|e| ChartError::Xml(e.to_string()))
}
