//! Role classification of drawn primitives.
//!
//! Charts carry no data attributes, only paint. A primitive's role is read
//! off its stroke and fill together with its topology, first match wins:
//!
//! 1. no end point or no style: [`Role::Discard`]
//! 2. neutral gray stroke of the reference width, one straight segment: [`Role::AxisLine`]
//! 3. accent stroke: [`Role::TrendCurve`]
//! 4. accent fill and a leading cubic segment: [`Role::TrendPoint`]

use crate::config::ClassifierConfig;
use crate::graphics::{Path, Primitive, StyleDescriptor};
use crate::utils::{Point, approx_eq};

/// Semantic role of a drawn primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Horizontal reference stroke (bottom, gridline, baseline or top)
    AxisLine,
    /// Continuous drawn trend, possibly with gaps
    TrendCurve,
    /// Filled marker for an isolated single day
    TrendPoint,
    /// Decoration or unresolvable primitive
    Discard,
}

impl Role {
    pub fn is_trend(self) -> bool {
        matches!(self, Role::TrendCurve | Role::TrendPoint)
    }
}

/// A classified primitive. Never mutated after classification; the
/// fragmentation correction builds a reclassified copy instead.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicElement {
    pub role: Role,
    pub path: Path,
    pub style: Option<StyleDescriptor>,
}

impl GraphicElement {
    pub fn new(role: Role, path: Path, style: Option<StyleDescriptor>) -> Self {
        Self { role, path, style }
    }

    /// Start of the first segment.
    pub fn start(&self) -> Option<Point> {
        self.path.start()
    }

    /// Copy of this element carrying another role.
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}

/// Returns the role of one primitive.
pub fn classify(path: &Path, style: Option<&StyleDescriptor>, config: &ClassifierConfig) -> Role {
    let Some(style) = style else {
        return Role::Discard;
    };
    if path.end().is_none() {
        return Role::Discard;
    }

    let axis_width = style
        .stroke_width
        .is_some_and(|w| approx_eq(w, config.axis_width, config.width_tolerance));
    if style.stroke == Some(config.axis_stroke) && axis_width && path.is_single_line() {
        return Role::AxisLine;
    }
    if style.stroke == Some(config.accent) {
        return Role::TrendCurve;
    }
    if style.fill == Some(config.accent) && path.starts_with_cubic() {
        return Role::TrendPoint;
    }
    Role::Discard
}

/// Classifies a primitive stream, preserving draw order.
pub fn classify_all<I>(primitives: I, config: &ClassifierConfig) -> Vec<GraphicElement>
where
    I: IntoIterator<Item = Primitive>,
{
    primitives
        .into_iter()
        .map(|Primitive { path, style }| {
            let role = classify(&path, style.as_ref(), config);
            GraphicElement::new(role, path, style)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(css: &str) -> StyleDescriptor {
        StyleDescriptor::from_css(css)
    }

    #[test]
    fn test_axis_line() {
        let config = ClassifierConfig::default();
        let path = Path::line((0.0, 10.0), (100.0, 10.0));
        let s = style("fill:none;stroke:#dadce0;stroke-width:1.19px");
        assert_eq!(classify(&path, Some(&s), &config), Role::AxisLine);
    }

    #[test]
    fn test_gray_of_other_width_is_discarded() {
        let config = ClassifierConfig::default();
        let path = Path::line((0.0, 10.0), (100.0, 10.0));
        let s = style("stroke:#dadce0;stroke-width:2px");
        assert_eq!(classify(&path, Some(&s), &config), Role::Discard);
    }

    #[test]
    fn test_gray_polyline_is_not_axis() {
        let config = ClassifierConfig::default();
        let path = Path::polyline(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let s = style("stroke:#dadce0;stroke-width:1.19px");
        assert_eq!(classify(&path, Some(&s), &config), Role::Discard);
    }

    #[test]
    fn test_trend_curve_and_point() {
        let config = ClassifierConfig::default();
        let curve = Path::polyline(&[(0.0, 0.0), (5.0, 3.0), (10.0, 1.0)]);
        assert_eq!(
            classify(&curve, Some(&style("stroke:#4285f4;fill:none")), &config),
            Role::TrendCurve
        );

        let dot = Path::from_svg("M 10 10 C 10 12 12 12 12 10 C 12 8 10 8 10 10 Z").unwrap();
        assert_eq!(
            classify(&dot, Some(&style("fill:#4285f4;stroke:none")), &config),
            Role::TrendPoint
        );

        let square = Path::polyline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            classify(&square, Some(&style("fill:#4285f4")), &config),
            Role::Discard
        );
    }

    #[test]
    fn test_missing_style_or_end() {
        let config = ClassifierConfig::default();
        let line = Path::line((0.0, 0.0), (1.0, 0.0));
        assert_eq!(classify(&line, None, &config), Role::Discard);
        assert_eq!(
            classify(&Path::default(), Some(&style("stroke:#4285f4")), &config),
            Role::Discard
        );
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let config = ClassifierConfig::default();
        let primitives = vec![
            Primitive::new(
                Path::line((0.0, 1.0), (9.0, 1.0)),
                Some(style("stroke:#dadce0;stroke-width:1.19px")),
            ),
            Primitive::new(Path::line((0.0, 2.0), (4.0, 3.0)), Some(style("stroke:#4285f4"))),
            Primitive::new(Path::line((0.0, 0.0), (1.0, 1.0)), None),
        ];
        let roles: Vec<Role> = classify_all(primitives, &config)
            .iter()
            .map(|e| e.role)
            .collect();
        assert_eq!(roles, [Role::AxisLine, Role::TrendCurve, Role::Discard]);
    }
}
