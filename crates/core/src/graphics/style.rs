//! Style descriptors: stroke color, stroke width and fill color.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `#rgb` or `rgb(r, g, b)`. Returns `None` for
    /// `none`, `transparent` and anything unrecognised.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return match hex.len() {
                6 => Some(Self::rgb(
                    u8::from_str_radix(&hex[0..2], 16).ok()?,
                    u8::from_str_radix(&hex[2..4], 16).ok()?,
                    u8::from_str_radix(&hex[4..6], 16).ok()?,
                )),
                3 => {
                    let digit = |i: usize| {
                        u8::from_str_radix(&hex[i..i + 1], 16)
                            .ok()
                            .map(|d| d * 17)
                    };
                    Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
                }
                _ => None,
            };
        }
        let inner = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))?;
        let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>().ok());
        let color = Self::rgb(
            channels.next()??,
            channels.next()??,
            channels.next()??,
        );
        channels.next().is_none().then_some(color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid color {raw:?}")))
    }
}

/// Resolved paint attributes of a drawn primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDescriptor {
    /// Stroking color, `None` for `stroke:none`
    pub stroke: Option<Color>,
    /// Stroke width in device units
    pub stroke_width: Option<f64>,
    /// Fill color, `None` for `fill:none`
    pub fill: Option<Color>,
}

impl StyleDescriptor {
    /// Parses an inline CSS `style` attribute (`stroke:#dadce0;stroke-width:1.19px`).
    pub fn from_css(style: &str) -> Self {
        let mut descriptor = Self::default();
        descriptor.apply_css(style);
        descriptor
    }

    /// Applies every declaration of a CSS declaration list, later ones winning.
    pub fn apply_css(&mut self, style: &str) {
        for declaration in style.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                self.apply(property.trim(), value.trim());
            }
        }
    }

    /// Applies one property. Unknown properties are ignored.
    pub fn apply(&mut self, property: &str, value: &str) {
        match property {
            "stroke" => self.stroke = Color::parse(value),
            "fill" => self.fill = Color::parse(value),
            "stroke-width" => self.stroke_width = parse_length(value),
            _ => {}
        }
    }

    /// Serializes back to an inline CSS declaration list.
    pub fn to_css(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        parts.push(match self.fill {
            Some(c) => format!("fill:{c}"),
            None => "fill:none".to_string(),
        });
        if let Some(c) = self.stroke {
            parts.push(format!("stroke:{c}"));
        }
        if let Some(w) = self.stroke_width {
            parts.push(format!("stroke-width:{w}px"));
        }
        parts.join(";")
    }
}

/// Parses a CSS length, dropping a trailing `px`.
fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}
