//! Extraction parameters.
//!
//! Every constant the heuristics depend on lives here so a run can be
//! retuned from a JSON file without recompiling. All structs fall back to
//! their defaults field by field.

use serde::Deserialize;

use crate::error::ChartError;
use crate::graphics::Color;
use crate::utils::Rect;

/// Axis extents of the normalized output space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisSpan {
    /// Percentage half-range: the top reference line maps to `+yspan`.
    pub yspan: f64,
    /// Whole days covered by the x axis; day indices run `1..=xspan + 1`.
    pub xspan: u32,
}

impl Default for AxisSpan {
    fn default() -> Self {
        Self {
            yspan: 80.0,
            xspan: 42,
        }
    }
}

/// Style literals that identify chart roles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Stroke color of the horizontal reference lines
    pub axis_stroke: Color,
    /// Stroke width of the horizontal reference lines
    pub axis_width: f64,
    /// Accepted deviation from `axis_width`
    pub width_tolerance: f64,
    /// Stroke color of trend curves, fill color of single-day markers
    pub accent: Color,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            axis_stroke: Color::rgb(0xda, 0xdc, 0xe0),
            axis_width: 1.19,
            width_tolerance: 0.005,
            accent: Color::rgb(0x42, 0x85, 0xf4),
        }
    }
}

/// Anchor-relative query rectangles for one class of page.
///
/// Each rectangle is `(left, bottom, right, top)` deltas added to the
/// anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OffsetSet {
    pub headline: Rect,
    pub title: Rect,
    pub xlabels: Rect,
    /// Region label box; `None` on pages that carry no region grouping
    #[serde(default)]
    pub region: Option<Rect>,
}

impl OffsetSet {
    /// One-chart-per-page layout of the leading pages.
    pub fn summary_page() -> Self {
        Self {
            headline: (-170.0, -20.0, -20.0, 30.0),
            title: (-170.0, 40.0, -20.0, 60.0),
            xlabels: (10.0, -40.0, 165.0, -35.0),
            region: None,
        }
    }

    /// Six- or twelve-chart grid layout of the remaining pages.
    pub fn grid_page() -> Self {
        Self {
            headline: (-10.0, 45.0, 140.0, 65.0),
            title: (-5.0, 70.0, 100.0, 90.0),
            xlabels: (10.0, -35.0, 165.0, -30.0),
            region: Some((-20.0, 100.0, 500.0, 140.0)),
        }
    }
}

/// Page geometry used by the text locator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Recurring label whose occurrences anchor each chart
    pub anchor_label: String,
    /// Fixed box on the first page holding the subject name and date
    pub heading_box: Rect,
    /// Pages laid out one chart per page
    pub summary_pages: Vec<u32>,
    /// Anchors with `bottom` above this belong to the upper grid half
    pub split_threshold: f64,
    pub summary_offsets: OffsetSet,
    pub grid_offsets: OffsetSet,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            anchor_label: "Baseline".to_string(),
            heading_box: (20.0, 740.0, 580.0, 780.0),
            summary_pages: vec![1, 2],
            split_threshold: 500.0,
            summary_offsets: OffsetSet::summary_page(),
            grid_offsets: OffsetSet::grid_page(),
        }
    }
}

impl LayoutConfig {
    pub fn is_summary_page(&self, page: u32) -> bool {
        self.summary_pages.contains(&page)
    }

    /// Offsets for the given 1-based page number.
    pub fn offsets_for(&self, page: u32) -> &OffsetSet {
        if self.is_summary_page(page) {
            &self.summary_offsets
        } else {
            &self.grid_offsets
        }
    }
}

/// How samples that round onto the same day index are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep the earliest drawn sample
    First,
    /// Keep the latest drawn sample
    #[default]
    Last,
    /// Average all samples of the day
    Mean,
}

/// Complete parameter set for one extraction run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub span: AxisSpan,
    pub classifier: ClassifierConfig,
    pub layout: LayoutConfig,
    /// Absolute difference (percentage points) reported as a threshold mismatch
    pub threshold: f64,
    pub collision: CollisionPolicy,
    /// Apply reading-order correction to grid pages
    pub reorder: bool,
    /// Worker threads for per-chart normalization; 0 uses the rayon default
    pub threads: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            span: AxisSpan::default(),
            classifier: ClassifierConfig::default(),
            layout: LayoutConfig::default(),
            threshold: 5.0,
            collision: CollisionPolicy::default(),
            reorder: true,
            threads: 0,
        }
    }
}

impl ExtractConfig {
    /// Parses a JSON overlay; absent fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: String| Err(ChartError::InvalidConfig(msg));
        if !(self.span.yspan.is_finite() && self.span.yspan > 0.0) {
            return invalid(format!("yspan must be positive, got {}", self.span.yspan));
        }
        if self.span.xspan == 0 {
            return invalid("xspan must be at least 1".to_string());
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return invalid(format!("threshold must not be negative, got {}", self.threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.span.yspan, 80.0);
        assert_eq!(config.span.xspan, 42);
        assert_eq!(config.threshold, 5.0);
        assert_eq!(config.collision, CollisionPolicy::Last);
        assert!(config.layout.is_summary_page(2));
        assert!(!config.layout.is_summary_page(3));
        assert_eq!(config.layout.offsets_for(1).region, None);
        assert!(config.layout.offsets_for(3).region.is_some());
    }

    #[test]
    fn test_partial_json_overlay() {
        let config = ExtractConfig::from_json(
            r##"{"span": {"xspan": 44}, "collision": "mean",
                 "classifier": {"accent": "#ff0000"}}"##,
        )
        .unwrap();
        assert_eq!(config.span.xspan, 44);
        assert_eq!(config.span.yspan, 80.0);
        assert_eq!(config.collision, CollisionPolicy::Mean);
        assert_eq!(config.classifier.accent, Color::rgb(255, 0, 0));
        assert_eq!(config.classifier.axis_width, 1.19);
        assert_eq!(config.layout.anchor_label, "Baseline");
    }

    #[test]
    fn test_rejects_unusable_spans() {
        let err = ExtractConfig::from_json(r#"{"span": {"yspan": -80}}"#).unwrap_err();
        assert!(matches!(err, ChartError::InvalidConfig(_)), "{err}");
        assert!(ExtractConfig::from_json(r#"{"span": {"xspan": 0}}"#).is_err());
        assert!(ExtractConfig::from_json(r#"{"threshold": -1}"#).is_err());
        assert!(ExtractConfig::default().validate().is_ok());
    }
}
