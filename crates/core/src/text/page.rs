//! Anchor-relative label lookup on one report page.
//!
//! Every chart carries a "Baseline" tick label. Its bottom-left corner is
//! the origin for the boxes holding the chart's headline figure, title and
//! x-axis labels. The first two pages lay out one chart per row and use
//! their own offsets; later pages are grids split into an upper and a lower
//! region, each with its own region label.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::LayoutConfig;
use crate::error::{ChartError, Result};
use crate::utils::round_to_digits;

use super::index::{Anchor, TextBox, TextIndex};

/// Text boxes of one page as delivered by a layout extractor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageLayout {
    /// 1-based page number
    pub page: u32,
    pub boxes: Vec<TextBox>,
}

/// Reads page layouts from a JSON array.
pub fn read_layouts(path: &Path) -> Result<Vec<PageLayout>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn date_regex() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| Regex::new(r"\w+ \d+, \d+").unwrap())
}

/// Labels found around one anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLabels {
    pub anchor: Anchor,
    /// Title; a trailing `*` per footnoted baseline label
    pub plot_name: String,
    pub headline: String,
    /// X-axis labels, left to right
    pub xlabels: Vec<String>,
}

/// Charts sharing a region label.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotGroup {
    /// `None` on summary pages, where the document subject is the region
    pub region: Option<String>,
    pub plots: Vec<PlotLabels>,
}

/// Indexed text of one page.
#[derive(Debug)]
pub struct PageText {
    pub page: u32,
    index: TextIndex,
}

impl PageText {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            page: layout.page,
            index: TextIndex::new(layout.boxes),
        }
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    /// Subject name and emission date from the first-page heading box.
    pub fn heading(&self, layout: &LayoutConfig) -> Result<(String, String)> {
        let text = self.index.text_in(layout.heading_box);
        let date = date_regex()
            .find(&text)
            .ok_or(ChartError::MissingHeading { page: self.page })?
            .as_str()
            .to_string();
        let name = date_regex().replace_all(&text, "").trim().to_string();
        Ok((name, date))
    }

    /// Headline figure with footnote markers and boilerplate removed.
    pub fn headline(&self, anchor: Anchor, layout: &LayoutConfig) -> String {
        let offsets = layout.offsets_for(self.page);
        self.index
            .text_in(anchor.region(offsets.headline))
            .replace("*\n", "")
            .replace('*', "")
            .replace("compared to baseline", "")
            .trim()
            .to_string()
    }

    /// Chart title. A "baseline" footnote fragment inside the title box is
    /// dropped and turned into a trailing asterisk.
    pub fn plot_name(&self, anchor: Anchor, layout: &LayoutConfig) -> String {
        let offsets = layout.offsets_for(self.page);
        let mut boxes = self.index.intersecting(anchor.region(offsets.title));
        boxes.sort_by(|a, b| {
            a.bbox
                .partial_cmp(&b.bbox)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut name: String = boxes
            .iter()
            .map(|b| b.text.as_str())
            .filter(|t| !t.contains("baseline") && !t.starts_with("*\n"))
            .collect();
        for _ in boxes.iter().filter(|b| b.text.contains("baseline")) {
            name.push('*');
        }
        name
    }

    /// Region label above a grid half; `None` on pages without regions.
    pub fn region(&self, anchor: Anchor, layout: &LayoutConfig) -> Option<String> {
        let offset = layout.offsets_for(self.page).region?;
        Some(self.index.text_in(anchor.region(offset)))
    }

    /// X-axis labels below the chart, left to right.
    pub fn xlabels(&self, anchor: Anchor, layout: &LayoutConfig) -> Vec<String> {
        let offsets = layout.offsets_for(self.page);
        let mut boxes = self.index.intersecting(anchor.region(offsets.xlabels));
        boxes.sort_by(|a, b| a.bbox.0.partial_cmp(&b.bbox.0).unwrap_or(std::cmp::Ordering::Equal));
        boxes.into_iter().map(|b| b.text.clone()).collect()
    }

    fn labels(&self, anchor: Anchor, layout: &LayoutConfig) -> PlotLabels {
        PlotLabels {
            anchor,
            plot_name: self.plot_name(anchor, layout),
            headline: self.headline(anchor, layout),
            xlabels: self.xlabels(anchor, layout),
        }
    }

    /// All charts on the page, grouped by region and in reading order.
    pub fn plots(&self, layout: &LayoutConfig) -> Vec<PlotGroup> {
        let anchors = self.index.anchors(&layout.anchor_label);
        if anchors.is_empty() {
            tracing::debug!(page = self.page, "no chart anchors");
            return Vec::new();
        }

        if layout.is_summary_page(self.page) {
            let plots = anchors.iter().map(|&a| self.labels(a, layout)).collect();
            return vec![PlotGroup {
                region: None,
                plots: reading_order(plots),
            }];
        }

        let (upper, lower): (Vec<Anchor>, Vec<Anchor>) = anchors
            .iter()
            .copied()
            .partition(|a| a.bottom > layout.split_threshold);
        [upper, lower]
            .into_iter()
            .filter(|half| !half.is_empty())
            .map(|half| {
                let plots =
                    reading_order(half.into_iter().map(|a| self.labels(a, layout)).collect());
                let region = self.region(plots[0].anchor, layout);
                PlotGroup { region, plots }
            })
            .collect()
    }
}

/// Sorts rows top to bottom, then left to right, on a 10-unit grid.
pub fn reading_order(mut plots: Vec<PlotLabels>) -> Vec<PlotLabels> {
    let bucket = |v: f64| round_to_digits(v, -1) as i64;
    plots.sort_by_key(|p| (-bucket(p.anchor.bottom), bucket(p.anchor.left)));
    plots
}
