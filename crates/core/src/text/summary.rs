//! Per-chart summaries of a whole report.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::{ChartError, Result};

use super::page::{PageLayout, PageText, PlotGroup};

/// Printed labels of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSummary {
    /// Emission date as printed in the heading
    pub date_string: String,
    pub country: String,
    pub region: String,
    pub page_num: u32,
    /// 1-based, sequential across the document
    pub plot_num: usize,
    /// Title with footnote asterisks removed
    pub plot_name: String,
    /// Whether the title carried a footnote asterisk
    pub asterisk: bool,
    pub headline: String,
    pub xlabels: Vec<String>,
}

/// Summarises every chart of a report.
///
/// Page 1 must carry the heading with the subject name and emission date.
/// Pages are indexed in parallel; numbering follows page order.
pub fn summarise(pages: Vec<PageLayout>, layout: &LayoutConfig) -> Result<Vec<PlotSummary>> {
    let mut groups: Vec<(PageText, Vec<PlotGroup>)> = pages
        .into_par_iter()
        .map(|page| {
            let text = PageText::new(page);
            let groups = text.plots(layout);
            (text, groups)
        })
        .collect();
    groups.sort_by_key(|(text, _)| text.page);

    let first = groups
        .iter()
        .find(|(text, _)| text.page == 1)
        .ok_or(ChartError::MissingHeading { page: 1 })?;
    let (country, date_string) = first.0.heading(layout)?;

    let mut summaries = Vec::new();
    for (text, page_groups) in &groups {
        for group in page_groups {
            let region = group.region.clone().unwrap_or_else(|| country.clone());
            for plot in &group.plots {
                summaries.push(PlotSummary {
                    date_string: date_string.clone(),
                    country: country.clone(),
                    region: region.clone(),
                    page_num: text.page,
                    plot_num: summaries.len() + 1,
                    plot_name: plot.plot_name.replace('*', ""),
                    asterisk: plot.plot_name.contains('*'),
                    headline: plot.headline.clone(),
                    xlabels: plot.xlabels.clone(),
                });
            }
        }
    }
    tracing::debug!(plots = summaries.len(), %country, "summarised report");
    Ok(summaries)
}
