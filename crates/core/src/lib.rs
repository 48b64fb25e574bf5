//! chartmine - recover calendar-indexed time series from vector chart renderings.
//!
//! A report is consumed as two inputs: the chart graphics (an SVG surface
//! with every chart's reference lines and trend curves in draw order) and
//! the laid-out page text. The graphics become per-chart
//! `(day_index, value)` series, the text becomes per-chart summaries, and
//! the two are joined on chart number and cross-checked.

pub mod assets;
pub mod chart;
pub mod compare;
pub mod config;
pub mod dates;
pub mod diagnostics;
pub mod error;
pub mod graphics;
pub mod pipeline;
pub mod reconcile;
pub mod records;
pub mod text;
pub mod utils;

pub use config::ExtractConfig;
pub use error::{ChartError, Result};
