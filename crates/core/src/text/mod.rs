//! Spatial text location on laid-out report pages.

mod index;
mod page;
mod summary;

pub use index::{Anchor, TextBox, TextIndex, anchor_key};
pub use page::{PageLayout, PageText, PlotGroup, PlotLabels, read_layouts, reading_order};
pub use summary::{PlotSummary, summarise};
