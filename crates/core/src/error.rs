//! Error types for the chartmine extraction library.

use thiserror::Error;

/// Primary error type for chart extraction operations.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart {chart}: expected 5 (or 3 resolved) axis lines, found {found}")]
    MalformedChart { chart: usize, found: usize },

    #[error("chart {chart}: reference lines span zero width or height")]
    DegenerateAxis { chart: usize },

    #[error("expected one shared date axis per document, found {count} distinct")]
    NonUniqueDateAxis { count: usize },

    #[error("no date axis labels found in document")]
    MissingDateAxis,

    #[error("cannot parse date: {0}")]
    DateParse(String),

    #[error("invalid path data: {0}")]
    PathData(#[from] kurbo::SvgParseError),

    #[error("invalid points list: {0}")]
    PointList(String),

    #[error("SVG syntax error: {0}")]
    Xml(String),

    #[error("page {page}: heading with name and emission date not found")]
    MissingHeading { page: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot build worker pool: {0}")]
    ThreadPool(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for ChartError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Convenience Result type alias for ChartError.
pub type Result<T> = std::result::Result<T, ChartError>;
