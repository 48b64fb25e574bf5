//! Structured record of non-fatal failures.

use std::fmt;

use serde::Serialize;

use crate::error::ChartError;

/// What a diagnostic is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Subject {
    Chart(usize),
    Document,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Chart(n) => write!(f, "chart {n}"),
            Subject::Document => f.write_str("document"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub subject: Subject,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Failures that were isolated instead of aborting the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subject: Subject, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%subject, %message, "isolated failure");
        self.entries.push(Diagnostic { subject, message });
    }

    pub fn record(&mut self, subject: Subject, error: &ChartError) {
        self.push(subject, error.to_string());
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics tied to one chart.
    pub fn for_chart(&self, chart: usize) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(move |d| d.subject == Subject::Chart(chart))
    }
}
