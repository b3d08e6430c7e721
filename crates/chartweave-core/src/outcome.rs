//! Best-effort results.
//!
//! Binding never fails outright: an unmapped placeholder or an empty selection degrades to a
//! default value. `Outcome` keeps that value together with the diagnostics explaining each
//! degradation so callers can pick strict or lenient handling.

use crate::placeholder::Placeholder;
use crate::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticKind {
    #[error("no mapping configured; inferred a default mapping")]
    Unmapped,

    #[error("filters matched no rows")]
    EmptySelection,

    #[error("numeric aggregation skipped {skipped} non-numeric value(s)")]
    NonNumeric { skipped: usize },

    #[error("no row exposes field `{field}`")]
    UnknownField { field: String },

    #[error("series `{requested}` not found; used `{used}`")]
    SeriesFallback { requested: String, used: String },

    #[error("category `{category}` held {dropped} extra value(s); kept the first")]
    CellCollapsed { category: String, dropped: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub placeholder: Placeholder,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(placeholder: Placeholder, kind: DiagnosticKind) -> Self {
        Self { placeholder, kind }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.placeholder, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    pub fn clean(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Keeps the best-effort value and drops the diagnostics.
    pub fn lenient(self) -> T {
        self.value
    }

    /// Fails with [`Error::Binding`] if anything was degraded.
    pub fn strict(self) -> Result<T> {
        if self.diagnostics.is_empty() {
            return Ok(self.value);
        }
        let summary = self
            .diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::Binding {
            summary,
            diagnostics: self.diagnostics,
        })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}
