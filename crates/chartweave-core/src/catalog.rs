//! Placeholder catalog: where each placeholder sits in a skeleton and what it is expected to be.

use crate::placeholder::{Placeholder, is_placeholder, placeholders_in};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderGroup {
    Title,
    Legend,
    XAxis,
    YAxis,
    Series,
    General,
}

impl PlaceholderGroup {
    /// First match wins, tested as substrings of the dotted path.
    fn infer(path: &str) -> Self {
        let dotted = format!("{path}.");
        if dotted.contains("title.") {
            Self::Title
        } else if dotted.contains("legend.") {
            Self::Legend
        } else if dotted.contains("xAxis.") {
            Self::XAxis
        } else if dotted.contains("yAxis.") {
            Self::YAxis
        } else if dotted.contains("series[") {
            Self::Series
        } else {
            Self::General
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub name: Placeholder,
    pub variable_name: String,
    #[serde(rename = "type")]
    pub kind: PlaceholderKind,
    pub required: bool,
    pub group: PlaceholderGroup,
    pub target_path: String,
}

impl CatalogItem {
    fn new(name: Placeholder, kind: PlaceholderKind, path: &str) -> Self {
        Self {
            variable_name: name.variable().to_string(),
            name,
            kind,
            required: true,
            group: PlaceholderGroup::infer(path),
            target_path: path.to_string(),
        }
    }
}

/// Walks `skeleton` depth-first and records every placeholder occurrence.
///
/// A placeholder that occurs at several paths yields one item per occurrence.
pub fn generate(skeleton: &Value) -> Vec<CatalogItem> {
    let mut items = Vec::new();
    let mut path = String::from("$");
    walk(skeleton, &mut path, &mut items);
    tracing::debug!(items = items.len(), "placeholder catalog");
    items
}

fn walk(node: &Value, path: &mut String, out: &mut Vec<CatalogItem>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                walk(value, path, out);
                path.truncate(len);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{index}]"));
                walk(value, path, out);
                path.truncate(len);
            }
        }
        Value::String(text) if is_placeholder(text) => {
            if let Some(name) = Placeholder::parse(text) {
                out.push(CatalogItem::new(name, kind_for_path(path), path));
            }
        }
        Value::String(text) => {
            out.extend(
                placeholders_in(text).map(|name| CatalogItem::new(name, PlaceholderKind::String, path)),
            );
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// `series[i].data` and `xAxis.data` hold arrays; everything else is a string until bound.
fn kind_for_path(path: &str) -> PlaceholderKind {
    let is_data = path.ends_with(".data");
    if is_data && (path.contains("series[") || path.contains("xAxis.")) {
        PlaceholderKind::Array
    } else {
        PlaceholderKind::String
    }
}

/// Distinct required placeholders of a catalog.
pub fn required_placeholders(items: &[CatalogItem]) -> BTreeSet<Placeholder> {
    items
        .iter()
        .filter(|item| item.required)
        .map(|item| item.name.clone())
        .collect()
}

/// Catalog of one chart, as handed to mapping editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderCatalog {
    pub chart_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    pub placeholders: Vec<CatalogItem>,
}

impl PlaceholderCatalog {
    pub fn new(chart_id: impl Into<String>, skeleton: &Value) -> Self {
        Self {
            chart_id: chart_id.into(),
            template_version: None,
            spec_version: None,
            placeholders: generate(skeleton),
        }
    }

    pub fn with_versions(
        mut self,
        template_version: Option<String>,
        spec_version: Option<String>,
    ) -> Self {
        self.template_version = template_version;
        self.spec_version = spec_version;
        self
    }

    pub fn required_placeholders(&self) -> BTreeSet<Placeholder> {
        required_placeholders(&self.placeholders)
    }

    /// The first catalog entry for `placeholder`.
    pub fn item(&self, placeholder: &str) -> Option<&CatalogItem> {
        self.placeholders
            .iter()
            .find(|item| item.name.as_str() == placeholder)
    }
}
