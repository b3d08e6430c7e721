//! Field mappings and the per-chart mapping store.

use crate::placeholder::Placeholder;
use crate::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Array,
    Boolean,
    Object,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// The value an empty `none` aggregation resolves to.
    pub fn default_value(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Number => Value::from(0),
            Self::Array => Value::Array(Vec::new()),
            Self::Boolean => Value::Bool(false),
            Self::Object => Value::Object(Map::new()),
        }
    }

    /// Runtime type of a resolved value. `null` has none.
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(_) => Some(Self::Number),
            Value::String(_) => Some(Self::String),
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    None,
    Sum,
    Avg,
    Count,
    Max,
    Min,
    List,
}

impl Aggregation {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Sum | Self::Avg | Self::Max | Self::Min)
    }
}

impl std::str::FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "sum" => Ok(Self::Sum),
            "avg" | "average" => Ok(Self::Avg),
            "count" => Ok(Self::Count),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            "list" => Ok(Self::List),
            other => Err(Error::InvalidMapping {
                message: format!("unknown aggregation `{other}`"),
            }),
        }
    }
}

/// Binding of one placeholder to a source column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub field_name: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default, alias = "aggregation")]
    pub aggregation_type: Aggregation,
    /// Conjunctive equality predicates: `field -> expected value`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, Value>,
    /// Carried through untouched; never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_expression: Option<String>,
}

impl FieldMapping {
    pub fn new(field_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            field_name: field_name.into(),
            data_type,
            ..Self::default()
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation_type = aggregation;
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn with_transform_expression(mut self, expression: impl Into<String>) -> Self {
        self.transform_expression = Some(expression.into());
        self
    }
}

/// Placeholder -> mapping for one chart.
pub type MappingSet = IndexMap<Placeholder, FieldMapping>;

/// Guesses a mapping from the placeholder's variable name.
pub fn infer_default(placeholder: &Placeholder) -> FieldMapping {
    let name = placeholder.variable().to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if has(&["category", "categories"]) {
        FieldMapping::new("category", DataType::Array).with_aggregation(Aggregation::List)
    } else if has(&["amount", "value"]) {
        FieldMapping::new("amount", DataType::Number)
    } else if has(&["quantity", "count"]) {
        FieldMapping::new("quantity", DataType::Number)
    } else if has(&["region"]) {
        FieldMapping::new("region", DataType::String)
    } else if has(&["product"]) {
        FieldMapping::new("product", DataType::String)
    } else if has(&["channel"]) {
        FieldMapping::new("channel", DataType::String)
    } else {
        FieldMapping::new("category", DataType::String)
    }
}

pub fn default_mappings<'a>(placeholders: impl IntoIterator<Item = &'a Placeholder>) -> MappingSet {
    placeholders
        .into_iter()
        .map(|p| (p.clone(), infer_default(p)))
        .collect()
}

/// Parses a JSON mapping document: `{ "${token}" | "variable": FieldMapping, ... }`.
pub fn parse_mapping_document(text: &str) -> Result<MappingSet> {
    let raw: IndexMap<String, FieldMapping> =
        serde_json::from_str(text).map_err(|e| Error::InvalidMapping {
            message: e.to_string(),
        })?;
    raw.into_iter()
        .map(|(key, mapping)| {
            let placeholder =
                Placeholder::from_token_or_variable(&key).ok_or_else(|| Error::InvalidMapping {
                    message: format!("invalid placeholder key `{key}`"),
                })?;
            Ok((placeholder, mapping))
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
struct ChartMappings {
    revision: u64,
    mappings: MappingSet,
}

#[derive(Debug, Default)]
struct StoreState {
    active: FxHashMap<String, ChartMappings>,
    // chart id -> version id -> draft, in save order
    drafts: FxHashMap<String, IndexMap<String, MappingSet>>,
}

/// In-memory, internally synchronized mapping store.
///
/// Every write replaces a whole per-chart set under the write lock, so readers observe either the
/// previous or the next set, never a mix.
#[derive(Debug, Default)]
pub struct MappingStore {
    inner: RwLock<StoreState>,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the mapping set of `chart_id`.
    pub fn configure(&self, chart_id: &str, mappings: MappingSet) {
        let mut state = self.write();
        let entry = state.active.entry(chart_id.to_string()).or_default();
        entry.revision += 1;
        entry.mappings = mappings;
        tracing::debug!(chart_id, revision = entry.revision, "mapping configured");
    }

    /// A copy of the current set; empty if `chart_id` was never configured.
    pub fn get(&self, chart_id: &str) -> MappingSet {
        self.read()
            .active
            .get(chart_id)
            .map(|entry| entry.mappings.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, chart_id: &str) -> bool {
        self.read().active.contains_key(chart_id)
    }

    /// Number of `configure` calls applied to `chart_id` (0 if never configured).
    pub fn revision(&self, chart_id: &str) -> u64 {
        self.read()
            .active
            .get(chart_id)
            .map_or(0, |entry| entry.revision)
    }

    /// Deep-copies the source set onto `target_id`. Returns `false` if the source is unconfigured.
    pub fn copy(&self, source_id: &str, target_id: &str) -> bool {
        let mut state = self.write();
        let Some(mappings) = state
            .active
            .get(source_id)
            .map(|entry| entry.mappings.clone())
        else {
            return false;
        };
        let target = state.active.entry(target_id.to_string()).or_default();
        target.revision += 1;
        target.mappings = mappings;
        true
    }

    /// Removes the active sets of `chart_ids`. Drafts are kept. Returns how many were removed.
    pub fn batch_delete<S: AsRef<str>>(&self, chart_ids: &[S]) -> usize {
        let mut state = self.write();
        chart_ids
            .iter()
            .filter(|id| state.active.remove(id.as_ref()).is_some())
            .count()
    }

    pub fn remove(&self, chart_id: &str) -> Option<MappingSet> {
        self.write()
            .active
            .remove(chart_id)
            .map(|entry| entry.mappings)
    }

    /// Configured chart ids, sorted.
    pub fn chart_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().active.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Stores `mappings` as a new draft and returns its version id.
    pub fn save_draft(&self, chart_id: &str, mappings: MappingSet) -> String {
        let version = uuid::Uuid::new_v4().to_string();
        self.write()
            .drafts
            .entry(chart_id.to_string())
            .or_default()
            .insert(version.clone(), mappings);
        version
    }

    /// Draft version ids of `chart_id`, oldest first.
    pub fn versions(&self, chart_id: &str) -> Vec<String> {
        self.read()
            .drafts
            .get(chart_id)
            .map(|drafts| drafts.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn draft(&self, chart_id: &str, version: &str) -> Option<MappingSet> {
        self.read().drafts.get(chart_id)?.get(version).cloned()
    }

    /// Makes a draft the active set. Returns `false` for unknown versions.
    pub fn activate(&self, chart_id: &str, version: &str) -> bool {
        let mut state = self.write();
        let Some(mappings) = state
            .drafts
            .get(chart_id)
            .and_then(|drafts| drafts.get(version))
            .cloned()
        else {
            return false;
        };
        let entry = state.active.entry(chart_id.to_string()).or_default();
        entry.revision += 1;
        entry.mappings = mappings;
        tracing::debug!(chart_id, version, revision = entry.revision, "draft activated");
        true
    }
}
