//! Coverage, type and alignment checks for a mapping set.

use crate::catalog::{CatalogItem, PlaceholderKind};
use crate::mapping::{DataType, MappingSet};
use crate::placeholder::{Bindings, Placeholder};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    pub missing: Vec<Placeholder>,
    pub type_errors: IndexMap<Placeholder, String>,
    pub length_errors: Vec<String>,
}

impl ValidationResult {
    pub fn new(
        missing: Vec<Placeholder>,
        type_errors: IndexMap<Placeholder, String>,
        length_errors: Vec<String>,
    ) -> Self {
        Self {
            passed: missing.is_empty() && type_errors.is_empty() && length_errors.is_empty(),
            missing,
            type_errors,
            length_errors,
        }
    }
}

/// Required placeholders without a configured mapping, in iteration order of `required`.
pub fn check_coverage<'a>(
    required: impl IntoIterator<Item = &'a Placeholder>,
    mappings: &MappingSet,
) -> Vec<Placeholder> {
    let mut missing: Vec<Placeholder> = required
        .into_iter()
        .filter(|placeholder| !mappings.contains_key(*placeholder))
        .cloned()
        .collect();
    missing.dedup();
    missing
}

/// The runtime type name of a resolved value.
pub fn runtime_type(value: &Value) -> &'static str {
    DataType::of_value(value).map_or("null", DataType::as_str)
}

/// Compares each resolved value's runtime type to its mapping's declared type.
///
/// Unmapped placeholders and null values are not checked.
pub fn check_types(mappings: &MappingSet, resolved: &Bindings) -> IndexMap<Placeholder, String> {
    mappings
        .iter()
        .filter_map(|(placeholder, mapping)| {
            let value = resolved.get(placeholder)?;
            let actual = DataType::of_value(value)?;
            (actual != mapping.data_type).then(|| {
                (
                    placeholder.clone(),
                    format!("Expected {} but got {}", mapping.data_type, actual),
                )
            })
        })
        .collect()
}

/// Array-typed catalog items must resolve to as many entries as the category axis.
///
/// Nothing is reported when the category placeholder did not resolve to an array.
pub fn check_array_alignment(
    items: &[CatalogItem],
    resolved: &Bindings,
    category_placeholder: &str,
) -> Vec<String> {
    let Some(Value::Array(categories)) = resolved.get(category_placeholder) else {
        return Vec::new();
    };
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter(|item| item.kind == PlaceholderKind::Array)
        .filter(|item| item.name.as_str() != category_placeholder)
        .filter(|item| seen.insert(item.name.clone()))
        .filter_map(|item| {
            let Some(Value::Array(values)) = resolved.get(&item.name) else {
                return None;
            };
            (values.len() != categories.len()).then(|| {
                format!(
                    "{} length ({}) doesn't match categories length ({})",
                    item.name,
                    values.len(),
                    categories.len()
                )
            })
        })
        .collect()
}

/// Runs all three checks.
pub fn validate(
    items: &[CatalogItem],
    mappings: &MappingSet,
    resolved: &Bindings,
    category_placeholder: &str,
) -> ValidationResult {
    let required = crate::catalog::required_placeholders(items);
    ValidationResult::new(
        check_coverage(&required, mappings),
        check_types(mappings, resolved),
        check_array_alignment(items, resolved, category_placeholder),
    )
}
