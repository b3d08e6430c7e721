//! Stage 2: resolve placeholders against a row-oriented data universe.

use crate::config::PipelineConfig;
use crate::data::{DataRow, values_equal};
use crate::mapping::{Aggregation, DataType, FieldMapping, MappingSet, MappingStore, infer_default};
use crate::outcome::{Diagnostic, DiagnosticKind, Outcome};
use crate::placeholder::{self, Bindings, Placeholder, coerce_to_text};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Column names driving the category axis and the series pivot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotKeys {
    pub category_key: String,
    pub series_key: String,
}

impl Default for PivotKeys {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl PivotKeys {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            category_key: config.category_key().to_string(),
            series_key: config.series_key().to_string(),
        }
    }
}

/// Result of binding a skeleton: the substituted configuration and what went into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub final_config: Value,
    pub resolved_values: Bindings,
    pub remaining_placeholders: BTreeSet<Placeholder>,
}

impl RenderReport {
    /// A run succeeds when no placeholder is left in the final configuration.
    pub fn succeeded(&self) -> bool {
        self.remaining_placeholders.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOrchestrator {
    keys: PivotKeys,
}

impl QueryOrchestrator {
    pub fn new(keys: PivotKeys) -> Self {
        Self { keys }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(PivotKeys::from_config(config))
    }

    pub fn keys(&self) -> &PivotKeys {
        &self.keys
    }

    /// Resolves `required` with the mappings stored for `chart_id`.
    pub fn resolve<'a, R: DataRow>(
        &self,
        store: &MappingStore,
        chart_id: &str,
        required: impl IntoIterator<Item = &'a Placeholder>,
        universe: &[R],
    ) -> Outcome<Bindings> {
        self.resolve_with(&store.get(chart_id), required, universe)
    }

    /// Resolves `required` with explicit mappings. Unmapped placeholders use
    /// [`infer_default`](crate::mapping::infer_default).
    pub fn resolve_with<'a, R: DataRow>(
        &self,
        mappings: &MappingSet,
        required: impl IntoIterator<Item = &'a Placeholder>,
        universe: &[R],
    ) -> Outcome<Bindings> {
        let mut diagnostics = Vec::new();
        let mut bindings = Bindings::new();
        for placeholder in required {
            if bindings.contains_key(placeholder) {
                continue;
            }
            let inferred;
            let mapping = match mappings.get(placeholder) {
                Some(mapping) => mapping,
                None => {
                    diagnostics.push(Diagnostic::new(
                        placeholder.clone(),
                        DiagnosticKind::Unmapped,
                    ));
                    inferred = infer_default(placeholder);
                    &inferred
                }
            };
            let value = self.resolve_one(placeholder, mapping, universe, &mut diagnostics);
            tracing::trace!(%placeholder, field = %mapping.field_name, %value, "resolved");
            bindings.insert(placeholder.clone(), value);
        }
        tracing::debug!(
            resolved = bindings.len(),
            diagnostics = diagnostics.len(),
            rows = universe.len(),
            "placeholders resolved"
        );
        Outcome::new(bindings, diagnostics)
    }

    /// Resolves every placeholder of `skeleton`, substitutes, and reports leftovers.
    pub fn bind<R: DataRow>(
        &self,
        skeleton: &Value,
        mappings: &MappingSet,
        universe: &[R],
    ) -> Outcome<RenderReport> {
        let required = placeholder::extract(skeleton);
        self.resolve_with(mappings, &required, universe)
            .map(|resolved_values| {
                let final_config = placeholder::substitute(skeleton, &resolved_values);
                let remaining_placeholders = placeholder::extract(&final_config);
                RenderReport {
                    final_config,
                    resolved_values,
                    remaining_placeholders,
                }
            })
    }

    pub fn resolve_one<R: DataRow>(
        &self,
        placeholder: &Placeholder,
        mapping: &FieldMapping,
        universe: &[R],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Value {
        let mut report = |kind| diagnostics.push(Diagnostic::new(placeholder.clone(), kind));

        if self.is_category_axis(mapping) {
            let categories = self.categories(universe);
            if categories.is_empty() {
                report(DiagnosticKind::UnknownField {
                    field: mapping.field_name.clone(),
                });
            }
            return Value::Array(categories.into_values().collect());
        }

        if let Some(requested) = self.pivot_series(mapping) {
            let categories = self.categories(universe);
            if !categories.is_empty() {
                return self.pivot(mapping, &requested, &categories, universe, &mut report);
            }
        }

        let rows: Vec<&R> = universe
            .iter()
            .filter(|row| matches_filters(*row, &mapping.filters, None))
            .collect();
        if rows.is_empty() {
            report(DiagnosticKind::EmptySelection);
        }
        let values: Vec<Value> = rows
            .iter()
            .filter_map(|row| row.field(&mapping.field_name))
            .collect();
        if values.is_empty()
            && !rows.is_empty()
            && !universe.iter().any(|row| row.field(&mapping.field_name).is_some())
        {
            report(DiagnosticKind::UnknownField {
                field: mapping.field_name.clone(),
            });
        }
        let (value, skipped) = aggregate(mapping.aggregation_type, mapping.data_type, values);
        if skipped > 0 {
            report(DiagnosticKind::NonNumeric { skipped });
        }
        value
    }

    fn is_category_axis(&self, mapping: &FieldMapping) -> bool {
        mapping.field_name == self.keys.category_key
            && (mapping.data_type == DataType::Array
                || mapping.aggregation_type == Aggregation::List)
    }

    /// The requested series name when `mapping` selects one series column.
    fn pivot_series(&self, mapping: &FieldMapping) -> Option<String> {
        if mapping.data_type != DataType::Array {
            return None;
        }
        mapping
            .filters
            .get(&self.keys.series_key)
            .map(coerce_to_text)
    }

    /// Distinct category values over the whole universe, in encounter order, keyed by text.
    /// The first value seen for a key keeps its JSON type.
    fn categories<R: DataRow>(&self, universe: &[R]) -> IndexMap<String, Value> {
        let mut categories = IndexMap::new();
        for value in universe
            .iter()
            .filter_map(|row| row.field(&self.keys.category_key))
        {
            categories.entry(coerce_to_text(&value)).or_insert(value);
        }
        categories
    }

    fn pivot<R: DataRow>(
        &self,
        mapping: &FieldMapping,
        requested: &str,
        categories: &IndexMap<String, Value>,
        universe: &[R],
        report: &mut impl FnMut(DiagnosticKind),
    ) -> Value {
        // series name -> category -> cell values
        let mut table: IndexMap<String, IndexMap<String, Vec<Value>>> = IndexMap::new();
        for row in universe
            .iter()
            .filter(|row| matches_filters(*row, &mapping.filters, Some(&self.keys.series_key)))
        {
            let (Some(series), Some(category)) = (
                row.field(&self.keys.series_key),
                row.field(&self.keys.category_key),
            ) else {
                continue;
            };
            let cell = table
                .entry(coerce_to_text(&series))
                .or_default()
                .entry(coerce_to_text(&category))
                .or_default();
            if let Some(value) = row.field(&mapping.field_name) {
                cell.push(value);
            }
        }

        let column = match table.get(requested) {
            Some(column) => column,
            None => {
                let Some((used, column)) = table.first() else {
                    report(DiagnosticKind::EmptySelection);
                    return Value::Array(Vec::new());
                };
                report(DiagnosticKind::SeriesFallback {
                    requested: requested.to_string(),
                    used: used.clone(),
                });
                column
            }
        };

        let mut skipped = 0;
        let cells: Vec<Value> = categories
            .keys()
            .map(|category| {
                // No row for this category in the series.
                let Some(values) = column.get(category) else {
                    return Value::Null;
                };
                let values = values.clone();
                match mapping.aggregation_type {
                    Aggregation::None | Aggregation::List => {
                        if values.len() > 1 {
                            report(DiagnosticKind::CellCollapsed {
                                category: category.clone(),
                                dropped: values.len() - 1,
                            });
                        }
                        values.into_iter().next().unwrap_or(Value::Null)
                    }
                    aggregation => {
                        let (value, s) = aggregate(aggregation, DataType::Number, values);
                        skipped += s;
                        value
                    }
                }
            })
            .collect();
        if skipped > 0 {
            report(DiagnosticKind::NonNumeric { skipped });
        }
        Value::Array(cells)
    }
}

fn matches_filters<R: DataRow + ?Sized>(
    row: &R,
    filters: &IndexMap<String, Value>,
    skip: Option<&str>,
) -> bool {
    filters
        .iter()
        .filter(|(field, _)| Some(field.as_str()) != skip)
        .all(|(field, expected)| match row.field(field) {
            Some(actual) => values_equal(&actual, expected),
            None => expected.is_null(),
        })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// `Iterator::sum` over f64 starts at -0.0.
fn sum(numbers: &[f64]) -> f64 {
    numbers.iter().fold(0.0, |acc, n| acc + n)
}

/// Reduces projected values. Returns the result and how many values a numeric reduction skipped.
pub fn aggregate(aggregation: Aggregation, data_type: DataType, values: Vec<Value>) -> (Value, usize) {
    if aggregation.is_numeric() {
        let numbers: Vec<f64> = values.iter().filter_map(as_number).collect();
        let skipped = values.len() - numbers.len();
        let result = match aggregation {
            Aggregation::Sum => sum(&numbers),
            Aggregation::Avg if numbers.is_empty() => 0.0,
            Aggregation::Avg => sum(&numbers) / numbers.len() as f64,
            Aggregation::Max => numbers.iter().copied().reduce(f64::max).unwrap_or(0.0),
            Aggregation::Min => numbers.iter().copied().reduce(f64::min).unwrap_or(0.0),
            _ => 0.0,
        };
        return (Value::from(result), skipped);
    }
    let value = match aggregation {
        Aggregation::Count => Value::from(values.len()),
        Aggregation::List => Value::Array(values),
        _ => values
            .into_iter()
            .next()
            .unwrap_or_else(|| data_type.default_value()),
    };
    (value, 0)
}
