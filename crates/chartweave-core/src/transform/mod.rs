//! Stage 1: reshape a chart-family-agnostic template into a family-specific skeleton.
//!
//! Generic templates look like:
//!
//! ```json
//! {
//!   "chart": { "title": "${chart_title}" },
//!   "coordinates": { "xAxis": { ... }, "yAxis": { ... } },
//!   "data": { "series": [ { "name": "${series_1_name}", "data": "${series_1_data}" } ] },
//!   "layout": { "legend": "${legend_config}", "tooltip": "${tooltip_config}" }
//! }
//! ```
//!
//! Reshapers only move nodes around. Placeholder leaves are carried over as opaque values and are
//! never resolved here.

mod cartesian;
mod gauge;
mod pie;
mod radar;

use crate::config::PipelineConfig;
use crate::family::ChartFamily;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

/// Inputs shared by every reshaper invocation.
#[derive(Debug, Clone, Copy)]
pub struct ReshapeContext<'a> {
    /// Lower-cased chart type identifier (`stacked_bar_chart`, `doughnut_chart`, ...).
    pub chart_type: &'a str,
    pub config: &'a PipelineConfig,
}

impl ReshapeContext<'_> {
    pub fn chart_type_mentions(&self, keyword: &str) -> bool {
        self.chart_type.contains(keyword)
    }
}

pub type ReshapeFn = fn(template: &Value, ctx: &ReshapeContext<'_>) -> Value;

#[derive(Debug, Clone)]
pub struct StructuralTransformer {
    reshapers: FxHashMap<ChartFamily, ReshapeFn>,
    chart_families: IndexMap<String, ChartFamily>,
    config: PipelineConfig,
}

impl Default for StructuralTransformer {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl StructuralTransformer {
    /// A transformer with the built-in reshaper for each family and every supported chart id
    /// registered explicitly.
    pub fn new(config: PipelineConfig) -> Self {
        let mut transformer = Self::empty(config);
        transformer.register(ChartFamily::Cartesian, cartesian::reshape);
        transformer.register(ChartFamily::Pie, pie::reshape);
        transformer.register(ChartFamily::Radar, radar::reshape);
        transformer.register(ChartFamily::Gauge, gauge::reshape);
        for family in ChartFamily::ALL {
            for chart_type in family.supported_chart_types() {
                transformer
                    .chart_families
                    .insert((*chart_type).to_string(), family);
            }
        }
        transformer
    }

    /// A transformer without reshapers or chart id table.
    pub fn empty(config: PipelineConfig) -> Self {
        Self {
            reshapers: FxHashMap::default(),
            chart_families: IndexMap::new(),
            config,
        }
    }

    pub fn register(&mut self, family: ChartFamily, reshape: ReshapeFn) {
        self.reshapers.insert(family, reshape);
    }

    /// Pins a chart type to a family, overriding keyword inference.
    pub fn with_chart_family(mut self, chart_type: impl Into<String>, family: ChartFamily) -> Self {
        self.chart_families.insert(chart_type.into(), family);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    pub fn family_for(&self, chart_type: &str) -> ChartFamily {
        self.chart_families
            .get(chart_type)
            .copied()
            .unwrap_or_else(|| ChartFamily::infer_from_chart_type(chart_type))
    }

    pub fn transform(&self, chart_type: &str, template: &Value) -> Value {
        let family = self.family_for(chart_type);
        let Some(reshape) = self
            .reshapers
            .get(&family)
            .or_else(|| self.reshapers.get(&ChartFamily::Cartesian))
            .copied()
        else {
            tracing::debug!(chart_type, %family, "no reshaper registered");
            return Value::Object(Map::new());
        };

        let lowered = chart_type.to_ascii_lowercase();
        let ctx = ReshapeContext {
            chart_type: &lowered,
            config: &self.config,
        };
        let skeleton = reshape(template, &ctx);
        tracing::debug!(
            chart_type,
            %family,
            input_placeholders = crate::placeholder::extract(template).len(),
            output_placeholders = crate::placeholder::extract(&skeleton).len(),
            "structural transform"
        );
        skeleton
    }
}

pub(crate) fn section<'a>(template: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = template;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    Some(cur)
}

/// Series items from `data.series`, or a top-level `series` list.
pub(crate) fn series_items(template: &Value) -> Option<&Vec<Value>> {
    section(template, &["data", "series"])
        .or_else(|| section(template, &["series"]))
        .and_then(Value::as_array)
}

pub(crate) fn first_series(template: &Value) -> Option<&Map<String, Value>> {
    series_items(template)?.first()?.as_object()
}

/// Copies `keys` from `from` into `to` when present. Values are cloned verbatim.
pub(crate) fn copy_fields(from: &Map<String, Value>, to: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = from.get(*key) {
            to.insert((*key).to_string(), value.clone());
        }
    }
}

/// `chart.title` -> `title.text`, `chart.subtitle` -> `title.subtext`.
pub(crate) fn attach_title(template: &Value, out: &mut Map<String, Value>) {
    let Some(chart) = section(template, &["chart"]).and_then(Value::as_object) else {
        return;
    };
    let mut title = Map::new();
    if let Some(text) = chart.get("title") {
        title.insert("text".to_string(), text.clone());
    }
    if let Some(sub) = chart.get("subtitle") {
        title.insert("subtext".to_string(), sub.clone());
    }
    if !title.is_empty() {
        out.insert("title".to_string(), Value::Object(title));
    }
}

/// Attaches `tooltip`, `toolbox` and (for axis families) `grid`.
///
/// A value supplied under `layout` wins over the configured default, so a `${tooltip_config}`
/// leaf survives untouched.
pub(crate) fn attach_layout(
    template: &Value,
    family: ChartFamily,
    ctx: &ReshapeContext<'_>,
    out: &mut Map<String, Value>,
) {
    let layout = section(template, &["layout"]).and_then(Value::as_object);
    let mut keys = vec!["tooltip", "toolbox"];
    if family.has_axes() {
        keys.push("grid");
    }
    for key in keys {
        let value = layout
            .and_then(|layout| layout.get(key))
            .or_else(|| ctx.config.layout_default(key));
        if let Some(value) = value {
            out.insert(key.to_string(), value.clone());
        }
    }
}

pub(crate) fn layout_entry<'a>(template: &'a Value, key: &str) -> Option<&'a Value> {
    section(template, &["layout", key])
}
