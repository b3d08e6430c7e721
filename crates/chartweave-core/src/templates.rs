//! Generic templates and the template source seam.

use crate::family::ChartFamily;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::{Value, json};

/// Number of series slots in the built-in cartesian template.
pub const CARTESIAN_SERIES_SLOTS: usize = 5;

/// The built-in chart-family-agnostic template for `family`.
pub fn generic_template(family: ChartFamily) -> Value {
    match family {
        ChartFamily::Cartesian => cartesian_template(),
        ChartFamily::Pie => json!({
            "chart": { "title": "${chart_title}", "type": "pie", "theme": "${chart_theme}" },
            "data": { "series": [{
                "type": "pie",
                "radius": "${radius_config}",
                "center": "${center_config}",
                "data": "${pie_data}",
                "roseType": "${rose_type}"
            }] },
            "layout": { "legend": "${legend_config}", "tooltip": "${tooltip_config}" }
        }),
        ChartFamily::Radar => json!({
            "chart": { "title": "${chart_title}", "type": "radar", "theme": "${chart_theme}" },
            "coordinates": { "radar": {
                "indicator": "${radar_indicators}",
                "shape": "${radar_shape}",
                "radius": "${radar_radius}"
            } },
            "data": { "series": [{
                "type": "radar",
                "data": "${radar_data}",
                "areaStyle": "${area_style}"
            }] },
            "layout": { "legend": "${legend_config}", "tooltip": "${tooltip_config}" }
        }),
        ChartFamily::Gauge => json!({
            "chart": { "title": "${chart_title}", "type": "gauge", "theme": "${chart_theme}" },
            "data": { "series": [{
                "type": "gauge",
                "min": "${min_value}",
                "max": "${max_value}",
                "data": "${gauge_data}",
                "detail": "${detail_config}",
                "pointer": "${pointer_config}",
                "axisLine": "${axis_line_config}",
                "progress": "${progress_config}"
            }] },
            "layout": { "tooltip": "${tooltip_config}" }
        }),
    }
}

fn cartesian_template() -> Value {
    let series: Vec<Value> = (1..=CARTESIAN_SERIES_SLOTS)
        .map(|i| {
            json!({
                "name": format!("${{series_{i}_name}}"),
                "type": "${series_type}",
                "data": format!("${{series_{i}_data}}"),
                "stack": "${stack_group}",
                "smooth": "${smooth_style}"
            })
        })
        .collect();
    json!({
        "chart": { "title": "${chart_title}", "type": "${chart_type}", "theme": "${chart_theme}" },
        "coordinates": {
            "xAxis": { "type": "category", "data": "${categories}", "boundaryGap": "${boundary_gap}" },
            "yAxis": { "type": "value" }
        },
        "data": { "series": series },
        "layout": {
            "legend": "${legend_config}",
            "grid": "${grid_config}",
            "tooltip": "${tooltip_config}",
            "toolbox": "${toolbox_config}"
        }
    })
}

/// Supplies generic templates by chart id.
///
/// Repeated calls for the same id must return the same template until the source itself is
/// changed by its owner.
pub trait TemplateSource: std::fmt::Debug + Send + Sync {
    fn template(&self, chart_id: &str) -> Option<Value>;

    /// The chart type identifier used to pick a reshaper. Defaults to the chart id itself.
    fn chart_type(&self, chart_id: &str) -> Option<String> {
        let _ = chart_id;
        None
    }
}

/// Built-in templates only: every chart id maps to the generic template of its inferred family.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn template(&self, chart_id: &str) -> Option<Value> {
        Some(generic_template(ChartFamily::infer_from_chart_type(chart_id)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    pub chart_type: String,
    pub template: Value,
}

/// In-memory chart id -> (chart type, template) table.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: IndexMap<String, TemplateEntry>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        chart_id: impl Into<String>,
        chart_type: impl Into<String>,
        template: Value,
    ) {
        self.entries.insert(
            chart_id.into(),
            TemplateEntry {
                chart_type: chart_type.into(),
                template,
            },
        );
    }

    pub fn get(&self, chart_id: &str) -> Option<&TemplateEntry> {
        self.entries.get(chart_id)
    }

    /// Like [`get`](Self::get) but fails for unknown ids instead of falling back.
    pub fn require(&self, chart_id: &str) -> Result<&TemplateEntry> {
        self.get(chart_id).ok_or_else(|| Error::UnknownChart {
            chart_id: chart_id.to_string(),
        })
    }

    pub fn remove(&mut self, chart_id: &str) -> Option<TemplateEntry> {
        self.entries.shift_remove(chart_id)
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TemplateSource for TemplateRegistry {
    fn template(&self, chart_id: &str) -> Option<Value> {
        match self.get(chart_id) {
            Some(entry) => Some(entry.template.clone()),
            None => BuiltinTemplates.template(chart_id),
        }
    }

    fn chart_type(&self, chart_id: &str) -> Option<String> {
        self.get(chart_id).map(|entry| entry.chart_type.clone())
    }
}
