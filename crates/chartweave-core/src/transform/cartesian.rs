use super::{
    ReshapeContext, attach_layout, attach_title, copy_fields, layout_entry, section, series_items,
};
use crate::family::ChartFamily;
use serde_json::{Map, Value, json};

const PASSTHROUGH: &[&str] = &["smooth", "stack", "areaStyle", "label", "emphasis", "itemStyle"];

pub(super) fn reshape(template: &Value, ctx: &ReshapeContext<'_>) -> Value {
    let mut out = Map::new();
    attach_title(template, &mut out);
    attach_layout(template, ChartFamily::Cartesian, ctx, &mut out);

    let series = build_series(template, ctx);
    if let Some(legend) = build_legend(template, series.as_deref()) {
        out.insert("legend".to_string(), legend);
    }

    if let Some(x_axis) = section(template, &["coordinates", "xAxis"]) {
        out.insert("xAxis".to_string(), x_axis_with_defaults(x_axis, ctx));
    }
    if let Some(y_axis) = section(template, &["coordinates", "yAxis"]) {
        out.insert("yAxis".to_string(), y_axis.clone());
    }
    if let Some(series) = series {
        out.insert("series".to_string(), Value::Array(series));
    }
    Value::Object(out)
}

fn series_type(ctx: &ReshapeContext<'_>) -> &'static str {
    if ctx.chart_type_mentions("bar") || ctx.chart_type_mentions("column") {
        "bar"
    } else {
        "line"
    }
}

fn x_axis_with_defaults(x_axis: &Value, ctx: &ReshapeContext<'_>) -> Value {
    let Some(axis) = x_axis.as_object() else {
        return x_axis.clone();
    };
    let mut axis = axis.clone();
    if !axis.contains_key("boundaryGap") {
        axis.insert(
            "boundaryGap".to_string(),
            Value::Bool(series_type(ctx) == "bar"),
        );
    }
    Value::Object(axis)
}

fn build_series(template: &Value, ctx: &ReshapeContext<'_>) -> Option<Vec<Value>> {
    let items = series_items(template)?;
    let kind = series_type(ctx);
    let series = items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let mut s = Map::new();
            if let Some(name) = item.get("name") {
                s.insert("name".to_string(), name.clone());
            }
            s.insert("type".to_string(), Value::String(kind.to_string()));
            if let Some(data) = item.get("data").or_else(|| item.get("values")) {
                s.insert("data".to_string(), data.clone());
            }
            copy_fields(item, &mut s, PASSTHROUGH);

            if ctx.chart_type_mentions("smooth") {
                s.entry("smooth").or_insert(Value::Bool(true));
            }
            if ctx.chart_type_mentions("stack") {
                s.entry("stack").or_insert_with(|| json!("Total"));
            }
            if ctx.chart_type_mentions("area") {
                s.entry("areaStyle").or_insert_with(|| json!({}));
            }
            Value::Object(s)
        })
        .collect();
    Some(series)
}

/// `layout.legend` placeholders pass through; objects receive the series names; no legend at all
/// becomes `{ "data": [names...] }`.
fn build_legend(template: &Value, series: Option<&[Value]>) -> Option<Value> {
    let names: Vec<Value> = series
        .unwrap_or_default()
        .iter()
        .filter_map(|s| s.get("name").cloned())
        .collect();

    match layout_entry(template, "legend") {
        Some(Value::Object(legend)) => {
            let mut legend = legend.clone();
            if !names.is_empty() {
                legend
                    .entry("data")
                    .or_insert_with(|| Value::Array(names));
            }
            Some(Value::Object(legend))
        }
        // `${legend_config}` and other scalars are kept as-is.
        Some(other) => Some(other.clone()),
        None if names.is_empty() => None,
        None => Some(json!({ "data": names })),
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::StructuralTransformer;
    use serde_json::json;

    fn template() -> serde_json::Value {
        json!({
            "chart": { "title": "${chart_title}", "type": "${chart_type}" },
            "coordinates": {
                "xAxis": { "type": "category", "data": "${categories}" },
                "yAxis": { "type": "value" }
            },
            "data": {
                "series": [
                    { "name": "${s1_name}", "type": "${series_type}", "data": "${s1_data}" },
                    { "name": "${s2_name}", "values": "${s2_data}", "smooth": "${smooth_style}" }
                ]
            }
        })
    }

    #[test]
    fn line_chart_reshape() {
        let out = StructuralTransformer::default().transform("basic_line_chart", &template());
        assert_eq!(out["title"], json!({ "text": "${chart_title}" }));
        assert_eq!(
            out["xAxis"],
            json!({ "type": "category", "data": "${categories}", "boundaryGap": false })
        );
        assert_eq!(out["yAxis"], json!({ "type": "value" }));
        assert_eq!(
            out["series"],
            json!([
                { "name": "${s1_name}", "type": "line", "data": "${s1_data}" },
                { "name": "${s2_name}", "type": "line", "data": "${s2_data}", "smooth": "${smooth_style}" }
            ])
        );
        assert_eq!(out["legend"], json!({ "data": ["${s1_name}", "${s2_name}"] }));
        assert_eq!(out["grid"]["containLabel"], json!(true));
        assert_eq!(out["toolbox"], json!({ "feature": { "saveAsImage": {} } }));
    }

    #[test]
    fn stacked_bar_defaults() {
        let out = StructuralTransformer::default().transform("stacked_bar_chart", &template());
        assert_eq!(out["xAxis"]["boundaryGap"], json!(true));
        for s in out["series"].as_array().unwrap() {
            assert_eq!(s["type"], json!("bar"));
            assert_eq!(s["stack"], json!("Total"));
        }
    }

    #[test]
    fn template_values_beat_chart_type_defaults() {
        let mut tpl = template();
        tpl["coordinates"]["xAxis"]["boundaryGap"] = json!("${boundary_gap}");
        tpl["data"]["series"][0]["smooth"] = json!("${smooth_style}");
        let out = StructuralTransformer::default().transform("smooth_line_chart", &tpl);
        assert_eq!(out["xAxis"]["boundaryGap"], json!("${boundary_gap}"));
        assert_eq!(out["series"][0]["smooth"], json!("${smooth_style}"));
        assert_eq!(out["series"][1]["smooth"], json!("${smooth_style}"));
    }

    #[test]
    fn legend_placeholder_passes_through_and_objects_get_names() {
        let mut tpl = template();
        tpl["layout"] = json!({ "legend": "${legend_config}", "tooltip": "${tooltip_config}" });
        let out = StructuralTransformer::default().transform("basic_area_chart", &tpl);
        assert_eq!(out["legend"], json!("${legend_config}"));
        assert_eq!(out["tooltip"], json!("${tooltip_config}"));
        assert_eq!(out["series"][0]["areaStyle"], json!({}));

        tpl["layout"] = json!({ "legend": { "top": "5%" } });
        let out = StructuralTransformer::default().transform("basic_line_chart", &tpl);
        assert_eq!(
            out["legend"],
            json!({ "top": "5%", "data": ["${s1_name}", "${s2_name}"] })
        );
    }

    #[test]
    fn missing_sections_are_omitted() {
        let out = StructuralTransformer::default().transform("basic_bar_chart", &json!({}));
        let obj = out.as_object().unwrap();
        for key in ["title", "xAxis", "yAxis", "series", "legend"] {
            assert!(!obj.contains_key(key), "{key}");
        }
        assert!(obj.contains_key("tooltip"));
        assert!(obj.contains_key("grid"));
    }
}
