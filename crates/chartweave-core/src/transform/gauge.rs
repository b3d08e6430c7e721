use super::{ReshapeContext, attach_layout, attach_title, copy_fields, first_series};
use crate::family::ChartFamily;
use serde_json::{Map, Value, json};

const GAUGE_FIELDS: &[&str] = &[
    "min", "max", "data", "detail", "pointer", "axisLine", "progress", "splitLine", "axisLabel",
];

pub(super) fn reshape(template: &Value, ctx: &ReshapeContext<'_>) -> Value {
    let mut out = Map::new();
    attach_title(template, &mut out);
    attach_layout(template, ChartFamily::Gauge, ctx, &mut out);

    if let Some(item) = first_series(template) {
        let mut s = Map::new();
        copy_fields(item, &mut s, &["name"]);
        s.insert("type".to_string(), json!("gauge"));
        copy_fields(item, &mut s, GAUGE_FIELDS);
        if ctx.chart_type_mentions("progress") {
            s.entry("progress").or_insert_with(|| json!({ "show": true }));
        }
        out.insert("series".to_string(), json!([s]));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use crate::transform::StructuralTransformer;
    use serde_json::json;

    #[test]
    fn single_gauge_series() {
        let tpl = json!({
            "data": { "series": [{
                "type": "${series_type}", "min": "${min_value}", "max": "${max_value}",
                "data": "${gauge_data}", "detail": "${detail_config}", "pointer": "${pointer_config}"
            }] },
            "layout": { "tooltip": "${tooltip_config}", "legend": "${legend_config}" }
        });
        let out = StructuralTransformer::default().transform("basic_gauge_chart", &tpl);
        assert_eq!(
            out["series"],
            json!([{
                "type": "gauge", "min": "${min_value}", "max": "${max_value}",
                "data": "${gauge_data}", "detail": "${detail_config}", "pointer": "${pointer_config}"
            }])
        );
        assert_eq!(out["tooltip"], json!("${tooltip_config}"));
        assert!(out.get("legend").is_none());

        let progress = StructuralTransformer::default().transform("progress_gauge_chart", &tpl);
        assert_eq!(progress["series"][0]["progress"], json!({ "show": true }));
    }
}
