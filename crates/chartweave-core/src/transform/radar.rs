use super::{ReshapeContext, attach_layout, attach_title, copy_fields, first_series, layout_entry, section};
use crate::family::ChartFamily;
use serde_json::{Map, Value, json};

pub(super) fn reshape(template: &Value, ctx: &ReshapeContext<'_>) -> Value {
    let mut out = Map::new();
    attach_title(template, &mut out);
    attach_layout(template, ChartFamily::Radar, ctx, &mut out);
    if let Some(legend) = layout_entry(template, "legend") {
        out.insert("legend".to_string(), legend.clone());
    }
    if let Some(radar) = section(template, &["coordinates", "radar"]) {
        out.insert("radar".to_string(), radar.clone());
    }

    if let Some(item) = first_series(template) {
        let mut s = Map::new();
        copy_fields(item, &mut s, &["name"]);
        s.insert("type".to_string(), json!("radar"));
        copy_fields(item, &mut s, &["data", "areaStyle", "symbol", "lineStyle"]);
        if ctx.chart_type_mentions("filled") {
            s.entry("areaStyle").or_insert_with(|| json!({}));
        }
        out.insert("series".to_string(), json!([s]));
    }
    Value::Object(out)
}
