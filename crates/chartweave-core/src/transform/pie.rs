use super::{ReshapeContext, attach_layout, attach_title, copy_fields, first_series, layout_entry};
use crate::family::ChartFamily;
use serde_json::{Map, Value, json};

pub(super) fn reshape(template: &Value, ctx: &ReshapeContext<'_>) -> Value {
    let mut out = Map::new();
    attach_title(template, &mut out);
    attach_layout(template, ChartFamily::Pie, ctx, &mut out);
    if let Some(legend) = layout_entry(template, "legend") {
        out.insert("legend".to_string(), legend.clone());
    }

    // Only the first template series survives: pies have a single ring.
    if let Some(item) = first_series(template) {
        let mut s = Map::new();
        copy_fields(item, &mut s, &["name"]);
        s.insert("type".to_string(), json!("pie"));
        copy_fields(item, &mut s, &["radius", "center", "data", "roseType", "label", "itemStyle"]);

        let hollow = ctx.chart_type_mentions("doughnut") || ctx.chart_type_mentions("ring");
        s.entry("radius").or_insert_with(|| {
            if hollow {
                json!(["40%", "70%"])
            } else {
                json!("50%")
            }
        });
        if ctx.chart_type_mentions("rose") {
            s.entry("roseType").or_insert_with(|| json!("radius"));
        }
        out.insert("series".to_string(), json!([s]));
    }
    Value::Object(out)
}
