use crate::*;
use serde_json::json;

#[test]
fn defaults_expose_pivot_keys_and_layout() {
    let config = PipelineConfig::default();
    assert_eq!(config.category_key(), "day_name");
    assert_eq!(config.series_key(), "channel_name");
    assert_eq!(config.category_placeholder(), "${categories}");
    assert_eq!(config.get_bool("defaults.grid.containLabel"), Some(true));
    assert_eq!(config.layout_default("tooltip"), Some(&json!({ "trigger": "axis" })));
    assert_eq!(config.layout_default("legend"), None);
}

#[test]
fn set_value_creates_intermediate_objects() {
    let mut config = PipelineConfig::from_value(json!(null));
    config.set_value("pivot.categoryKey", json!("month"));
    assert_eq!(config.as_value(), &json!({ "pivot": { "categoryKey": "month" } }));
    assert_eq!(config.category_key(), "month");
    assert_eq!(config.series_key(), "channel_name");
}

#[test]
fn yaml_overrides_deep_merge_onto_defaults() {
    let overrides = PipelineConfig::overrides_from_yaml(
        "pivot:\n  seriesKey: region\ndefaults:\n  tooltip:\n    trigger: item\n",
    )
    .unwrap();
    let engine = Engine::new().with_config(&overrides);
    assert_eq!(engine.config().series_key(), "region");
    assert_eq!(engine.config().category_key(), "day_name");
    assert_eq!(engine.orchestrator().keys().series_key, "region");
    assert_eq!(
        engine.config().layout_default("tooltip"),
        Some(&json!({ "trigger": "item" }))
    );

    let skeleton = engine.transform_template("basic_line_chart", &json!({}));
    assert_eq!(skeleton["tooltip"], json!({ "trigger": "item" }));
}

#[test]
fn json5_overrides_accept_comments_and_bare_keys() {
    let overrides = PipelineConfig::overrides_from_json5(
        "{ // switch the category column\n validation: { categoryPlaceholder: '${days}' }, }",
    )
    .unwrap();
    let mut config = PipelineConfig::default();
    config.deep_merge(&overrides);
    assert_eq!(config.category_placeholder(), "${days}");
}

#[test]
fn malformed_or_non_mapping_documents_are_rejected() {
    assert!(matches!(
        PipelineConfig::overrides_from_yaml("pivot: [unclosed"),
        Err(Error::InvalidConfig { format: "YAML", .. })
    ));
    assert!(matches!(
        PipelineConfig::overrides_from_json5("[1, 2]"),
        Err(Error::InvalidConfig { format: "JSON5", .. })
    ));
}
