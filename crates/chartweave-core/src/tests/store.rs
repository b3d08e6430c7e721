use crate::mapping::*;
use crate::*;
use std::sync::Arc;

fn ph(variable: &str) -> Placeholder {
    Placeholder::from_variable(variable).unwrap()
}

fn set(pairs: &[(&str, FieldMapping)]) -> MappingSet {
    pairs
        .iter()
        .map(|(variable, mapping)| (ph(variable), mapping.clone()))
        .collect()
}

#[test]
fn configure_replaces_whole_set() {
    let store = MappingStore::new();
    assert!(store.get("chart").is_empty());
    assert_eq!(store.revision("chart"), 0);

    store.configure(
        "chart",
        set(&[
            ("a", FieldMapping::new("amount", DataType::Number)),
            ("b", FieldMapping::new("region", DataType::String)),
        ]),
    );
    store.configure(
        "chart",
        set(&[("c", FieldMapping::new("product", DataType::String))]),
    );

    let current = store.get("chart");
    assert_eq!(current.len(), 1);
    assert!(current.contains_key("${c}"));
    assert_eq!(store.revision("chart"), 2);
}

#[test]
fn copy_and_batch_delete() {
    let store = MappingStore::new();
    store.configure(
        "src",
        set(&[("a", FieldMapping::new("amount", DataType::Number))]),
    );

    assert!(!store.copy("missing", "dst"));
    assert!(!store.contains("dst"));
    assert!(store.copy("src", "dst"));
    assert_eq!(store.get("dst"), store.get("src"));

    store.configure("src", MappingSet::new());
    assert_eq!(store.get("dst").len(), 1, "copies are independent");

    assert_eq!(store.batch_delete(&["src", "dst", "nope"]), 2);
    assert!(store.chart_ids().is_empty());
    assert!(store.remove("src").is_none());
}

#[test]
fn drafts_activate_into_the_active_set() {
    let store = MappingStore::new();
    let v1 = store.save_draft(
        "chart",
        set(&[("a", FieldMapping::new("amount", DataType::Number))]),
    );
    let v2 = store.save_draft(
        "chart",
        set(&[("b", FieldMapping::new("region", DataType::String))]),
    );
    assert_ne!(v1, v2);
    assert_eq!(store.versions("chart"), vec![v1.clone(), v2.clone()]);
    assert!(store.get("chart").is_empty(), "drafts are not active");

    assert!(!store.activate("chart", "unknown"));
    assert!(store.activate("chart", &v2));
    assert!(store.get("chart").contains_key("${b}"));
    assert_eq!(store.draft("chart", &v1).map(|d| d.len()), Some(1));

    assert_eq!(store.batch_delete(&["chart"]), 1);
    assert_eq!(store.versions("chart").len(), 2, "batch delete keeps drafts");
}

#[test]
fn concurrent_writers_and_readers_see_whole_sets() {
    let store = Arc::new(MappingStore::new());
    let sets: Vec<MappingSet> = (0..8)
        .map(|i| {
            (0..=i)
                .map(|j| {
                    (
                        ph(&format!("p{j}")),
                        FieldMapping::new(format!("f{i}"), DataType::Number),
                    )
                })
                .collect()
        })
        .collect();

    std::thread::scope(|scope| {
        for mappings in &sets {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..50 {
                    store.configure("shared", mappings.clone());
                }
            });
        }
        for _ in 0..4 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..200 {
                    let seen = store.get("shared");
                    // every mapping of one set points at the same field
                    let fields: std::collections::HashSet<&str> =
                        seen.values().map(|m| m.field_name.as_str()).collect();
                    assert!(fields.len() <= 1);
                    if let Some(field) = fields.iter().next() {
                        let i: usize = field[1..].parse().unwrap();
                        assert_eq!(seen.len(), i + 1);
                    }
                }
            });
        }
    });

    assert_eq!(store.revision("shared"), 8 * 50);
}

#[test]
fn default_inference_priority() {
    let cases = [
        ("categories", "category", DataType::Array, Aggregation::List),
        ("product_category", "category", DataType::Array, Aggregation::List),
        ("max_value", "amount", DataType::Number, Aggregation::None),
        ("total_amount", "amount", DataType::Number, Aggregation::None),
        ("order_count", "quantity", DataType::Number, Aggregation::None),
        ("region_name", "region", DataType::String, Aggregation::None),
        ("product_name", "product", DataType::String, Aggregation::None),
        ("channel_label", "channel", DataType::String, Aggregation::None),
        ("chart_title", "category", DataType::String, Aggregation::None),
    ];
    for (variable, field, data_type, aggregation) in cases {
        let mapping = infer_default(&ph(variable));
        assert_eq!(mapping.field_name, field, "{variable}");
        assert_eq!(mapping.data_type, data_type, "{variable}");
        assert_eq!(mapping.aggregation_type, aggregation, "{variable}");
    }

    let defaults = default_mappings(&[ph("a_amount"), ph("b_region")]);
    assert_eq!(defaults.len(), 2);
    assert_eq!(defaults["${b_region}"].field_name, "region");
}

#[test]
fn mapping_documents_accept_tokens_and_bare_variables() {
    let parsed = parse_mapping_document(
        r#"{
            "${categories}": { "fieldName": "day_name", "dataType": "array", "aggregationType": "list" },
            "s1_data": {
                "fieldName": "conversion_count",
                "dataType": "array",
                "aggregation": "sum",
                "filters": { "channel_name": "Email" },
                "transformExpression": "value * 1"
            }
        }"#,
    )
    .unwrap();
    assert_eq!(parsed.len(), 2);
    let s1 = &parsed["${s1_data}"];
    assert_eq!(s1.aggregation_type, Aggregation::Sum);
    assert_eq!(s1.filters["channel_name"], serde_json::json!("Email"));
    assert_eq!(s1.transform_expression.as_deref(), Some("value * 1"));
    assert_eq!(
        s1,
        &FieldMapping::new("conversion_count", DataType::Array)
            .with_aggregation(Aggregation::Sum)
            .with_filter("channel_name", "Email")
            .with_transform_expression("value * 1")
    );

    assert!(matches!(
        parse_mapping_document(r#"{ "": { "fieldName": "x" } }"#),
        Err(Error::InvalidMapping { .. })
    ));
    assert!(parse_mapping_document("not json").is_err());
    assert_eq!("AVG".parse::<Aggregation>().unwrap(), Aggregation::Avg);
    assert!("median".parse::<Aggregation>().is_err());
}
