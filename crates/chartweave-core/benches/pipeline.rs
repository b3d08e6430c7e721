use chartweave_core::mapping::{Aggregation, DataType, FieldMapping, MappingSet};
use chartweave_core::{ChartFamily, Engine, Placeholder, catalog, sample_marketing_rows, templates};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn chart_types() -> Vec<&'static str> {
    ChartFamily::ALL
        .into_iter()
        .map(|family| family.supported_chart_types()[0])
        .collect()
}

fn series_mappings() -> MappingSet {
    let mut mappings = MappingSet::new();
    let mut insert = |variable: String, mapping: FieldMapping| {
        if let Some(p) = Placeholder::from_variable(&variable) {
            mappings.insert(p, mapping);
        }
    };
    insert(
        "categories".to_string(),
        FieldMapping::new("day_name", DataType::Array).with_aggregation(Aggregation::List),
    );
    for (i, (channel, _)) in chartweave_core::data::SAMPLE_CHANNELS.iter().enumerate() {
        insert(
            format!("series_{}_name", i + 1),
            FieldMapping::new("channel_name", DataType::String).with_filter("channel_name", *channel),
        );
        insert(
            format!("series_{}_data", i + 1),
            FieldMapping::new("conversion_count", DataType::Array)
                .with_filter("channel_name", *channel)
                .with_aggregation(Aggregation::Sum),
        );
    }
    mappings
}

fn bench_transform(c: &mut Criterion) {
    let engine = Engine::new();
    let mut group = c.benchmark_group("transform");
    for chart_type in chart_types() {
        let template = templates::generic_template(ChartFamily::infer_from_chart_type(chart_type));
        group.bench_function(chart_type, |b| {
            b.iter(|| {
                let skeleton = engine.transform_template(black_box(chart_type), &template);
                black_box(catalog::generate(&skeleton));
            });
        });
    }
    group.finish();
}

fn bench_dry_run(c: &mut Criterion) {
    let engine = Engine::new();
    let rows = sample_marketing_rows();
    let mappings = series_mappings();
    c.bench_function("dry_run/stacked_line_chart", |b| {
        b.iter(|| {
            let run = engine.dry_run(black_box("stacked_line_chart"), &mappings, &rows);
            black_box(run.value.succeeded());
        });
    });
}

criterion_group!(benches, bench_transform, bench_dry_run);
criterion_main!(benches);
