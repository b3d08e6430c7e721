#![forbid(unsafe_code)]

//! Chart configuration templating (headless).
//!
//! A generic, chart-type-agnostic template goes through two stages:
//! - structural transform: reshape into a chart-family skeleton, keeping `${...}` placeholders
//! - binding: resolve placeholders from field mappings over an in-memory row set, then substitute
//!
//! Binding is best-effort. Degradations are reported as [`Diagnostic`]s on an [`Outcome`]
//! instead of failing the run.

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod family;
pub mod mapping;
pub mod orchestrator;
pub mod outcome;
pub mod placeholder;
pub mod templates;
pub mod transform;
pub mod validate;

pub use catalog::{CatalogItem, PlaceholderCatalog, PlaceholderGroup, PlaceholderKind};
pub use config::PipelineConfig;
pub use data::{DataRow, SalesRecord, sample_marketing_rows};
pub use error::{Error, Result};
pub use family::ChartFamily;
pub use mapping::{Aggregation, DataType, FieldMapping, MappingSet, MappingStore};
pub use orchestrator::{PivotKeys, QueryOrchestrator, RenderReport};
pub use outcome::{Diagnostic, DiagnosticKind, Outcome};
pub use placeholder::{Bindings, Placeholder};
pub use templates::{BuiltinTemplates, TemplateRegistry, TemplateSource};
pub use transform::StructuralTransformer;
pub use validate::ValidationResult;

use serde_json::Value;
use std::sync::Arc;

/// The full pipeline: template source, transformer, mapping store and orchestrator.
#[derive(Debug, Clone)]
pub struct Engine {
    config: PipelineConfig,
    transformer: StructuralTransformer,
    orchestrator: QueryOrchestrator,
    templates: Arc<dyn TemplateSource>,
    store: Arc<MappingStore>,
}

impl Default for Engine {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            transformer: StructuralTransformer::new(config.clone()),
            orchestrator: QueryOrchestrator::from_config(&config),
            templates: Arc::new(BuiltinTemplates),
            store: Arc::new(MappingStore::new()),
            config,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merges `overrides` onto the current configuration.
    pub fn with_config(mut self, overrides: &Value) -> Self {
        self.config.deep_merge(overrides);
        self.transformer.set_config(self.config.clone());
        self.orchestrator = QueryOrchestrator::from_config(&self.config);
        self
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateSource>) -> Self {
        self.templates = templates;
        self
    }

    /// Shares a mapping store with other engines.
    pub fn with_store(mut self, store: Arc<MappingStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_transformer(mut self, transformer: StructuralTransformer) -> Self {
        self.transformer = transformer;
        self.transformer.set_config(self.config.clone());
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<MappingStore> {
        &self.store
    }

    pub fn transformer(&self) -> &StructuralTransformer {
        &self.transformer
    }

    pub fn orchestrator(&self) -> &QueryOrchestrator {
        &self.orchestrator
    }

    /// The chart type and generic template behind `chart_id`.
    pub fn template_for(&self, chart_id: &str) -> (String, Value) {
        let chart_type = self
            .templates
            .chart_type(chart_id)
            .unwrap_or_else(|| chart_id.to_string());
        let template = self.templates.template(chart_id).unwrap_or_else(|| {
            templates::generic_template(self.transformer.family_for(&chart_type))
        });
        (chart_type, template)
    }

    pub fn family_for(&self, chart_id: &str) -> ChartFamily {
        let (chart_type, _) = self.template_for(chart_id);
        self.transformer.family_for(&chart_type)
    }

    /// Stage 1 for a known chart id.
    pub fn transform(&self, chart_id: &str) -> Value {
        let (chart_type, template) = self.template_for(chart_id);
        self.transformer.transform(&chart_type, &template)
    }

    /// Stage 1 for a caller-supplied template.
    pub fn transform_template(&self, chart_type: &str, template: &Value) -> Value {
        self.transformer.transform(chart_type, template)
    }

    pub fn catalog(&self, chart_id: &str) -> PlaceholderCatalog {
        PlaceholderCatalog::new(chart_id, &self.transform(chart_id))
    }

    pub fn catalog_template(&self, chart_type: &str, template: &Value) -> PlaceholderCatalog {
        PlaceholderCatalog::new(chart_type, &self.transform_template(chart_type, template))
    }

    /// Resolves `chart_id`'s required placeholders with its stored mappings.
    pub fn resolve<R: DataRow>(&self, chart_id: &str, universe: &[R]) -> Outcome<Bindings> {
        let required = self.catalog(chart_id).required_placeholders();
        self.orchestrator
            .resolve(&self.store, chart_id, &required, universe)
    }

    /// Full pipeline with the stored mappings of `chart_id`.
    pub fn render<R: DataRow>(&self, chart_id: &str, universe: &[R]) -> Outcome<RenderReport> {
        let skeleton = self.transform(chart_id);
        self.orchestrator
            .bind(&skeleton, &self.store.get(chart_id), universe)
    }

    /// Full pipeline with candidate mappings, without touching the store.
    pub fn dry_run<R: DataRow>(
        &self,
        chart_id: &str,
        mappings: &MappingSet,
        sample: &[R],
    ) -> Outcome<RenderReport> {
        let skeleton = self.transform(chart_id);
        self.orchestrator.bind(&skeleton, mappings, sample)
    }

    pub fn dry_run_template<R: DataRow>(
        &self,
        chart_type: &str,
        template: &Value,
        mappings: &MappingSet,
        sample: &[R],
    ) -> Outcome<RenderReport> {
        let skeleton = self.transform_template(chart_type, template);
        self.orchestrator.bind(&skeleton, mappings, sample)
    }

    /// Coverage, type and alignment checks of candidate mappings against a sample.
    pub fn validate_mapping<R: DataRow>(
        &self,
        chart_id: &str,
        mappings: &MappingSet,
        sample: &[R],
    ) -> ValidationResult {
        let (chart_type, template) = self.template_for(chart_id);
        self.validate_template_mapping(&chart_type, &template, mappings, sample)
    }

    pub fn validate_template_mapping<R: DataRow>(
        &self,
        chart_type: &str,
        template: &Value,
        mappings: &MappingSet,
        sample: &[R],
    ) -> ValidationResult {
        let skeleton = self.transform_template(chart_type, template);
        let items = catalog::generate(&skeleton);
        let run = self.orchestrator.bind(&skeleton, mappings, sample).lenient();
        validate::validate(
            &items,
            mappings,
            &run.resolved_values,
            self.config.category_placeholder(),
        )
    }

    /// Validates and, if everything passes, stores `mappings` as the active set.
    pub fn configure_validated<R: DataRow>(
        &self,
        chart_id: &str,
        mappings: MappingSet,
        sample: &[R],
    ) -> ValidationResult {
        let result = self.validate_mapping(chart_id, &mappings, sample);
        if result.passed {
            self.store.configure(chart_id, mappings);
        }
        result
    }
}

#[cfg(test)]
mod tests;
