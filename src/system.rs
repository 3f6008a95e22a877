//! Feature system façade: catalog, hosted structures and settings together,
//! with deletion wired through the cascade hooks.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use featsys_types::{
    FeatureError, FeatureId, FeatureResult, SymbolId, TypeId, ValidationIssue, ValueId,
};

use crate::cascade::{
    after_delete, before_delete, CascadeReport, DeletionTarget, MemoryStructureHost, StructureHost,
};
use crate::catalog::xml::CatalogDocument;
use crate::catalog::{FeatureCatalog, ImportSummary};
use crate::config::FeatureSystemConfig;
use crate::render::RenderOptions;
use crate::structure::FeatureStructure;
use crate::validate::validate_structure;

#[derive(Debug, Default)]
pub struct FeatureSystem<H: StructureHost = MemoryStructureHost> {
    catalog: FeatureCatalog,
    host: H,
    config: FeatureSystemConfig,
}

impl FeatureSystem<MemoryStructureHost> {
    pub fn new(config: FeatureSystemConfig) -> Self {
        Self::with_parts(FeatureCatalog::new(), MemoryStructureHost::new(), config)
    }
}

impl<H: StructureHost> FeatureSystem<H> {
    pub fn with_parts(catalog: FeatureCatalog, host: H, config: FeatureSystemConfig) -> Self {
        Self {
            catalog,
            host,
            config,
        }
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut FeatureCatalog {
        &mut self.catalog
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &FeatureSystemConfig {
        &self.config
    }

    // ── Catalog bootstrap ──

    pub fn import_document(&mut self, doc: &CatalogDocument) -> ImportSummary {
        self.catalog
            .import_catalog_values(doc, &self.config.analysis_writing_systems)
    }

    pub fn import_catalog_file(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let path = path.as_ref();
        let doc = CatalogDocument::from_path(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;
        let summary = self.import_document(&doc);
        info!(
            path = %path.display(),
            imported = summary.imported.len(),
            skipped = summary.skipped.len(),
            created = summary.created,
            "catalog imported"
        );
        Ok(summary)
    }

    // ── Deletion ──

    pub fn delete_symbolic_value(&mut self, id: SymbolId) -> FeatureResult<CascadeReport> {
        let pending = before_delete(DeletionTarget::Symbol(id), &self.catalog, &self.host);
        self.catalog.remove_symbolic_value(id)?;
        Ok(after_delete(pending, &mut self.host))
    }

    /// Delete a feature, the symbolic values it owns and every value that
    /// uses either
    pub fn delete_feature(&mut self, id: FeatureId) -> FeatureResult<CascadeReport> {
        let pending = before_delete(DeletionTarget::Feature(id), &self.catalog, &self.host);
        self.catalog.remove_feature(id)?;
        Ok(after_delete(pending, &mut self.host))
    }

    pub fn delete_structure_type(&mut self, id: TypeId) -> FeatureResult<CascadeReport> {
        let pending = before_delete(DeletionTarget::StructureType(id), &self.catalog, &self.host);
        self.catalog.remove_structure_type(id)?;
        Ok(after_delete(pending, &mut self.host))
    }

    /// Delete one value from whichever hosted structure holds it
    pub fn delete_value(&mut self, id: ValueId) -> FeatureResult<CascadeReport> {
        let hosted = self
            .host
            .roots()
            .into_iter()
            .any(|root| root.find_by_id(id).is_some());
        if !hosted {
            return Err(FeatureError::ValueNotFound(id));
        }
        let pending = before_delete(DeletionTarget::Value(id), &self.catalog, &self.host);
        Ok(after_delete(pending, &mut self.host))
    }

    // ── Structure services ──

    pub fn render(&self, fs: &FeatureStructure, options: RenderOptions) -> String {
        fs.render(&self.catalog, &self.config, options)
    }

    pub fn validate(&self, fs: &FeatureStructure) -> Vec<ValidationIssue> {
        validate_structure(&self.catalog, fs)
    }
}
