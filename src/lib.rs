//! featsys - Linguistic Feature-Structure Engine
//!
//! Recursive feature/value bundles (e.g. `Gender:Masc`,
//! `Agreement:[Gender:Fem Number:Pl]`) as attached to parts of speech,
//! morphosyntactic analyses and phonological rule contexts, plus the
//! algorithms that compare, merge, render and bootstrap them.
//!
//! ## Layout
//! - `catalog` - feature/type/symbol registry and idempotent XML bootstrap
//! - `value` / `structure` - the value tagged union and its owning containers
//! - `union` - priority union (incoming wins at every leaf it sets)
//! - `render` - bracketed gloss strings
//! - `cascade` - deletion hooks that remove values left meaningless
//! - `validate` - structural checks against the catalog
//! - `system` - façade tying catalog, hosted structures and config together
//!
//! ## Quick Start
//!
//! ```rust
//! use featsys::catalog::{FeatureCatalog, FeatureDefinition, Labels, SymbolicValue};
//! use featsys::{FeatureStructure, FeatureSystemConfig, RenderOptions};
//!
//! let mut catalog = FeatureCatalog::new();
//! let gen = catalog.add_feature(FeatureDefinition::closed(Labels::new("en", "gender", "gen")));
//! let fem = catalog
//!     .add_symbolic_value(gen, SymbolicValue::new(Labels::new("en", "feminine", "f")))
//!     .unwrap();
//!
//! let mut fs = FeatureStructure::new();
//! fs.set_closed_value(gen, fem).unwrap();
//! let config = FeatureSystemConfig::default();
//! assert_eq!(fs.render(&catalog, &config, RenderOptions::long()), "[gen:f]");
//! ```

pub mod cascade;
pub mod catalog;
pub mod config;
pub mod render;
pub mod structure;
pub mod system;
pub mod union;
pub mod validate;
pub mod value;

pub use cascade::{CascadeReport, DeletionTarget, MemoryStructureHost, StructureHost};
pub use catalog::FeatureCatalog;
pub use config::{ConfigLoader, FeatureSystemConfig};
pub use render::RenderOptions;
pub use structure::{FeatureStructure, FeatureStructureDisjunction, VacuityRule};
pub use system::FeatureSystem;
pub use validate::validate_structure;
pub use value::{FeatureValue, ValuePayload};

// Re-export foundation types
pub use featsys_types::{
    DisjunctionId, FeatureError, FeatureId, FeatureResult, IssueSeverity, MultiString,
    StructureId, SymbolId, TypeId, ValidationIssue, ValueId, ValueKind,
};
