//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use featsys::catalog::{FeatureCatalog, FeatureDefinition, Labels, StructureType, SymbolicValue};
use featsys::{FeatureId, FeatureStructure, FeatureSystemConfig, SymbolId, TypeId};

/// A small agreement system: closed Gender and Number, complex Agr typed
/// with `tAgr`.
pub struct Agreement {
    pub catalog: FeatureCatalog,
    pub config: FeatureSystemConfig,
    pub agr_type: TypeId,
    pub gender: FeatureId,
    pub number: FeatureId,
    pub agr: FeatureId,
    pub masc: SymbolId,
    pub fem: SymbolId,
    pub neut: SymbolId,
    pub sg: SymbolId,
    pub pl: SymbolId,
}

impl Agreement {
    pub fn new() -> Self {
        let mut catalog = FeatureCatalog::new();
        let agr_type = catalog.add_structure_type(
            StructureType::new(Labels::new("en", "agreement", "agr")).with_catalog_id("tAgr"),
        );
        let gender = catalog.add_feature(
            FeatureDefinition::closed(Labels::new("en", "gender", "gen")).with_catalog_id("fGender"),
        );
        let number = catalog.add_feature(
            FeatureDefinition::closed(Labels::new("en", "number", "num")).with_catalog_id("fNumber"),
        );
        let agr = catalog.add_feature(
            FeatureDefinition::complex(Labels::new("en", "agreement", "agr"), Some(agr_type))
                .with_catalog_id("fAgr"),
        );
        catalog.add_feature_to_type(agr_type, gender).unwrap();
        catalog.add_feature_to_type(agr_type, number).unwrap();

        let mut symbol = |feature, key: &str, name: &str, abbr: &str| {
            catalog
                .add_symbolic_value(
                    feature,
                    SymbolicValue::new(Labels::new("en", name, abbr)).with_catalog_id(key),
                )
                .unwrap()
        };
        let masc = symbol(gender, "vMasc", "masculine", "m");
        let fem = symbol(gender, "vFem", "feminine", "f");
        let neut = symbol(gender, "vNeut", "neuter", "n");
        let sg = symbol(number, "vSg", "singular", "sg");
        let pl = symbol(number, "vPl", "plural", "pl");

        Self {
            catalog,
            config: FeatureSystemConfig::with_writing_systems(["en"]),
            agr_type,
            gender,
            number,
            agr,
            masc,
            fem,
            neut,
            sg,
            pl,
        }
    }

    /// Flat structure from (feature, symbol) pairs
    pub fn flat(&self, pairs: &[(FeatureId, SymbolId)]) -> FeatureStructure {
        let mut fs = FeatureStructure::new();
        for (feature, symbol) in pairs {
            fs.set_closed_value(*feature, *symbol).unwrap();
        }
        fs
    }

    /// `{Agr:{pairs}}`
    pub fn agreement(&self, pairs: &[(FeatureId, SymbolId)]) -> FeatureStructure {
        let mut fs = FeatureStructure::new();
        let nested = fs.complex_value_mut(self.agr).unwrap();
        nested.set_structure_type(Some(self.agr_type));
        for (feature, symbol) in pairs {
            nested.set_closed_value(*feature, *symbol).unwrap();
        }
        fs
    }
}

pub fn sample_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("catalog")
        .join("agreement.xml")
}
