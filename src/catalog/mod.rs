//! Feature Catalog
//!
//! Registry of feature definitions, symbolic values and structure types.
//!
//! Objects are interned twice: by identity (GUID) and by their external
//! catalog id. Inserting an object whose GUID or catalog id is already known
//! returns the existing object ("first writer wins"), so independent imports
//! of the same catalog converge on the same objects.
//!
//! Mutating calls take `&mut self` and lookups take `&self`, so the borrow
//! checker gives the single-writer / many-readers contract for free.

mod definitions;
mod import;
pub mod xml;

pub use definitions::{FeatureDefinition, FeatureKind, Labels, StructureType, SymbolicValue};
pub use import::{CatalogImport, ImportSummary};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use featsys_types::{FeatureError, FeatureId, FeatureResult, SymbolId, TypeId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CatalogSnapshot", into = "CatalogSnapshot")]
pub struct FeatureCatalog {
    features: BTreeMap<FeatureId, FeatureDefinition>,
    types: BTreeMap<TypeId, StructureType>,
    symbols: BTreeMap<SymbolId, SymbolicValue>,
    index: CatalogIndex,
}

/// catalog id → object id
#[derive(Debug, Clone, Default)]
struct CatalogIndex {
    features: HashMap<String, FeatureId>,
    types: HashMap<String, TypeId>,
    symbols: HashMap<String, SymbolId>,
}

/// Serialized form; the index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogSnapshot {
    #[serde(default)]
    types: Vec<StructureType>,
    #[serde(default)]
    features: Vec<FeatureDefinition>,
    #[serde(default)]
    symbols: Vec<SymbolicValue>,
}

impl From<CatalogSnapshot> for FeatureCatalog {
    fn from(snapshot: CatalogSnapshot) -> Self {
        let mut catalog = FeatureCatalog::default();
        for t in snapshot.types {
            if let Some(key) = &t.catalog_id {
                catalog.index.types.insert(key.clone(), t.id);
            }
            catalog.types.insert(t.id, t);
        }
        for f in snapshot.features {
            if let Some(key) = &f.catalog_id {
                catalog.index.features.insert(key.clone(), f.id);
            }
            catalog.features.insert(f.id, f);
        }
        for s in snapshot.symbols {
            if let Some(key) = &s.catalog_id {
                catalog.index.symbols.insert(key.clone(), s.id);
            }
            catalog.symbols.insert(s.id, s);
        }
        catalog
    }
}

impl From<FeatureCatalog> for CatalogSnapshot {
    fn from(catalog: FeatureCatalog) -> Self {
        Self {
            types: catalog.types.into_values().collect(),
            features: catalog.features.into_values().collect(),
            symbols: catalog.symbols.into_values().collect(),
        }
    }
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookup by catalog id ──

    pub fn feature(&self, catalog_id: &str) -> Option<&FeatureDefinition> {
        self.index
            .features
            .get(catalog_id)
            .and_then(|id| self.features.get(id))
    }

    pub fn structure_type(&self, catalog_id: &str) -> Option<&StructureType> {
        self.index
            .types
            .get(catalog_id)
            .and_then(|id| self.types.get(id))
    }

    pub fn symbolic_value(&self, catalog_id: &str) -> Option<&SymbolicValue> {
        self.index
            .symbols
            .get(catalog_id)
            .and_then(|id| self.symbols.get(id))
    }

    // ── Lookup by identity ──

    pub fn feature_by_id(&self, id: FeatureId) -> Option<&FeatureDefinition> {
        self.features.get(&id)
    }

    pub fn feature_by_id_mut(&mut self, id: FeatureId) -> Option<&mut FeatureDefinition> {
        self.features.get_mut(&id)
    }

    pub fn structure_type_by_id(&self, id: TypeId) -> Option<&StructureType> {
        self.types.get(&id)
    }

    pub fn symbolic_value_by_id(&self, id: SymbolId) -> Option<&SymbolicValue> {
        self.symbols.get(&id)
    }

    /// A symbolic value of a specific closed feature.
    ///
    /// Asking a feature for a value it does not own is a contract violation.
    pub fn value_of(&self, feature: FeatureId, symbol: SymbolId) -> FeatureResult<&SymbolicValue> {
        let def = self
            .features
            .get(&feature)
            .ok_or(FeatureError::FeatureNotFound(feature))?;
        if !def.is_closed() {
            return Err(FeatureError::NotClosedFeature(feature));
        }
        if !def.owns(symbol) {
            return Err(FeatureError::NotOwned { feature, symbol });
        }
        self.symbols
            .get(&symbol)
            .ok_or(FeatureError::SymbolNotFound(symbol))
    }

    pub fn features(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.features.values()
    }

    pub fn structure_types(&self) -> impl Iterator<Item = &StructureType> {
        self.types.values()
    }

    pub fn symbolic_values(&self) -> impl Iterator<Item = &SymbolicValue> {
        self.symbols.values()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn structure_type_count(&self) -> usize {
        self.types.len()
    }

    pub fn symbolic_value_count(&self) -> usize {
        self.symbols.len()
    }

    /// Whether `feature` is legal in structures of `structure_type`,
    /// including features declared on enclosing types.
    pub fn type_allows(&self, structure_type: TypeId, feature: FeatureId) -> bool {
        let mut current = Some(structure_type);
        let mut hops = 0;
        while let Some(id) = current {
            let Some(t) = self.types.get(&id) else {
                return false;
            };
            if t.features.contains(&feature) {
                return true;
            }
            current = t.parent;
            hops += 1;
            // parent cycles are not prevented by the editing API
            if hops > self.types.len() {
                return false;
            }
        }
        false
    }

    // ── Interning ──

    /// Add a feature definition, or return the one already registered under
    /// its GUID or catalog id.
    pub fn add_feature(&mut self, def: FeatureDefinition) -> FeatureId {
        if let Some(existing) = self.features.get(&def.id) {
            return existing.id;
        }
        if let Some(existing) = def
            .catalog_id
            .as_ref()
            .and_then(|key| self.index.features.get(key))
        {
            return *existing;
        }

        let id = def.id;
        if let Some(key) = &def.catalog_id {
            self.index.features.insert(key.clone(), id);
        }
        debug!(feature = %id, catalog_id = ?def.catalog_id, "registered feature");
        self.features.insert(id, def);
        id
    }

    pub fn add_structure_type(&mut self, structure_type: StructureType) -> TypeId {
        if self.types.contains_key(&structure_type.id) {
            return structure_type.id;
        }
        if let Some(existing) = structure_type
            .catalog_id
            .as_ref()
            .and_then(|key| self.index.types.get(key))
        {
            return *existing;
        }

        let id = structure_type.id;
        if let Some(key) = &structure_type.catalog_id {
            self.index.types.insert(key.clone(), id);
        }
        debug!(structure_type = %id, catalog_id = ?structure_type.catalog_id, "registered structure type");
        self.types.insert(id, structure_type);
        id
    }

    /// Add a symbolic value to a closed feature. The value's owner is set to
    /// `feature`. An already registered GUID or catalog id returns the
    /// existing value, which must belong to `feature`.
    pub fn add_symbolic_value(
        &mut self,
        feature: FeatureId,
        mut value: SymbolicValue,
    ) -> FeatureResult<SymbolId> {
        let def = self
            .features
            .get(&feature)
            .ok_or(FeatureError::FeatureNotFound(feature))?;
        if !def.is_closed() {
            return Err(FeatureError::NotClosedFeature(feature));
        }

        let existing = self.symbols.get(&value.id).map(|s| s.id).or_else(|| {
            value
                .catalog_id
                .as_ref()
                .and_then(|key| self.index.symbols.get(key).copied())
        });
        if let Some(existing) = existing {
            let owner = self.symbols[&existing].owner;
            if owner != feature {
                return Err(FeatureError::NotOwned {
                    feature,
                    symbol: existing,
                });
            }
            return Ok(existing);
        }

        value.owner = feature;
        let id = value.id;
        if let Some(key) = &value.catalog_id {
            self.index.symbols.insert(key.clone(), id);
        }
        if let Some(FeatureDefinition {
            kind: FeatureKind::Closed { values },
            ..
        }) = self.features.get_mut(&feature)
        {
            values.push(id);
        }
        debug!(symbol = %id, feature = %feature, catalog_id = ?value.catalog_id, "registered symbolic value");
        self.symbols.insert(id, value);
        Ok(id)
    }

    /// Declare `feature` legal on `structure_type` (idempotent)
    pub fn add_feature_to_type(
        &mut self,
        structure_type: TypeId,
        feature: FeatureId,
    ) -> FeatureResult<()> {
        if !self.features.contains_key(&feature) {
            return Err(FeatureError::FeatureNotFound(feature));
        }
        let t = self
            .types
            .get_mut(&structure_type)
            .ok_or(FeatureError::TypeNotFound(structure_type))?;
        if !t.features.contains(&feature) {
            t.features.push(feature);
        }
        Ok(())
    }

    // ── Removal (catalog side only; see `cascade` for structures) ──

    pub fn remove_symbolic_value(&mut self, id: SymbolId) -> FeatureResult<SymbolicValue> {
        let value = self
            .symbols
            .remove(&id)
            .ok_or(FeatureError::SymbolNotFound(id))?;
        if let Some(key) = &value.catalog_id {
            self.index.symbols.remove(key);
        }
        if let Some(FeatureDefinition {
            kind: FeatureKind::Closed { values },
            ..
        }) = self.features.get_mut(&value.owner)
        {
            values.retain(|v| *v != id);
        }
        Ok(value)
    }

    /// Remove a feature together with the symbolic values it owns, and
    /// detach it from every structure type.
    pub fn remove_feature(&mut self, id: FeatureId) -> FeatureResult<FeatureDefinition> {
        let def = self
            .features
            .remove(&id)
            .ok_or(FeatureError::FeatureNotFound(id))?;
        if let Some(key) = &def.catalog_id {
            self.index.features.remove(key);
        }
        for symbol in def.values() {
            if let Some(value) = self.symbols.remove(symbol) {
                if let Some(key) = &value.catalog_id {
                    self.index.symbols.remove(key);
                }
            }
        }
        for t in self.types.values_mut() {
            t.features.retain(|f| *f != id);
        }
        Ok(def)
    }

    /// Remove a structure type, unscoping its child types and clearing it
    /// as the declared type of complex features.
    pub fn remove_structure_type(&mut self, id: TypeId) -> FeatureResult<StructureType> {
        let removed = self
            .types
            .remove(&id)
            .ok_or(FeatureError::TypeNotFound(id))?;
        if let Some(key) = &removed.catalog_id {
            self.index.types.remove(key);
        }
        for t in self.types.values_mut() {
            if t.parent == Some(id) {
                t.parent = None;
            }
        }
        for f in self.features.values_mut() {
            if let FeatureKind::Complex { structure_type } = &mut f.kind {
                if *structure_type == Some(id) {
                    *structure_type = None;
                }
            }
        }
        Ok(removed)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender(catalog: &mut FeatureCatalog) -> (FeatureId, SymbolId, SymbolId) {
        let gen = catalog.add_feature(
            FeatureDefinition::closed(Labels::new("en", "gender", "gen")).with_catalog_id("fGender"),
        );
        let masc = catalog
            .add_symbolic_value(
                gen,
                SymbolicValue::new(Labels::new("en", "masculine", "m")).with_catalog_id("vMasc"),
            )
            .unwrap();
        let fem = catalog
            .add_symbolic_value(
                gen,
                SymbolicValue::new(Labels::new("en", "feminine", "f")).with_catalog_id("vFem"),
            )
            .unwrap();
        (gen, masc, fem)
    }

    #[test]
    fn test_lookup_by_catalog_id() {
        let mut catalog = FeatureCatalog::new();
        let (gen, masc, _) = gender(&mut catalog);

        assert_eq!(catalog.feature("fGender").map(|f| f.id), Some(gen));
        assert_eq!(catalog.symbolic_value("vMasc").map(|s| s.id), Some(masc));
        assert_eq!(catalog.symbolic_value("vMasc").map(|s| s.owner), Some(gen));
        assert!(catalog.feature("fNumber").is_none());
        assert!(catalog.structure_type("Agr").is_none());
    }

    #[test]
    fn test_same_catalog_id_is_interned() {
        let mut catalog = FeatureCatalog::new();
        let (gen, _, _) = gender(&mut catalog);

        let again = catalog.add_feature(
            FeatureDefinition::closed(Labels::new("en", "other", "o")).with_catalog_id("fGender"),
        );
        assert_eq!(again, gen);
        assert_eq!(catalog.feature_count(), 1);
        assert_eq!(
            catalog.feature_by_id(gen).unwrap().labels.name.get("en"),
            Some("gender")
        );
    }

    #[test]
    fn test_value_of_rejects_foreign_symbol() {
        let mut catalog = FeatureCatalog::new();
        let (gen, masc, _) = gender(&mut catalog);
        let num = catalog.add_feature(FeatureDefinition::closed(Labels::new("en", "number", "num")));
        let sg = catalog
            .add_symbolic_value(num, SymbolicValue::new(Labels::new("en", "singular", "sg")))
            .unwrap();

        assert!(catalog.value_of(gen, masc).is_ok());
        assert!(matches!(
            catalog.value_of(gen, sg),
            Err(FeatureError::NotOwned { .. })
        ));
    }

    #[test]
    fn test_symbolic_value_requires_closed_feature() {
        let mut catalog = FeatureCatalog::new();
        let agr = catalog.add_feature(FeatureDefinition::complex(
            Labels::new("en", "agreement", "agr"),
            None,
        ));
        let err = catalog
            .add_symbolic_value(agr, SymbolicValue::new(Labels::new("en", "x", "x")))
            .unwrap_err();
        assert!(matches!(err, FeatureError::NotClosedFeature(id) if id == agr));
    }

    #[test]
    fn test_symbol_catalog_id_clash_across_features_is_rejected() {
        let mut catalog = FeatureCatalog::new();
        gender(&mut catalog);
        let num = catalog.add_feature(FeatureDefinition::closed(Labels::new("en", "number", "num")));
        let err = catalog
            .add_symbolic_value(
                num,
                SymbolicValue::new(Labels::new("en", "m", "m")).with_catalog_id("vMasc"),
            )
            .unwrap_err();
        assert!(matches!(err, FeatureError::NotOwned { .. }));
    }

    #[test]
    fn test_type_allows_inherited_features() {
        let mut catalog = FeatureCatalog::new();
        let (gen, _, _) = gender(&mut catalog);
        let outer = catalog.add_structure_type(StructureType::new(Labels::new("en", "infl", "infl")));
        let inner = catalog.add_structure_type(
            StructureType::new(Labels::new("en", "noun infl", "n-infl")).with_parent(outer),
        );
        catalog.add_feature_to_type(outer, gen).unwrap();

        assert!(catalog.type_allows(inner, gen));
        assert!(catalog.type_allows(outer, gen));
        assert!(!catalog.type_allows(TypeId::new(), gen));
    }

    #[test]
    fn test_remove_feature_drops_owned_values() {
        let mut catalog = FeatureCatalog::new();
        let (gen, masc, _) = gender(&mut catalog);
        let t = catalog.add_structure_type(StructureType::new(Labels::new("en", "agr", "agr")));
        catalog.add_feature_to_type(t, gen).unwrap();

        catalog.remove_feature(gen).unwrap();
        assert_eq!(catalog.symbolic_value_count(), 0);
        assert!(catalog.symbolic_value_by_id(masc).is_none());
        assert!(catalog.symbolic_value("vMasc").is_none());
        assert!(catalog.structure_type_by_id(t).unwrap().features.is_empty());
    }

    #[test]
    fn test_remove_structure_type_clears_references() {
        let mut catalog = FeatureCatalog::new();
        let t = catalog.add_structure_type(StructureType::new(Labels::new("en", "agr", "agr")));
        let child = catalog.add_structure_type(
            StructureType::new(Labels::new("en", "sub", "sub")).with_parent(t),
        );
        let agr = catalog.add_feature(FeatureDefinition::complex(
            Labels::new("en", "agreement", "agr"),
            Some(t),
        ));

        catalog.remove_structure_type(t).unwrap();
        assert_eq!(catalog.structure_type_by_id(child).unwrap().parent, None);
        assert_eq!(catalog.feature_by_id(agr).unwrap().nested_type(), None);
    }

    #[test]
    fn test_json_snapshot_rebuilds_index() {
        let mut catalog = FeatureCatalog::new();
        let (gen, masc, _) = gender(&mut catalog);

        let json = catalog.to_json().unwrap();
        let restored = FeatureCatalog::from_json(&json).unwrap();

        assert_eq!(restored.feature("fGender").map(|f| f.id), Some(gen));
        assert_eq!(restored.symbolic_value("vMasc").map(|s| s.id), Some(masc));
        assert_eq!(restored.feature_by_id(gen).unwrap().values().len(), 2);
    }
}
