//! Feature, symbolic value and structure type definitions.

use serde::{Deserialize, Serialize};

use featsys_types::{FeatureId, MultiString, SymbolId, TypeId};

/// Labels carried by every catalog object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub name: MultiString,
    pub abbreviation: MultiString,
    #[serde(default)]
    pub description: MultiString,
}

impl Labels {
    /// Name and abbreviation in a single writing system
    pub fn new(ws: &str, name: &str, abbreviation: &str) -> Self {
        Self {
            name: MultiString::with(ws, name),
            abbreviation: MultiString::with(ws, abbreviation),
            description: MultiString::new(),
        }
    }

    /// Every label set to `text` in each writing system
    pub fn replicated<S: AsRef<str>>(text: &str, writing_systems: &[S]) -> Self {
        Self {
            name: MultiString::replicated(text, writing_systems),
            abbreviation: MultiString::replicated(text, writing_systems),
            description: MultiString::replicated(text, writing_systems),
        }
    }
}

/// Closed or complex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Values are drawn from an owned, enumerated set
    Closed { values: Vec<SymbolId> },
    /// Values are nested feature structures of the given type
    Complex { structure_type: Option<TypeId> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub id: FeatureId,
    /// Stable key in the external catalog, e.g. "fGender"
    pub catalog_id: Option<String>,
    pub labels: Labels,
    pub show_in_gloss: bool,
    /// Compact glosses put the feature label after the value
    pub display_to_right_of_values: bool,
    /// Separator between feature and value in compact glosses
    pub right_gloss_separator: Option<String>,
    pub kind: FeatureKind,
}

impl FeatureDefinition {
    pub fn closed(labels: Labels) -> Self {
        Self::with_kind(labels, FeatureKind::Closed { values: Vec::new() })
    }

    pub fn complex(labels: Labels, structure_type: Option<TypeId>) -> Self {
        Self::with_kind(labels, FeatureKind::Complex { structure_type })
    }

    fn with_kind(labels: Labels, kind: FeatureKind) -> Self {
        Self {
            id: FeatureId::new(),
            catalog_id: None,
            labels,
            show_in_gloss: true,
            display_to_right_of_values: false,
            right_gloss_separator: None,
            kind,
        }
    }

    pub fn with_id(mut self, id: FeatureId) -> Self {
        self.id = id;
        self
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.kind, FeatureKind::Closed { .. })
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, FeatureKind::Complex { .. })
    }

    /// Symbolic values owned by a closed feature (empty for complex ones)
    pub fn values(&self) -> &[SymbolId] {
        match &self.kind {
            FeatureKind::Closed { values } => values,
            FeatureKind::Complex { .. } => &[],
        }
    }

    pub fn owns(&self, symbol: SymbolId) -> bool {
        self.values().contains(&symbol)
    }

    /// Declared type of the nested structure of a complex feature
    pub fn nested_type(&self) -> Option<TypeId> {
        match &self.kind {
            FeatureKind::Complex { structure_type } => *structure_type,
            FeatureKind::Closed { .. } => None,
        }
    }
}

/// A value of a closed feature, e.g. "masculine"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicValue {
    pub id: SymbolId,
    pub catalog_id: Option<String>,
    /// The closed feature that owns this value
    pub owner: FeatureId,
    pub labels: Labels,
    pub show_in_gloss: bool,
}

impl SymbolicValue {
    /// Build a value; the owner is assigned when it is added to a feature.
    pub fn new(labels: Labels) -> Self {
        Self {
            id: SymbolId::new(),
            catalog_id: None,
            owner: FeatureId::from_uuid(uuid::Uuid::nil()),
            labels,
            show_in_gloss: true,
        }
    }

    pub fn with_id(mut self, id: SymbolId) -> Self {
        self.id = id;
        self
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }
}

/// Named set of the features legal in structures tagged with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureType {
    pub id: TypeId,
    pub catalog_id: Option<String>,
    pub labels: Labels,
    pub features: Vec<FeatureId>,
    /// Enclosing type this one is scoped under
    pub parent: Option<TypeId>,
}

impl StructureType {
    pub fn new(labels: Labels) -> Self {
        Self {
            id: TypeId::new(),
            catalog_id: None,
            labels,
            features: Vec::new(),
            parent: None,
        }
    }

    pub fn with_id(mut self, id: TypeId) -> Self {
        self.id = id;
        self
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }

    pub fn with_parent(mut self, parent: TypeId) -> Self {
        self.parent = Some(parent);
        self
    }
}
