//! Feature structures and disjunctions.
//!
//! A structure owns its feature values ("specs") and its disjunctions; a
//! disjunction owns its alternative structures. Nothing is shared by
//! reference, so a structure can be deep-cloned or merged in place without
//! coordination.

use serde::{Deserialize, Serialize};

use featsys_types::{
    DisjunctionId, FeatureId, FeatureResult, StructureId, SymbolId, TypeId, ValueId,
};

use crate::value::{FeatureValue, ValuePayload};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeatureStructure {
    id: StructureId,
    #[serde(default)]
    structure_type: Option<TypeId>,
    #[serde(default)]
    specs: Vec<FeatureValue>,
    #[serde(default)]
    disjunctions: Vec<FeatureStructureDisjunction>,
}

/// Alternatives of which at least one must hold
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeatureStructureDisjunction {
    id: DisjunctionId,
    #[serde(default)]
    contents: Vec<FeatureStructure>,
}

/// Whether an owner has become pointless once a dead child was removed
/// from it. Drives the upward walk of cascading deletion.
///
/// Checked after the child is gone, so "the dead child was the owner's only
/// item" reads as zero items remaining, and the walk stops at the first
/// owner that still holds something.
pub trait VacuityRule {
    fn vacuous_after_removal(&self) -> bool;
}

impl VacuityRule for FeatureStructure {
    fn vacuous_after_removal(&self) -> bool {
        self.item_count() == 0
    }
}

impl VacuityRule for FeatureStructureDisjunction {
    fn vacuous_after_removal(&self) -> bool {
        self.contents.is_empty()
    }
}

impl VacuityRule for FeatureValue {
    /// A complex value whose nested structure died has nothing left to say.
    fn vacuous_after_removal(&self) -> bool {
        true
    }
}

/// Equivalence where an absent structure matches an empty one
pub fn structures_equivalent(a: Option<&FeatureStructure>, b: Option<&FeatureStructure>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(s), None) | (None, Some(s)) => s.is_empty(),
        (Some(a), Some(b)) => a.equivalent_to(b),
    }
}

impl FeatureStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(structure_type: TypeId) -> Self {
        Self {
            structure_type: Some(structure_type),
            ..Self::default()
        }
    }

    pub fn id(&self) -> StructureId {
        self.id
    }

    pub fn structure_type(&self) -> Option<TypeId> {
        self.structure_type
    }

    pub fn set_structure_type(&mut self, structure_type: Option<TypeId>) {
        self.structure_type = structure_type;
    }

    pub fn specs(&self) -> &[FeatureValue] {
        &self.specs
    }

    pub fn disjunctions(&self) -> &[FeatureStructureDisjunction] {
        &self.disjunctions
    }

    /// No type, no specs, no disjunctions. Treated like "no structure".
    pub fn is_empty(&self) -> bool {
        self.structure_type.is_none() && self.specs.is_empty() && self.disjunctions.is_empty()
    }

    /// Specs plus disjunctions
    pub fn item_count(&self) -> usize {
        self.specs.len() + self.disjunctions.len()
    }

    /// Append a value. Callers keep at most one value per feature; see
    /// [`crate::validate::validate_structure`].
    pub fn add_spec(&mut self, value: FeatureValue) -> &mut FeatureValue {
        self.specs.push(value);
        let last = self.specs.len() - 1;
        &mut self.specs[last]
    }

    pub fn remove_spec(&mut self, id: ValueId) -> Option<FeatureValue> {
        let index = self.specs.iter().position(|v| v.id() == id)?;
        Some(self.specs.remove(index))
    }

    pub(crate) fn specs_mut(&mut self) -> &mut Vec<FeatureValue> {
        &mut self.specs
    }

    pub(crate) fn disjunctions_mut(&mut self) -> &mut Vec<FeatureStructureDisjunction> {
        &mut self.disjunctions
    }

    pub fn add_disjunction(&mut self, disjunction: FeatureStructureDisjunction) {
        self.disjunctions.push(disjunction);
    }

    pub fn find_value(&self, feature: FeatureId) -> Option<&FeatureValue> {
        self.specs.iter().find(|v| v.feature() == feature)
    }

    pub fn find_value_mut(&mut self, feature: FeatureId) -> Option<&mut FeatureValue> {
        self.specs.iter_mut().find(|v| v.feature() == feature)
    }

    /// Set `feature` to `symbol`, updating an existing closed value in place.
    pub fn set_closed_value(&mut self, feature: FeatureId, symbol: SymbolId) -> FeatureResult<()> {
        match self.find_value_mut(feature) {
            Some(existing) => existing.set_closed_value(symbol),
            None => {
                self.specs.push(FeatureValue::closed(feature, symbol));
                Ok(())
            }
        }
    }

    /// Nested structure of the complex value for `feature`, creating the
    /// value and/or its structure when missing.
    pub fn complex_value_mut(&mut self, feature: FeatureId) -> FeatureResult<&mut FeatureStructure> {
        let index = match self.specs.iter().position(|v| v.feature() == feature) {
            Some(index) => index,
            None => {
                self.specs.push(FeatureValue::new(
                    feature,
                    ValuePayload::Complex { structure: None },
                ));
                self.specs.len() - 1
            }
        };
        self.specs[index].nested_mut()
    }

    /// Closed value currently set for `feature`
    pub fn closed_value(&self, feature: FeatureId) -> FeatureResult<Option<SymbolId>> {
        match self.find_value(feature) {
            Some(value) => value.closed_value(),
            None => Ok(None),
        }
    }

    /// Nested structure of the complex value for `feature`
    pub fn nested(&self, feature: FeatureId) -> FeatureResult<Option<&FeatureStructure>> {
        match self.find_value(feature) {
            Some(value) => value.nested(),
            None => Ok(None),
        }
    }

    /// Structural equivalence with a possibly absent structure
    pub fn equivalent(&self, other: Option<&FeatureStructure>) -> bool {
        structures_equivalent(Some(self), other)
    }

    /// Order-independent comparison: same type, same counts, and every spec
    /// (and disjunction) here has some equivalent counterpart in `other`.
    fn equivalent_to(&self, other: &FeatureStructure) -> bool {
        if self.structure_type != other.structure_type
            || self.specs.len() != other.specs.len()
            || self.disjunctions.len() != other.disjunctions.len()
        {
            return false;
        }

        let specs_match = self
            .specs
            .iter()
            .all(|mine| other.specs.iter().any(|theirs| mine.equivalent(theirs)));
        if !specs_match {
            return false;
        }

        self.disjunctions.iter().all(|mine| {
            other
                .disjunctions
                .iter()
                .any(|theirs| mine.equivalent(theirs))
        })
    }

    /// Copy under fresh identities, recursively
    pub fn deep_clone(&self) -> FeatureStructure {
        FeatureStructure {
            id: StructureId::new(),
            structure_type: self.structure_type,
            specs: self.specs.iter().map(FeatureValue::deep_clone).collect(),
            disjunctions: self
                .disjunctions
                .iter()
                .map(FeatureStructureDisjunction::deep_clone)
                .collect(),
        }
    }

    /// Visit every value in this structure, its nested structures and its
    /// disjunction alternatives
    pub fn walk_values<'a>(&'a self, visit: &mut dyn FnMut(&'a FeatureValue)) {
        for value in &self.specs {
            value.walk(visit);
        }
        for disjunction in &self.disjunctions {
            for alternative in &disjunction.contents {
                alternative.walk_values(visit);
            }
        }
    }

    /// Visit this structure and every structure below it
    pub fn walk_structures_mut(&mut self, visit: &mut dyn FnMut(&mut FeatureStructure)) {
        visit(self);
        for value in &mut self.specs {
            if let ValuePayload::Complex {
                structure: Some(nested),
            } = value.payload_mut()
            {
                nested.walk_structures_mut(visit);
            }
        }
        for disjunction in &mut self.disjunctions {
            for alternative in &mut disjunction.contents {
                alternative.walk_structures_mut(visit);
            }
        }
    }

    /// Value with the given identity anywhere below this structure
    pub fn find_by_id(&self, id: ValueId) -> Option<&FeatureValue> {
        let mut found = None;
        self.walk_values(&mut |v| {
            if found.is_none() && v.id() == id {
                found = Some(v);
            }
        });
        found
    }
}

impl FeatureStructureDisjunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alternatives(alternatives: impl IntoIterator<Item = FeatureStructure>) -> Self {
        Self {
            id: DisjunctionId::new(),
            contents: alternatives.into_iter().collect(),
        }
    }

    pub fn id(&self) -> DisjunctionId {
        self.id
    }

    pub fn contents(&self) -> &[FeatureStructure] {
        &self.contents
    }

    pub(crate) fn contents_mut(&mut self) -> &mut Vec<FeatureStructure> {
        &mut self.contents
    }

    pub fn push(&mut self, alternative: FeatureStructure) {
        self.contents.push(alternative);
    }

    /// Same number of alternatives, each matched by some equivalent
    /// alternative on the other side
    pub fn equivalent(&self, other: &FeatureStructureDisjunction) -> bool {
        self.contents.len() == other.contents.len()
            && self.contents.iter().all(|mine| {
                other
                    .contents
                    .iter()
                    .any(|theirs| structures_equivalent(Some(mine), Some(theirs)))
            })
    }

    pub fn deep_clone(&self) -> FeatureStructureDisjunction {
        FeatureStructureDisjunction {
            id: DisjunctionId::new(),
            contents: self
                .contents
                .iter()
                .map(FeatureStructure::deep_clone)
                .collect(),
        }
    }
}
