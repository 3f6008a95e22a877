//! Feature values - the closed tagged union stored in a structure's specs.
//!
//! Every value names exactly one feature definition. A value never changes
//! kind; replacing a closed value by a complex one means removing the old
//! value and adding a new one.
//!
//! Values are deliberately not `Clone`: each value has its own identity and
//! a complex value exclusively owns its nested structure. Use
//! [`FeatureValue::deep_clone`] to copy a value under a fresh identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use featsys_types::{
    FeatureError, FeatureId, FeatureResult, MultiString, SymbolId, ValueId, ValueKind,
};

use crate::structure::FeatureStructure;

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureValue {
    id: ValueId,
    feature: FeatureId,
    /// Co-indexing slot used by shared values and alpha variables
    #[serde(default)]
    pub ref_number: i32,
    #[serde(default)]
    pub value_state: i32,
    payload: ValuePayload,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuePayload {
    Closed {
        value: Option<SymbolId>,
    },
    Complex {
        structure: Option<Box<FeatureStructure>>,
    },
    /// Any value of the feature except this one
    Negated {
        value: Option<SymbolId>,
    },
    /// Any one of these values
    Disjunctive {
        values: BTreeSet<SymbolId>,
    },
    /// Same value as another feature value (co-indexation)
    Shared {
        target: Option<ValueId>,
    },
    Open {
        text: MultiString,
    },
}

impl ValuePayload {
    pub fn kind(&self) -> ValueKind {
        match self {
            ValuePayload::Closed { .. } => ValueKind::Closed,
            ValuePayload::Complex { .. } => ValueKind::Complex,
            ValuePayload::Negated { .. } => ValueKind::Negated,
            ValuePayload::Disjunctive { .. } => ValueKind::Disjunctive,
            ValuePayload::Shared { .. } => ValueKind::Shared,
            ValuePayload::Open { .. } => ValueKind::Open,
        }
    }

    /// Empty payload of the given kind
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Closed => ValuePayload::Closed { value: None },
            ValueKind::Complex => ValuePayload::Complex { structure: None },
            ValueKind::Negated => ValuePayload::Negated { value: None },
            ValueKind::Disjunctive => ValuePayload::Disjunctive {
                values: BTreeSet::new(),
            },
            ValueKind::Shared => ValuePayload::Shared { target: None },
            ValueKind::Open => ValuePayload::Open {
                text: MultiString::new(),
            },
        }
    }

    /// Copy of the payload; nested structures are deep-cloned.
    pub fn deep_clone(&self) -> Self {
        match self {
            ValuePayload::Closed { value } => ValuePayload::Closed { value: *value },
            ValuePayload::Complex { structure } => ValuePayload::Complex {
                structure: structure.as_ref().map(|s| Box::new(s.deep_clone())),
            },
            ValuePayload::Negated { value } => ValuePayload::Negated { value: *value },
            ValuePayload::Disjunctive { values } => ValuePayload::Disjunctive {
                values: values.clone(),
            },
            ValuePayload::Shared { target } => ValuePayload::Shared { target: *target },
            ValuePayload::Open { text } => ValuePayload::Open { text: text.clone() },
        }
    }
}

impl FeatureValue {
    pub fn new(feature: FeatureId, payload: ValuePayload) -> Self {
        Self {
            id: ValueId::new(),
            feature,
            ref_number: 0,
            value_state: 0,
            payload,
        }
    }

    pub fn closed(feature: FeatureId, value: SymbolId) -> Self {
        Self::new(feature, ValuePayload::Closed { value: Some(value) })
    }

    pub fn complex(feature: FeatureId, structure: FeatureStructure) -> Self {
        Self::new(
            feature,
            ValuePayload::Complex {
                structure: Some(Box::new(structure)),
            },
        )
    }

    pub fn negated(feature: FeatureId, value: SymbolId) -> Self {
        Self::new(feature, ValuePayload::Negated { value: Some(value) })
    }

    pub fn disjunctive(feature: FeatureId, values: impl IntoIterator<Item = SymbolId>) -> Self {
        Self::new(
            feature,
            ValuePayload::Disjunctive {
                values: values.into_iter().collect(),
            },
        )
    }

    pub fn shared(feature: FeatureId, target: ValueId) -> Self {
        Self::new(
            feature,
            ValuePayload::Shared {
                target: Some(target),
            },
        )
    }

    pub fn open(feature: FeatureId, text: MultiString) -> Self {
        Self::new(feature, ValuePayload::Open { text })
    }

    pub fn with_ref_number(mut self, ref_number: i32) -> Self {
        self.ref_number = ref_number;
        self
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    pub fn kind(&self) -> ValueKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &ValuePayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut ValuePayload {
        &mut self.payload
    }

    fn mismatch(&self, expected: ValueKind) -> FeatureError {
        FeatureError::KindMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// Symbolic value of a closed value
    pub fn closed_value(&self) -> FeatureResult<Option<SymbolId>> {
        match &self.payload {
            ValuePayload::Closed { value } => Ok(*value),
            _ => Err(self.mismatch(ValueKind::Closed)),
        }
    }

    pub fn set_closed_value(&mut self, symbol: SymbolId) -> FeatureResult<()> {
        let found = self.kind();
        match &mut self.payload {
            ValuePayload::Closed { value } => {
                *value = Some(symbol);
                Ok(())
            }
            _ => Err(FeatureError::KindMismatch {
                expected: ValueKind::Closed,
                found,
            }),
        }
    }

    /// Nested structure of a complex value (`None` when not yet created)
    pub fn nested(&self) -> FeatureResult<Option<&FeatureStructure>> {
        match &self.payload {
            ValuePayload::Complex { structure } => Ok(structure.as_deref()),
            _ => Err(self.mismatch(ValueKind::Complex)),
        }
    }

    /// Nested structure of a complex value, created empty on first use
    pub fn nested_mut(&mut self) -> FeatureResult<&mut FeatureStructure> {
        let found = self.kind();
        match &mut self.payload {
            ValuePayload::Complex { structure } => {
                Ok(&mut **structure.get_or_insert_with(|| Box::new(FeatureStructure::new())))
            }
            _ => Err(FeatureError::KindMismatch {
                expected: ValueKind::Complex,
                found,
            }),
        }
    }

    /// Symbols this value points at (closed, negated and disjunctive values)
    pub fn symbols(&self) -> Vec<SymbolId> {
        match &self.payload {
            ValuePayload::Closed { value } | ValuePayload::Negated { value } => {
                value.iter().copied().collect()
            }
            ValuePayload::Disjunctive { values } => values.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Structural equivalence.
    ///
    /// Different kinds are never equivalent. Closed, negated and shared
    /// values compare their target by identity; complex values compare
    /// nested structures (a missing nested structure matches an empty one);
    /// disjunctive values compare their sets ignoring order.
    pub fn equivalent(&self, other: &FeatureValue) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        if self.feature != other.feature
            || self.ref_number != other.ref_number
            || self.value_state != other.value_state
        {
            return false;
        }

        match (&self.payload, &other.payload) {
            (ValuePayload::Closed { value: a }, ValuePayload::Closed { value: b })
            | (ValuePayload::Negated { value: a }, ValuePayload::Negated { value: b }) => a == b,
            (ValuePayload::Complex { structure: a }, ValuePayload::Complex { structure: b }) => {
                crate::structure::structures_equivalent(a.as_deref(), b.as_deref())
            }
            (
                ValuePayload::Disjunctive { values: a },
                ValuePayload::Disjunctive { values: b },
            ) => a == b,
            (ValuePayload::Shared { target: a }, ValuePayload::Shared { target: b }) => a == b,
            (ValuePayload::Open { text: a }, ValuePayload::Open { text: b }) => a == b,
            _ => false,
        }
    }

    /// Copy under a fresh identity. Complex values deep-clone their nested
    /// structure; all other kinds copy their references.
    pub fn deep_clone(&self) -> FeatureValue {
        let mut copy = self.create_same_kind();
        copy.ref_number = self.ref_number;
        copy.value_state = self.value_state;
        copy.payload = self.payload.deep_clone();
        copy
    }

    /// Empty value of the same kind, bound to the same feature
    pub fn create_same_kind(&self) -> FeatureValue {
        FeatureValue::new(self.feature, ValuePayload::empty(self.kind()))
    }

    /// Visit this value and every value nested below it
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a FeatureValue)) {
        visit(self);
        if let ValuePayload::Complex {
            structure: Some(nested),
        } = &self.payload
        {
            nested.walk_values(visit);
        }
    }
}
