//! Priority union: an in-place merge where the incoming structure wins every
//! leaf it sets.
//!
//! This is not unification. Conflicting leaves never fail; the only error is
//! a common feature carried by values of different kinds, which is checked
//! over the whole tree before anything is touched.

use tracing::debug;

use featsys_types::{FeatureError, FeatureResult};

use crate::structure::FeatureStructure;
use crate::value::{FeatureValue, ValuePayload};

impl FeatureStructure {
    /// Merge `incoming` into `self`.
    ///
    /// - Features only in `incoming` are deep-cloned into `self`.
    /// - Common closed features take incoming's symbol.
    /// - Common complex features merge recursively, so nested features that
    ///   `incoming` does not set survive.
    /// - Other common leaves take incoming's payload.
    /// - Disjunctions of `incoming` with no equivalent in `self` are
    ///   deep-cloned in; an untyped `self` adopts incoming's type.
    pub fn priority_union(&mut self, incoming: &FeatureStructure) -> FeatureResult<()> {
        check_compatible(self, incoming)?;
        merge(self, incoming);
        Ok(())
    }
}

fn check_compatible(target: &FeatureStructure, incoming: &FeatureStructure) -> FeatureResult<()> {
    for theirs in incoming.specs() {
        let Some(mine) = target.find_value(theirs.feature()) else {
            continue;
        };
        if mine.kind() != theirs.kind() {
            return Err(FeatureError::KindMismatch {
                expected: mine.kind(),
                found: theirs.kind(),
            });
        }
        if let (Ok(Some(a)), Ok(Some(b))) = (mine.nested(), theirs.nested()) {
            check_compatible(a, b)?;
        }
    }
    Ok(())
}

fn merge(target: &mut FeatureStructure, incoming: &FeatureStructure) {
    if target.structure_type().is_none() {
        target.set_structure_type(incoming.structure_type());
    }

    let mut added = 0usize;
    for theirs in incoming.specs() {
        match target.find_value_mut(theirs.feature()) {
            Some(mine) => merge_common(mine, theirs),
            None => {
                target.add_spec(theirs.deep_clone());
                added += 1;
            }
        }
    }

    for disjunction in incoming.disjunctions() {
        let present = target
            .disjunctions()
            .iter()
            .any(|existing| existing.equivalent(disjunction));
        if !present {
            target.add_disjunction(disjunction.deep_clone());
        }
    }

    debug!(
        structure = %target.id(),
        added,
        common = incoming.specs().len() - added,
        "priority union"
    );
}

fn merge_common(mine: &mut FeatureValue, theirs: &FeatureValue) {
    match (mine.payload_mut(), theirs.payload()) {
        (ValuePayload::Closed { value }, ValuePayload::Closed { value: incoming }) => {
            if incoming.is_some() {
                *value = *incoming;
            }
        }
        (ValuePayload::Complex { structure }, ValuePayload::Complex { structure: incoming }) => {
            if let Some(incoming) = incoming {
                match structure {
                    Some(existing) => merge(existing, incoming),
                    None => *structure = Some(Box::new(incoming.deep_clone())),
                }
            }
        }
        (payload, incoming) => *payload = incoming.deep_clone(),
    }
}
