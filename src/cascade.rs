//! Cascading deletion.
//!
//! Removing a catalog object (or a value) can leave feature values pointing
//! at nothing. Deletion is split into two hooks around the actual removal:
//!
//! 1. [`before_delete`] walks every hosted structure and collects the values
//!    that become meaningless once the target is gone.
//! 2. [`after_delete`] removes those values and walks up the ownership chain,
//!    removing owners that are left with nothing in them (see
//!    [`VacuityRule`]).
//!
//! Shared values whose target disappears are removed as well, repeatedly,
//! until nothing more dangles.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use featsys_types::{FeatureId, SymbolId, TypeId, ValueId};

use crate::catalog::FeatureCatalog;
use crate::structure::{FeatureStructure, VacuityRule};
use crate::value::{FeatureValue, ValuePayload};

/// What is about to be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionTarget {
    Symbol(SymbolId),
    Feature(FeatureId),
    StructureType(TypeId),
    Value(ValueId),
}

/// Owner of root feature structures (a part of speech, an analysis, a rule
/// context). Each root lives in a slot that deletion may empty.
pub trait StructureHost {
    fn roots(&self) -> Vec<&FeatureStructure>;

    fn root_slots(&mut self) -> Vec<&mut Option<FeatureStructure>>;
}

// ── In-memory host ────────────────────────────────────────────────────

/// Root structures keyed by owner name
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryStructureHost {
    slots: BTreeMap<String, Option<FeatureStructure>>,
}

impl MemoryStructureHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `structure` under `owner`, returning whatever was there before
    pub fn attach(
        &mut self,
        owner: impl Into<String>,
        structure: FeatureStructure,
    ) -> Option<FeatureStructure> {
        self.slots.insert(owner.into(), Some(structure)).flatten()
    }

    pub fn get(&self, owner: &str) -> Option<&FeatureStructure> {
        self.slots.get(owner).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, owner: &str) -> Option<&mut FeatureStructure> {
        self.slots.get_mut(owner).and_then(Option::as_mut)
    }
}

impl StructureHost for MemoryStructureHost {
    fn roots(&self) -> Vec<&FeatureStructure> {
        self.slots.values().filter_map(Option::as_ref).collect()
    }

    fn root_slots(&mut self) -> Vec<&mut Option<FeatureStructure>> {
        self.slots.values_mut().collect()
    }
}

// ── Hooks ─────────────────────────────────────────────────────────────

/// Work collected by [`before_delete`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCascade {
    /// Values to remove outright
    pub doomed: BTreeSet<ValueId>,
    /// Disjunctive values that survive with fewer symbols
    pub prune: BTreeMap<ValueId, BTreeSet<SymbolId>>,
    /// Structure type tag to clear
    pub cleared_type: Option<TypeId>,
}

impl PendingCascade {
    pub fn is_empty(&self) -> bool {
        self.doomed.is_empty() && self.prune.is_empty() && self.cleared_type.is_none()
    }
}

/// What [`after_delete`] actually did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Values removed, including complex values removed because their
    /// nested structure emptied
    pub removed_values: Vec<ValueId>,
    /// Disjunctive values that lost symbols but survived
    pub pruned_values: Vec<ValueId>,
    pub removed_structures: usize,
    pub removed_disjunctions: usize,
    /// Root structures emptied and detached from their host slot
    pub detached_roots: usize,
    /// Structures whose type tag was cleared
    pub cleared_types: usize,
}

/// Collect the values made meaningless by deleting `target`.
///
/// `catalog` must still contain the target: deleting a feature also dooms
/// values pointing at the symbols it owns.
pub fn before_delete(
    target: DeletionTarget,
    catalog: &FeatureCatalog,
    host: &impl StructureHost,
) -> PendingCascade {
    let mut pending = PendingCascade::default();

    let (feature, symbols): (Option<FeatureId>, BTreeSet<SymbolId>) = match target {
        DeletionTarget::Symbol(symbol) => (None, BTreeSet::from([symbol])),
        DeletionTarget::Feature(feature) => (
            Some(feature),
            catalog
                .feature_by_id(feature)
                .map(|def| def.values().iter().copied().collect())
                .unwrap_or_default(),
        ),
        DeletionTarget::StructureType(structure_type) => {
            pending.cleared_type = Some(structure_type);
            (None, BTreeSet::new())
        }
        DeletionTarget::Value(value) => {
            pending.doomed.insert(value);
            (None, BTreeSet::new())
        }
    };

    for root in host.roots() {
        root.walk_values(&mut |value| {
            if feature == Some(value.feature()) {
                pending.doomed.insert(value.id());
                return;
            }
            match value.payload() {
                ValuePayload::Closed { value: Some(s) } | ValuePayload::Negated { value: Some(s) }
                    if symbols.contains(s) =>
                {
                    pending.doomed.insert(value.id());
                }
                ValuePayload::Disjunctive { values } if !values.is_disjoint(&symbols) => {
                    let lost: BTreeSet<SymbolId> =
                        values.intersection(&symbols).copied().collect();
                    if lost.len() == values.len() {
                        pending.doomed.insert(value.id());
                    } else {
                        pending.prune.insert(value.id(), lost);
                    }
                }
                ValuePayload::Shared {
                    target: Some(shared),
                } if target == DeletionTarget::Value(*shared) => {
                    pending.doomed.insert(value.id());
                }
                _ => {}
            }
        });
    }

    debug!(
        ?target,
        doomed = pending.doomed.len(),
        pruned = pending.prune.len(),
        "cascade collected"
    );
    pending
}

/// Apply a collected cascade to the host's structures
pub fn after_delete(pending: PendingCascade, host: &mut impl StructureHost) -> CascadeReport {
    let mut report = CascadeReport::default();
    if pending.is_empty() {
        debug!("nothing to cascade");
        return report;
    }

    if !pending.prune.is_empty() || pending.cleared_type.is_some() {
        for slot in host.root_slots() {
            if let Some(root) = slot.as_mut() {
                root.walk_structures_mut(&mut |fs| {
                    if pending.cleared_type.is_some() && fs.structure_type() == pending.cleared_type
                    {
                        fs.set_structure_type(None);
                        report.cleared_types += 1;
                    }
                    for value in fs.specs_mut() {
                        if let Some(lost) = pending.prune.get(&value.id()) {
                            if let ValuePayload::Disjunctive { values } = value.payload_mut() {
                                values.retain(|s| !lost.contains(s));
                                report.pruned_values.push(value.id());
                            }
                        }
                    }
                });
            }
        }
    }

    let mut gone: BTreeSet<ValueId> = BTreeSet::new();
    let mut queue: Vec<ValueId> = pending.doomed.into_iter().collect();

    while !queue.is_empty() {
        for id in queue.drain(..) {
            if gone.contains(&id) {
                continue;
            }
            for slot in host.root_slots() {
                let Some(root) = slot.as_mut() else { continue };
                match remove_value(root, id, &mut gone, &mut report) {
                    Removal::NotFound => continue,
                    Removal::Removed => {}
                    Removal::Vacuous => {
                        *slot = None;
                        report.detached_roots += 1;
                    }
                }
                break;
            }
        }

        // Shared values whose target just went away
        for root in host.roots() {
            root.walk_values(&mut |value| {
                if let ValuePayload::Shared {
                    target: Some(target),
                } = value.payload()
                {
                    if gone.contains(target) && !gone.contains(&value.id()) {
                        queue.push(value.id());
                    }
                }
            });
        }
    }

    info!(
        removed = report.removed_values.len(),
        pruned = report.pruned_values.len(),
        structures = report.removed_structures,
        disjunctions = report.removed_disjunctions,
        detached = report.detached_roots,
        "cascade applied"
    );
    report
}

enum Removal {
    NotFound,
    Removed,
    /// Removed, and the structure it came from is now vacuous
    Vacuous,
}

fn remove_value(
    fs: &mut FeatureStructure,
    id: ValueId,
    gone: &mut BTreeSet<ValueId>,
    report: &mut CascadeReport,
) -> Removal {
    if let Some(dead) = fs.remove_spec(id) {
        record_removed(&dead, gone, report);
        return vacuity(fs);
    }

    for index in 0..fs.specs().len() {
        let outcome = match fs.specs_mut()[index].payload_mut() {
            ValuePayload::Complex {
                structure: Some(nested),
            } => remove_value(nested, id, gone, report),
            _ => Removal::NotFound,
        };
        match outcome {
            Removal::NotFound => continue,
            Removal::Removed => return Removal::Removed,
            Removal::Vacuous => {
                report.removed_structures += 1;
                let owner = fs.specs_mut().remove(index);
                if owner.vacuous_after_removal() {
                    record_removed(&owner, gone, report);
                    return vacuity(fs);
                }
                return Removal::Removed;
            }
        }
    }

    for d in 0..fs.disjunctions().len() {
        let disjunction = &mut fs.disjunctions_mut()[d];
        for a in 0..disjunction.contents().len() {
            match remove_value(&mut disjunction.contents_mut()[a], id, gone, report) {
                Removal::NotFound => continue,
                Removal::Removed => return Removal::Removed,
                Removal::Vacuous => {
                    disjunction.contents_mut().remove(a);
                    report.removed_structures += 1;
                    if !disjunction.vacuous_after_removal() {
                        return Removal::Removed;
                    }
                    fs.disjunctions_mut().remove(d);
                    report.removed_disjunctions += 1;
                    return vacuity(fs);
                }
            }
        }
    }

    Removal::NotFound
}

fn vacuity(fs: &FeatureStructure) -> Removal {
    if fs.vacuous_after_removal() {
        Removal::Vacuous
    } else {
        Removal::Removed
    }
}

fn record_removed(value: &FeatureValue, gone: &mut BTreeSet<ValueId>, report: &mut CascadeReport) {
    report.removed_values.push(value.id());
    value.walk(&mut |v| {
        gone.insert(v.id());
    });
}
