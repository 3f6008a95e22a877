//! Structural validation of feature structures against a catalog.
//!
//! Most model invariants are left to callers (one value per feature, nested
//! structure typing). This pass reports every violation it finds rather than
//! stopping at the first one.

use std::collections::HashSet;

use featsys_types::{FeatureId, TypeId, ValidationIssue, ValueKind};

use crate::catalog::{FeatureCatalog, FeatureDefinition};
use crate::structure::FeatureStructure;
use crate::value::{FeatureValue, ValuePayload};

/// Validate `fs` and everything nested in it. Returns all issues found.
pub fn validate_structure(catalog: &FeatureCatalog, fs: &FeatureStructure) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    validate_level(catalog, fs, &mut issues);
    issues
}

fn validate_level(catalog: &FeatureCatalog, fs: &FeatureStructure, issues: &mut Vec<ValidationIssue>) {
    // FS7: structure type must exist
    let structure_type = match fs.structure_type() {
        Some(t) if catalog.structure_type_by_id(t).is_none() => {
            issues.push(ValidationIssue::error(
                "FS7",
                format!("Unknown structure type: {}", t),
            ));
            None
        }
        other => other,
    };

    // FS1: at most one value per feature
    let mut seen: HashSet<FeatureId> = HashSet::new();
    for value in fs.specs() {
        if !seen.insert(value.feature()) {
            issues.push(ValidationIssue::error(
                "FS1",
                format!("Duplicate feature: {}", describe(catalog, value.feature())),
            ));
        }
    }

    for value in fs.specs() {
        // FS2: feature must exist
        let Some(def) = catalog.feature_by_id(value.feature()) else {
            issues.push(ValidationIssue::error(
                "FS2",
                format!("Unknown feature: {}", value.feature()),
            ));
            continue;
        };

        // FS6: feature should be declared on the structure type
        if let Some(t) = structure_type {
            if !catalog.type_allows(t, def.id) {
                issues.push(ValidationIssue::warning(
                    "FS6",
                    format!(
                        "Feature {} is not declared on type {}",
                        describe(catalog, def.id),
                        describe_type(catalog, t)
                    ),
                ));
            }
        }

        validate_value(catalog, def, value, issues);
    }

    for disjunction in fs.disjunctions() {
        for alternative in disjunction.contents() {
            validate_level(catalog, alternative, issues);
        }
    }
}

fn validate_value(
    catalog: &FeatureCatalog,
    def: &FeatureDefinition,
    value: &FeatureValue,
    issues: &mut Vec<ValidationIssue>,
) {
    // FS4: value kind must suit the feature kind
    let kind_ok = match value.kind() {
        ValueKind::Complex => def.is_complex(),
        ValueKind::Closed | ValueKind::Negated | ValueKind::Disjunctive => def.is_closed(),
        ValueKind::Shared | ValueKind::Open => true,
    };
    if !kind_ok {
        issues.push(ValidationIssue::error(
            "FS4",
            format!(
                "{} value on {} feature {}",
                value.kind(),
                if def.is_closed() { "closed" } else { "complex" },
                describe(catalog, def.id)
            ),
        ));
        return;
    }

    // FS3: symbols must exist and belong to the feature
    for symbol in value.symbols() {
        if catalog.symbolic_value_by_id(symbol).is_none() {
            issues.push(ValidationIssue::error(
                "FS3",
                format!(
                    "Feature {} refers to a missing symbolic value {}",
                    describe(catalog, def.id),
                    symbol
                ),
            ));
        } else if !def.owns(symbol) {
            issues.push(ValidationIssue::error(
                "FS3",
                format!(
                    "Symbolic value {} is not owned by feature {}",
                    symbol,
                    describe(catalog, def.id)
                ),
            ));
        }
    }

    match value.payload() {
        ValuePayload::Complex {
            structure: Some(nested),
        } => {
            // FS5: nested type must agree with the declared type
            if let (Some(actual), Some(declared)) = (nested.structure_type(), def.nested_type()) {
                if !descends_from(catalog, actual, declared) {
                    issues.push(ValidationIssue::error(
                        "FS5",
                        format!(
                            "Feature {} expects type {} but nested structure has {}",
                            describe(catalog, def.id),
                            describe_type(catalog, declared),
                            describe_type(catalog, actual)
                        ),
                    ));
                }
            }
            validate_level(catalog, nested, issues);
        }
        // FS8: shared values should point somewhere
        ValuePayload::Shared { target: None } => {
            issues.push(ValidationIssue::warning(
                "FS8",
                format!("Shared value on {} has no target", describe(catalog, def.id)),
            ));
        }
        _ => {}
    }
}

/// `t` is `ancestor` or one of its subtypes
fn descends_from(catalog: &FeatureCatalog, t: TypeId, ancestor: TypeId) -> bool {
    let mut current = Some(t);
    let mut visited = HashSet::new();
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = catalog.structure_type_by_id(id).and_then(|st| st.parent);
    }
    false
}

fn describe(catalog: &FeatureCatalog, feature: FeatureId) -> String {
    catalog
        .feature_by_id(feature)
        .and_then(|def| def.catalog_id.clone())
        .unwrap_or_else(|| feature.to_string())
}

fn describe_type(catalog: &FeatureCatalog, t: TypeId) -> String {
    catalog
        .structure_type_by_id(t)
        .and_then(|st| st.catalog_id.clone())
        .unwrap_or_else(|| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Labels, StructureType, SymbolicValue};
    use featsys_types::{IssueSeverity, SymbolId, ValueId};

    struct Fixture {
        catalog: FeatureCatalog,
        agr_type: TypeId,
        gen: FeatureId,
        num: FeatureId,
        agr: FeatureId,
        masc: SymbolId,
        pl: SymbolId,
    }

    fn fixture() -> Fixture {
        let mut catalog = FeatureCatalog::new();
        let agr_type = catalog.add_structure_type(
            StructureType::new(Labels::new("en", "agreement", "agr")).with_catalog_id("tAgr"),
        );
        let gen = catalog.add_feature(
            FeatureDefinition::closed(Labels::new("en", "gender", "gen")).with_catalog_id("fGender"),
        );
        let num = catalog.add_feature(
            FeatureDefinition::closed(Labels::new("en", "number", "num")).with_catalog_id("fNumber"),
        );
        let agr = catalog.add_feature(
            FeatureDefinition::complex(Labels::new("en", "agreement", "agr"), Some(agr_type))
                .with_catalog_id("fAgr"),
        );
        catalog.add_feature_to_type(agr_type, gen).unwrap();
        let masc = catalog
            .add_symbolic_value(gen, SymbolicValue::new(Labels::new("en", "masculine", "m")))
            .unwrap();
        let pl = catalog
            .add_symbolic_value(num, SymbolicValue::new(Labels::new("en", "plural", "pl")))
            .unwrap();
        Fixture {
            catalog,
            agr_type,
            gen,
            num,
            agr,
            masc,
            pl,
        }
    }

    fn rules(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn test_well_formed_structure_has_no_issues() {
        let f = fixture();
        let mut fs = FeatureStructure::new();
        let nested = fs.complex_value_mut(f.agr).unwrap();
        nested.set_structure_type(Some(f.agr_type));
        nested.set_closed_value(f.gen, f.masc).unwrap();
        fs.set_closed_value(f.num, f.pl).unwrap();

        assert!(validate_structure(&f.catalog, &fs).is_empty());
    }

    #[test]
    fn test_duplicate_feature() {
        let f = fixture();
        let mut fs = FeatureStructure::new();
        fs.add_spec(FeatureValue::closed(f.gen, f.masc));
        fs.add_spec(FeatureValue::closed(f.gen, f.masc));
        let issues = validate_structure(&f.catalog, &fs);
        assert_eq!(rules(&issues), vec!["FS1"]);
        assert!(issues[0].message.contains("fGender"));
    }

    #[test]
    fn test_unknown_feature_and_type() {
        let f = fixture();
        let mut fs = FeatureStructure::typed(TypeId::new());
        fs.add_spec(FeatureValue::closed(FeatureId::new(), f.masc));
        assert_eq!(rules(&validate_structure(&f.catalog, &fs)), vec!["FS7", "FS2"]);
    }

    #[test]
    fn test_foreign_and_dangling_symbols() {
        let f = fixture();
        let mut fs = FeatureStructure::new();
        fs.add_spec(FeatureValue::closed(f.gen, f.pl));
        fs.add_spec(FeatureValue::negated(f.num, SymbolId::new()));
        let issues = validate_structure(&f.catalog, &fs);
        assert_eq!(rules(&issues), vec!["FS3", "FS3"]);
        assert!(issues[0].message.contains("not owned"));
        assert!(issues[1].message.contains("missing"));
    }

    #[test]
    fn test_kind_mismatch_with_definition() {
        let f = fixture();
        let mut fs = FeatureStructure::new();
        fs.add_spec(FeatureValue::closed(f.agr, f.masc));
        fs.add_spec(FeatureValue::complex(f.gen, FeatureStructure::new()));
        assert_eq!(rules(&validate_structure(&f.catalog, &fs)), vec!["FS4", "FS4"]);
    }

    #[test]
    fn test_nested_type_mismatch() {
        let mut f = fixture();
        let other = f
            .catalog
            .add_structure_type(StructureType::new(Labels::new("en", "other", "oth")));
        let mut fs = FeatureStructure::new();
        fs.complex_value_mut(f.agr)
            .unwrap()
            .set_structure_type(Some(other));
        assert_eq!(rules(&validate_structure(&f.catalog, &fs)), vec!["FS5"]);
    }

    #[test]
    fn test_subtype_satisfies_nested_type() {
        let mut f = fixture();
        let sub = f.catalog.add_structure_type(
            StructureType::new(Labels::new("en", "sub", "sub")).with_parent(f.agr_type),
        );
        let mut fs = FeatureStructure::new();
        fs.complex_value_mut(f.agr).unwrap().set_structure_type(Some(sub));
        assert!(validate_structure(&f.catalog, &fs).is_empty());
    }

    #[test]
    fn test_undeclared_feature_is_warning() {
        let f = fixture();
        let mut fs = FeatureStructure::typed(f.agr_type);
        fs.set_closed_value(f.num, f.pl).unwrap();
        let issues = validate_structure(&f.catalog, &fs);
        assert_eq!(rules(&issues), vec!["FS6"]);
        assert_eq!(issues[0].severity, IssueSeverity::Warning);
    }

    #[test]
    fn test_issues_inside_disjunctions_are_reported() {
        let f = fixture();
        let mut alt = FeatureStructure::new();
        alt.add_spec(FeatureValue::new(f.gen, ValuePayload::Shared { target: None }));
        let mut fs = FeatureStructure::new();
        fs.add_disjunction(crate::structure::FeatureStructureDisjunction::with_alternatives([
            alt,
        ]));
        fs.add_spec(FeatureValue::shared(f.num, ValueId::new()));
        assert_eq!(rules(&validate_structure(&f.catalog, &fs)), vec!["FS8"]);
    }
}
