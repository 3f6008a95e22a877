//! Catalog bootstrap from the sample catalog file.

mod helpers;

use featsys::catalog::xml::CatalogDocument;
use featsys::catalog::FeatureCatalog;
use featsys::{FeatureId, FeatureSystem, FeatureSystemConfig, RenderOptions, SymbolId, TypeId};
use helpers::sample_catalog_path;
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn writing_systems() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string()]
}

fn guid(n: u8) -> Uuid {
    Uuid::parse_str(&format!("5b1f0c2e-7a41-4c0e-9d55-0000000000{:02x}", n)).unwrap()
}

#[test]
fn sample_catalog_imports_with_one_skip() {
    let mut system = FeatureSystem::new(FeatureSystemConfig::with_writing_systems(["en", "fr"]));
    let summary = system.import_catalog_file(sample_catalog_path()).unwrap();

    assert_eq!(summary.imported.len(), 9);
    assert_eq!(summary.skipped, vec!["vFut".to_string()]);
    // 2 types, 5 features, 9 symbolic values
    assert_eq!(summary.created, 16);

    let catalog = system.catalog();
    assert_eq!(catalog.structure_type_count(), 2);
    assert_eq!(catalog.feature_count(), 5);
    assert_eq!(catalog.symbolic_value_count(), 9);
}

#[test]
fn definitions_take_catalog_guids() {
    let doc = CatalogDocument::from_path(sample_catalog_path()).unwrap();
    let mut catalog = FeatureCatalog::new();
    catalog.import_catalog_values(&doc, &writing_systems());

    assert_eq!(catalog.structure_type("tInfl").unwrap().id, TypeId::from_uuid(guid(1)));
    assert_eq!(catalog.feature("fAgr").unwrap().id, FeatureId::from_uuid(guid(3)));
    assert_eq!(catalog.symbolic_value("vFem").unwrap().id, SymbolId::from_uuid(guid(9)));
}

#[test]
fn nested_types_and_complex_features() {
    let doc = CatalogDocument::from_path(sample_catalog_path()).unwrap();
    let mut catalog = FeatureCatalog::new();
    catalog.import_catalog_values(&doc, &writing_systems());

    let infl = catalog.structure_type("tInfl").unwrap().id;
    let agr_type = catalog.structure_type("tAgr").unwrap();
    assert_eq!(agr_type.parent, Some(infl));

    let agr = catalog.feature("fAgr").unwrap();
    assert!(agr.is_complex());
    assert_eq!(agr.nested_type(), Some(agr_type.id));

    let gender = catalog.feature("fGender").unwrap().id;
    let person = catalog.feature("fPerson").unwrap().id;
    assert!(catalog.type_allows(agr_type.id, gender));
    assert!(catalog.type_allows(infl, person));
    assert!(!catalog.type_allows(infl, gender));
    // features of the enclosing type are legal in the scoped one
    assert!(catalog.type_allows(agr_type.id, person));
}

#[test]
fn independent_imports_converge() {
    let doc = CatalogDocument::from_path(sample_catalog_path()).unwrap();
    let mut first = FeatureCatalog::new();
    let mut second = FeatureCatalog::new();
    let a = first.import_catalog_values(&doc, &writing_systems());

    // import in reverse item order into a fresh catalog
    let items: Vec<_> = doc.items_of_type("value").collect();
    for item in items.into_iter().rev() {
        second.get_or_create_feature_from_xml(item, &writing_systems());
    }

    for import in &a.imported {
        assert!(second.symbolic_value_by_id(import.value).is_some());
        assert!(second.feature_by_id(import.closed_feature).is_some());
        assert!(second.structure_type_by_id(import.structure_type).is_some());
    }
    assert_eq!(first.feature_count(), second.feature_count());
    assert_eq!(first.symbolic_value_count(), second.symbolic_value_count());
}

#[test]
fn labels_follow_catalog_or_default_to_id() {
    let doc = CatalogDocument::from_path(sample_catalog_path()).unwrap();
    let mut catalog = FeatureCatalog::new();
    catalog.import_catalog_values(&doc, &writing_systems());

    let fem = catalog.symbolic_value("vFem").unwrap();
    assert_eq!(fem.labels.name.get("fr"), Some("féminin"));
    assert_eq!(fem.labels.abbreviation.get("en"), Some("f"));

    let prs = catalog.symbolic_value("vPrs").unwrap();
    assert_eq!(prs.labels.abbreviation.get("en"), Some("vPrs"));
    assert_eq!(prs.labels.name.get("fr"), Some("vPrs"));
}

#[test]
fn imported_definitions_render() {
    let mut system = FeatureSystem::new(FeatureSystemConfig::with_writing_systems(["en"]));
    system.import_catalog_file(sample_catalog_path()).unwrap();

    let catalog = system.catalog();
    let agr = catalog.feature("fAgr").unwrap().id;
    let gender = catalog.feature("fGender").unwrap().id;
    let tense = catalog.feature("fTense").unwrap().id;
    let fem = catalog.symbolic_value("vFem").unwrap().id;
    let pst = catalog.symbolic_value("vPst").unwrap().id;

    let mut fs = featsys::FeatureStructure::new();
    fs.complex_value_mut(agr)
        .unwrap()
        .set_closed_value(gender, fem)
        .unwrap();
    fs.set_closed_value(tense, pst).unwrap();

    assert_eq!(
        system.render(&fs, RenderOptions::long()),
        "[agr:[gen:f] tns:pst]"
    );
    assert!(system.validate(&fs).is_empty());
}

#[test]
fn catalog_snapshot_round_trip_keeps_index() {
    let doc = CatalogDocument::from_path(sample_catalog_path()).unwrap();
    let mut catalog = FeatureCatalog::new();
    catalog.import_catalog_values(&doc, &writing_systems());

    let restored = FeatureCatalog::from_json(&catalog.to_json().unwrap()).unwrap();
    assert_eq!(
        restored.feature("fGender").map(|f| f.id),
        catalog.feature("fGender").map(|f| f.id)
    );

    // re-importing into the restored catalog creates nothing new
    let mut restored = restored;
    let summary = restored.import_catalog_values(&doc, &writing_systems());
    assert_eq!(summary.created, 0);
}
