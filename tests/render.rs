//! Gloss rendering of catalog-backed structures.

mod helpers;

use featsys::{FeatureStructure, FeatureStructureDisjunction, FeatureValue, RenderOptions};
use helpers::Agreement;
use pretty_assertions::assert_eq;

#[test]
fn long_form_nests_one_bracket_per_complex_value() {
    let s = Agreement::new();
    let mut fs = s.agreement(&[(s.gender, s.fem), (s.number, s.pl)]);
    fs.set_closed_value(s.number, s.sg).unwrap();

    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::long()),
        "[agr:[gen:f num:pl] num:sg]"
    );
}

#[test]
fn short_form_places_label_per_feature_setting() {
    let mut s = Agreement::new();
    {
        let gender = s.catalog.feature_by_id_mut(s.gender).unwrap();
        gender.display_to_right_of_values = true;
    }
    {
        let number = s.catalog.feature_by_id_mut(s.number).unwrap();
        number.right_gloss_separator = Some(":".to_string());
    }
    let fs = s.flat(&[(s.gender, s.masc), (s.number, s.pl)]);

    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::short()),
        "[m.gen num:pl]"
    );
}

#[test]
fn sorted_orders_by_feature_name() {
    let s = Agreement::new();
    let fs = s.flat(&[(s.number, s.sg), (s.gender, s.neut)]);

    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::long()),
        "[num:sg gen:n]"
    );
    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::long().sorted()),
        "[gen:n num:sg]"
    );
}

#[test]
fn disjunctions_render_after_pairs() {
    let s = Agreement::new();
    let mut fs = s.flat(&[(s.number, s.pl)]);
    fs.add_disjunction(FeatureStructureDisjunction::with_alternatives([
        s.flat(&[(s.gender, s.masc)]),
        s.flat(&[(s.gender, s.fem)]),
    ]));

    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::long()),
        "[num:pl {[gen:m] | [gen:f]}]"
    );
}

#[test]
fn value_variants() {
    let s = Agreement::new();
    let mut fs = FeatureStructure::new();
    fs.add_spec(FeatureValue::negated(s.number, s.sg));
    fs.add_spec(FeatureValue::disjunctive(s.gender, [s.neut, s.fem, s.masc]));

    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::long()),
        "[num:!sg gen:{f,m,n}]"
    );
    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::short()),
        "[num.!sg gen.{f,m,n}]"
    );
}

#[test]
fn open_values_use_best_writing_system() {
    let s = Agreement::new();
    let mut fs = FeatureStructure::new();
    let mut text = featsys::MultiString::with("fr", "poli");
    text.set("en", "polite");
    fs.add_spec(FeatureValue::open(s.number, text));

    assert_eq!(
        fs.render(&s.catalog, &s.config, RenderOptions::long()),
        "[num:polite]"
    );
}
