use std::io::Cursor;

use super::common::*;
use crate::layer::{AttributeValue, CsvLayer, FeatureFilter, FeatureId, FeatureLayer, LayerError};
use crate::scoring::{
    BoundsScope, Bounds, CatalogError, Category, NormalizationBounds, RiskEngine, RuleCatalog,
    RuleEntry, RunOptions, ScoreDiagnostic, ScoringError,
};

#[test]
fn worked_example_combines_weighted_hazard_scores() {
    let engine = RiskEngine::new(worked_example_catalog());
    let values = record(&[
        ("pga_mean", AttributeValue::Number(0.12)),
        ("soil_class", AttributeValue::from("peat")),
        ("height", AttributeValue::Number(7.5)),
        ("usage", AttributeValue::from("residential")),
    ]);

    let outcome = engine
        .assess(&NormalizationBounds::default(), |name| values.get(name))
        .expect("record scores");

    assert_eq!(outcome.contributions.contributions(Category::Hazard).len(), 2);
    assert_close(outcome.contributions.contributions(Category::Hazard)[0], 0.15);
    assert_close(outcome.contributions.contributions(Category::Hazard)[1], 0.75);
    assert_close(outcome.assessment.hazard, 0.9);
    assert_close(outcome.assessment.structural, 1.0);
    assert_close(outcome.assessment.social, 1.0);
    assert_close(outcome.assessment.risk, 0.9);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn assess_reports_missing_record_attributes() {
    let engine = RiskEngine::new(worked_example_catalog());
    let values = record(&[("pga_mean", AttributeValue::Number(0.12))]);

    let error = engine
        .assess(&NormalizationBounds::default(), |name| values.get(name))
        .expect_err("soil_class missing");

    assert!(matches!(error, ScoringError::MissingAttribute(name) if name == "soil_class"));
}

#[test]
fn score_rejects_attributes_outside_the_catalog() {
    let engine = RiskEngine::standard();
    let error = engine
        .score(
            "roof_material",
            &AttributeValue::from("tile"),
            &NormalizationBounds::default(),
        )
        .expect_err("unknown attribute");

    assert!(matches!(
        error,
        ScoringError::Catalog(CatalogError::UnknownAttribute(name)) if name == "roof_material"
    ));
}

#[test]
fn score_uses_frozen_bounds_for_normalized_attributes() {
    let engine = RiskEngine::standard();
    let bounds: NormalizationBounds = [("num_neighbours", Bounds::new(0.0, 4.0))]
        .into_iter()
        .collect();

    let score = engine
        .score("num_neighbours", &AttributeValue::Number(1.0), &bounds)
        .expect("scores");

    assert_eq!(score.value, 0.25);
}

#[test]
fn run_writes_scores_for_eligible_features() {
    let engine = RiskEngine::standard();
    let mut layer = groningen_layer();

    let summary = engine
        .run(&mut layer, &RunOptions::default())
        .expect("run succeeds");

    assert_eq!(summary.features_scored, 3);
    assert_eq!(summary.non_numeric_values, 1);
    assert_eq!(summary.unmatched_rules, 0);
    assert_eq!(
        summary.bounds.get("num_neighbours"),
        Some(&Bounds::new(0.0, 4.0))
    );

    let number = |id: usize, field: &str| {
        layer
            .attribute(FeatureId(id), field)
            .and_then(AttributeValue::as_number)
            .unwrap_or_else(|| panic!("feature {id} has numeric {field}"))
    };

    assert_close(number(0, "risk_hazard"), 1.0);
    assert_close(number(0, "risk_structural"), 0.7);
    assert_close(number(0, "risk_social"), 1.9 / 3.0);
    assert_close(number(0, "risk"), 0.7 * 1.9 / 3.0);

    assert_close(number(1, "risk_hazard"), 0.6);
    assert_close(number(1, "risk_structural"), 2.0 / 7.0);
    assert_close(number(1, "risk_social"), 2.0 / 3.0);
    assert_close(number(1, "risk"), 0.8 / 7.0);

    assert_close(number(3, "risk_structural"), 4.0 / 7.0);
    assert_close(number(3, "risk_social"), 2.5 / 3.0);
    assert_close(number(3, "risk"), 1.0 / 7.0);

    assert_eq!(
        layer.attribute(FeatureId(2), "risk"),
        Some(&AttributeValue::Null)
    );
    assert_close(summary.max_risk.expect("max risk"), 0.7 * 1.9 / 3.0);
}

#[test]
fn run_can_normalize_against_the_whole_layer() {
    let engine = RiskEngine::standard();
    let mut layer = groningen_layer();
    let options = RunOptions {
        bounds_scope: BoundsScope::All,
        ..RunOptions::default()
    };

    let summary = engine.run(&mut layer, &options).expect("run succeeds");

    assert_eq!(
        summary.bounds.get("num_neighbours"),
        Some(&Bounds::new(0.0, 8.0))
    );
    let structural = layer
        .attribute(FeatureId(3), "risk_structural")
        .and_then(AttributeValue::as_number)
        .expect("structural written");
    assert_close(structural, 0.5);
}

#[test]
fn run_without_filter_scores_every_feature() {
    let engine = RiskEngine::standard();
    let mut layer = groningen_layer();
    let options = RunOptions {
        filter: FeatureFilter::All,
        ..RunOptions::default()
    };

    let summary = engine.run(&mut layer, &options).expect("run succeeds");

    assert_eq!(summary.features_scored, 4);
    assert!(layer
        .attribute(FeatureId(2), "risk")
        .and_then(AttributeValue::as_number)
        .is_some());
}

#[test]
fn run_refuses_layers_that_cannot_be_edited() {
    let engine = RiskEngine::standard();
    let mut layer = groningen_layer().read_only();

    let error = engine
        .run(&mut layer, &RunOptions::default())
        .expect_err("read-only layer");

    assert!(matches!(error, ScoringError::NotEditable));
    assert!(!layer.has_field("risk"));
}

#[test]
fn run_aborts_when_a_catalog_column_is_missing() {
    let engine = RiskEngine::standard();
    let mut layer = CsvLayer::from_reader(Cursor::new(
        "bag_available,pga_mean,num_sides,bag_units_count,num_neighbours,height,floors,built_year\n\
true,0.2,4,1,2,6.5,2,1931\n",
    ))
    .expect("layer parses");

    let error = engine
        .run(&mut layer, &RunOptions::default())
        .expect_err("usage column missing");

    assert!(matches!(error, ScoringError::MissingAttribute(name) if name == "usage"));
    assert!(!layer.has_field("risk"));
}

#[test]
fn run_requires_the_eligibility_column() {
    let engine = RiskEngine::standard();
    let mut layer = groningen_layer();
    let options = RunOptions {
        filter: FeatureFilter::eligibility("has_footprint"),
        ..RunOptions::default()
    };

    let error = engine.run(&mut layer, &options).expect_err("filter column missing");

    assert!(matches!(
        error,
        ScoringError::Layer(LayerError::MissingField(name)) if name == "has_footprint"
    ));
}

#[test]
fn category_without_members_zeroes_every_risk() {
    let catalog = RuleCatalog::new(vec![
        RuleEntry::lookup("usage", Category::SocialVulnerability, 1.0, 1.0, [("office", 1.0)]),
        RuleEntry::classified(
            "floors",
            Category::StructuralVulnerability,
            1.0,
            0.0,
            vec![crate::scoring::RangeRule::new(0.0, f64::INFINITY, 1.0)],
        ),
    ])
    .expect("valid catalog");
    let engine = RiskEngine::new(catalog);
    let values = record(&[
        ("usage", AttributeValue::from("office")),
        ("floors", AttributeValue::Number(3.0)),
    ]);

    let outcome = engine
        .assess(&NormalizationBounds::default(), |name| values.get(name))
        .expect("record scores");

    assert_eq!(outcome.assessment.hazard, 0.0);
    assert_eq!(outcome.assessment.structural, 1.0);
    assert_eq!(outcome.assessment.social, 1.0);
    assert_eq!(outcome.assessment.risk, 0.0);
}

#[test]
fn unmatched_values_are_counted_but_do_not_stop_the_run() {
    let catalog = RuleCatalog::new(vec![
        RuleEntry::classified(
            "pga_mean",
            Category::Hazard,
            1.0,
            0.25,
            vec![crate::scoring::RangeRule::new(0.0, 0.5, 1.0)],
        ),
        RuleEntry::lookup("usage", Category::StructuralVulnerability, 1.0, 1.0, [("office", 1.0)]),
        RuleEntry::lookup("kind", Category::SocialVulnerability, 1.0, 1.0, [("house", 1.0)]),
    ])
    .expect("valid catalog");
    let engine = RiskEngine::new(catalog);
    let mut layer = CsvLayer::from_reader(Cursor::new(
        "pga_mean,usage,kind\n0.7,office,house\n0.2,office,house\n",
    ))
    .expect("layer parses");
    let options = RunOptions {
        filter: FeatureFilter::All,
        ..RunOptions::default()
    };

    let summary = engine.run(&mut layer, &options).expect("run succeeds");

    assert_eq!(summary.features_scored, 2);
    assert_eq!(summary.unmatched_rules, 1);
    assert_eq!(summary.warnings(), 1);
    assert_eq!(
        layer.attribute(FeatureId(0), "risk"),
        Some(&AttributeValue::Number(0.25))
    );
    assert_eq!(
        layer.attribute(FeatureId(1), "risk"),
        Some(&AttributeValue::Number(1.0))
    );
    assert_close(summary.mean_risk.expect("mean risk"), 0.625);
}

#[test]
fn assessment_diagnostics_identify_the_attribute() {
    let engine = RiskEngine::standard();
    let layer = groningen_layer();
    let bounds = engine
        .bounds(&layer, &RunOptions::default())
        .expect("bounds computed");

    let outcome = engine
        .assess(&bounds, |name| layer.attribute(FeatureId(3), name))
        .expect("record scores");

    assert_eq!(
        outcome.diagnostics,
        vec![ScoreDiagnostic::NonNumericValue {
            attribute: "bag_units_count".to_string(),
        }]
    );
}

#[test]
fn custom_output_fields_are_respected() {
    let engine = RiskEngine::standard();
    let mut layer = groningen_layer();
    let mut options = RunOptions::default();
    options.output.risk = "seismic_risk".to_string();

    engine.run(&mut layer, &options).expect("run succeeds");

    assert!(layer.has_field("seismic_risk"));
    assert!(!layer.has_field("risk"));
    assert!(layer.has_field("risk_hazard"));
}
