use std::collections::HashMap;
use std::io::Cursor;

use crate::layer::{AttributeValue, CsvLayer};
use crate::scoring::{Category, RangeRule, RuleCatalog, RuleEntry};

/// Three-category catalog from the worked example: two hazard attributes
/// weighted 1 and 3, one structural and one social attribute that always
/// score 1.
pub(super) fn worked_example_catalog() -> RuleCatalog {
    RuleCatalog::new(vec![
        RuleEntry::classified(
            "pga_mean",
            Category::Hazard,
            1.0,
            0.0,
            vec![
                RangeRule::new(f64::NEG_INFINITY, 0.05, 0.3),
                RangeRule::new(0.05, 0.15, 0.6),
                RangeRule::new(0.15, f64::INFINITY, 1.0),
            ],
        ),
        RuleEntry::lookup(
            "soil_class",
            Category::Hazard,
            3.0,
            0.0,
            [("peat", 1.0), ("sand", 0.4)],
        ),
        RuleEntry::classified(
            "height",
            Category::StructuralVulnerability,
            1.0,
            0.0,
            vec![RangeRule::new(f64::NEG_INFINITY, f64::INFINITY, 1.0)],
        ),
        RuleEntry::lookup(
            "usage",
            Category::SocialVulnerability,
            1.0,
            1.0,
            std::iter::empty::<(String, f64)>(),
        ),
    ])
    .expect("worked example catalog is valid")
}

pub(super) fn record(values: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
    values
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Small slice of the Groningen building export with every standard column.
pub(super) const GRONINGEN_SAMPLE: &str = "\
identificatie,bag_available,pga_mean,num_sides,bag_units_count,num_neighbours,height,floors,built_year,usage
0014100010938,true,0.21,4,1,2,6.5,2,1931,residential
0014100010939,true,0.12,7,6,0,9.1,3,2017,office
0014100010940,false,0.02,12,0,8,3.2,1,1850,industrial
0014100010941,true,0.04,5,,4,12.0,0,1998,medical
";

pub(super) fn groningen_layer() -> CsvLayer {
    CsvLayer::from_reader(Cursor::new(GRONINGEN_SAMPLE)).expect("sample layer parses")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
