//! Rule set for the Groningen building stock, calibrated against the KNMI
//! peak ground acceleration map and BAG building registry attributes.

use super::catalog::{Category, RangeRule, RuleEntry};

/// Mean peak ground acceleration (g) from the KNMI hazard map.
pub const PGA_MEAN: &str = "pga_mean";
pub const NUM_SIDES: &str = "num_sides";
pub const BAG_UNITS_COUNT: &str = "bag_units_count";
pub const NUM_NEIGHBOURS: &str = "num_neighbours";
pub const HEIGHT: &str = "height";
pub const FLOORS: &str = "floors";
pub const BUILT_YEAR: &str = "built_year";
pub const USAGE: &str = "usage";

const UNBOUNDED_BELOW: f64 = f64::NEG_INFINITY;
const UNBOUNDED_ABOVE: f64 = f64::INFINITY;

pub(crate) fn entries() -> Vec<RuleEntry> {
    vec![
        RuleEntry::classified(
            PGA_MEAN,
            Category::Hazard,
            1.0,
            0.0,
            vec![
                RangeRule::new(UNBOUNDED_BELOW, 0.05, 0.3),
                RangeRule::new(0.05, 0.15, 0.6),
                RangeRule::new(0.15, UNBOUNDED_ABOVE, 1.0),
            ],
        ),
        // Plan irregularity barely matters for shallow induced tremors.
        RuleEntry::classified(
            NUM_SIDES,
            Category::StructuralVulnerability,
            0.0,
            0.5,
            vec![
                RangeRule::new(UNBOUNDED_BELOW, 5.0, 1.0),
                RangeRule::new(5.0, 10.0, 0.5),
                RangeRule::new(10.0, UNBOUNDED_ABOVE, 0.2),
            ],
        ),
        RuleEntry::classified(
            BAG_UNITS_COUNT,
            Category::SocialVulnerability,
            1.0,
            0.5,
            vec![
                RangeRule::new(UNBOUNDED_BELOW, 1.0, 0.0),
                RangeRule::new(1.0, 2.0, 0.1),
                RangeRule::new(2.0, 3.0, 0.2),
                RangeRule::new(3.0, 4.0, 0.3),
                RangeRule::new(4.0, 5.0, 0.4),
                RangeRule::new(5.0, UNBOUNDED_ABOVE, 1.0),
            ],
        ),
        RuleEntry::normalized(NUM_NEIGHBOURS, Category::StructuralVulnerability, 1.0, 0.1),
        RuleEntry::classified(
            HEIGHT,
            Category::StructuralVulnerability,
            0.0,
            0.0,
            vec![RangeRule::new(UNBOUNDED_BELOW, UNBOUNDED_ABOVE, 1.0)],
        ),
        // One storey scores 0.5, anything taller scores 1.
        RuleEntry::classified(
            FLOORS,
            Category::StructuralVulnerability,
            2.0,
            0.0,
            vec![
                RangeRule::new(UNBOUNDED_BELOW, 1.0, 0.5),
                RangeRule::new(1.0, UNBOUNDED_ABOVE, 1.0),
            ],
        ),
        // Post-war boom construction is not penalised as a block.
        RuleEntry::classified(
            BUILT_YEAR,
            Category::StructuralVulnerability,
            4.0,
            0.0,
            vec![
                RangeRule::new(UNBOUNDED_BELOW, 1800.0, 1.0),
                RangeRule::new(1800.0, 1900.0, 0.9),
                RangeRule::new(1900.0, 1920.0, 0.8),
                RangeRule::new(1920.0, 1930.0, 0.7),
                RangeRule::new(1930.0, 1940.0, 0.6),
                RangeRule::new(1940.0, 1950.0, 0.5),
                RangeRule::new(1950.0, 1960.0, 0.5),
                RangeRule::new(1960.0, 1970.0, 0.7),
                RangeRule::new(1970.0, 1980.0, 0.7),
                RangeRule::new(1980.0, 1990.0, 0.6),
                RangeRule::new(1990.0, 2000.0, 0.5),
                RangeRule::new(2000.0, 2010.0, 0.4),
                RangeRule::new(2010.0, 2017.0, 0.3),
                RangeRule::new(2017.0, UNBOUNDED_ABOVE, 0.0),
            ],
        ),
        RuleEntry::lookup(
            USAGE,
            Category::SocialVulnerability,
            2.0,
            0.0,
            [
                ("medical", 1.0),
                ("educational", 1.0),
                ("public", 0.8),
                ("office", 0.5),
                ("commercial", 0.5),
                ("residential", 0.9),
                ("sports", 0.5),
                ("other", 0.2),
                ("industrial", 0.2),
            ],
        ),
    ]
}
