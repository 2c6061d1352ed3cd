use serde::{Deserialize, Serialize};

use super::aggregate::CategorySums;
use super::catalog::Category;

/// The four values written back to a scored feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: f64,
    pub hazard: f64,
    pub structural: f64,
    pub social: f64,
}

impl RiskAssessment {
    pub fn from_sums(sums: &CategorySums) -> Self {
        Self {
            risk: combine(sums),
            hazard: sums.hazard,
            structural: sums.structural_vulnerability,
            social: sums.social_vulnerability,
        }
    }
}

/// Composite risk: the product of the three category sums. A category with
/// no members sums to zero and zeroes the product.
pub fn combine(sums: &CategorySums) -> f64 {
    Category::ordered()
        .into_iter()
        .map(|category| sums.get(category))
        .product()
}
