use serde::{Deserialize, Serialize};

use super::catalog::{Category, RuleEntry};

/// Sum of declared weights per category, derived once from the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryWeightTotals {
    totals: [f64; 3],
    members: [usize; 3],
}

impl CategoryWeightTotals {
    pub fn from_entries(entries: &[RuleEntry]) -> Self {
        let mut totals = Self::default();
        for entry in entries {
            let slot = entry.category.index();
            totals.totals[slot] += entry.weight;
            totals.members[slot] += 1;
        }
        totals
    }

    pub fn total(&self, category: Category) -> f64 {
        self.totals[category.index()]
    }

    pub fn members(&self, category: Category) -> usize {
        self.members[category.index()]
    }

    /// Fraction of the category total carried by `weight`. A category whose
    /// members all weigh zero gives every member a zero share.
    pub fn share(&self, category: Category, weight: f64) -> f64 {
        let total = self.total(category);
        if total == 0.0 {
            0.0
        } else {
            weight / total
        }
    }
}

/// Per-record weighted sub-scores grouped by category, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreAccumulator {
    contributions: [Vec<f64>; 3],
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scales `sub_score` by the entry's share of its category weight and
    /// records it. Returns the weighted value.
    pub fn add(&mut self, totals: &CategoryWeightTotals, entry: &RuleEntry, sub_score: f64) -> f64 {
        let weighted = totals.share(entry.category, entry.weight) * sub_score;
        self.contributions[entry.category.index()].push(weighted);
        weighted
    }

    pub fn contributions(&self, category: Category) -> &[f64] {
        &self.contributions[category.index()]
    }

    pub fn sum(&self, category: Category) -> f64 {
        self.contributions(category).iter().sum()
    }

    pub fn sums(&self) -> CategorySums {
        CategorySums {
            hazard: self.sum(Category::Hazard),
            structural_vulnerability: self.sum(Category::StructuralVulnerability),
            social_vulnerability: self.sum(Category::SocialVulnerability),
        }
    }
}

/// Weighted sum for each of the three categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySums {
    pub hazard: f64,
    pub structural_vulnerability: f64,
    pub social_vulnerability: f64,
}

impl CategorySums {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Hazard => self.hazard,
            Category::StructuralVulnerability => self.structural_vulnerability,
            Category::SocialVulnerability => self.social_vulnerability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hazard(attribute: &str, weight: f64) -> RuleEntry {
        RuleEntry::normalized(attribute, Category::Hazard, weight, 0.0)
    }

    #[test]
    fn totals_sum_weights_per_category() {
        let entries = vec![
            hazard("a", 1.0),
            hazard("b", 3.0),
            RuleEntry::normalized("c", Category::SocialVulnerability, 2.0, 0.0),
        ];
        let totals = CategoryWeightTotals::from_entries(&entries);
        assert_eq!(totals.total(Category::Hazard), 4.0);
        assert_eq!(totals.total(Category::SocialVulnerability), 2.0);
        assert_eq!(totals.total(Category::StructuralVulnerability), 0.0);
        assert_eq!(totals.members(Category::Hazard), 2);
        assert_eq!(totals.members(Category::StructuralVulnerability), 0);
    }

    #[test]
    fn weighted_sum_uses_share_of_category_total() {
        let entries = vec![hazard("a", 1.0), hazard("b", 3.0)];
        let totals = CategoryWeightTotals::from_entries(&entries);
        let mut accumulator = ScoreAccumulator::new();

        assert_eq!(accumulator.add(&totals, &entries[0], 0.6), 0.25 * 0.6);
        assert_eq!(accumulator.add(&totals, &entries[1], 1.0), 0.75);

        assert_eq!(accumulator.contributions(Category::Hazard), &[0.15, 0.75]);
        assert!((accumulator.sum(Category::Hazard) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn identical_sub_scores_cancel_the_weights() {
        let entries = vec![hazard("a", 0.5), hazard("b", 2.0), hazard("c", 7.5)];
        let totals = CategoryWeightTotals::from_entries(&entries);
        let mut accumulator = ScoreAccumulator::new();
        for entry in &entries {
            accumulator.add(&totals, entry, 0.42);
        }
        assert!((accumulator.sum(Category::Hazard) - 0.42).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_category_contributes_nothing() {
        let entries = vec![hazard("a", 0.0), hazard("b", 0.0)];
        let totals = CategoryWeightTotals::from_entries(&entries);
        let mut accumulator = ScoreAccumulator::new();
        for entry in &entries {
            accumulator.add(&totals, entry, 1.0);
        }
        assert_eq!(accumulator.sum(Category::Hazard), 0.0);
    }

    #[test]
    fn empty_categories_sum_to_zero() {
        let sums = ScoreAccumulator::new().sums();
        for category in Category::ordered() {
            assert_eq!(sums.get(category), 0.0);
        }
    }
}
