//! Seismic-risk scoring engine.
//!
//! A run freezes normalization bounds over the feature population, scores
//! every configured attribute of each eligible feature, folds the weighted
//! sub-scores into per-category sums and multiplies those into the composite
//! risk.

mod aggregate;
mod bounds;
mod catalog;
mod combine;
mod engine;
mod scorer;
pub mod standard;

#[cfg(test)]
mod tests;

pub use aggregate::{CategorySums, CategoryWeightTotals, ScoreAccumulator};
pub use bounds::{aggregate_bounds, BoundsScope, Bounds, NormalizationBounds};
pub use catalog::{CatalogError, Category, RangeRule, RuleCatalog, RuleEntry, RuleMode};
pub use combine::{combine, RiskAssessment};
pub use engine::{RecordAssessment, RiskEngine, RunOptions, RunSummary};
pub use scorer::{score_attribute, AttributeScore, ScoreDiagnostic};

use crate::layer::LayerError;

/// Fatal conditions that abort a scoring run.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("layer is not in editable mode")]
    NotEditable,
    #[error("no column named `{0}` in the layer")]
    MissingAttribute(String),
    #[error("no normalization bounds computed for `{0}`")]
    MissingBounds(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Layer(#[from] LayerError),
}
