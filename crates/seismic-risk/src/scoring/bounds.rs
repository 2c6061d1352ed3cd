use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::catalog::RuleCatalog;
use super::ScoringError;
use crate::layer::{FeatureId, FeatureLayer};

/// Observed value range of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn widen(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Min-max normalization. Zero-width bounds yield a non-finite result.
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

/// Bounds for every range-normalized attribute, frozen before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationBounds {
    bounds: BTreeMap<String, Bounds>,
}

impl NormalizationBounds {
    pub fn get(&self, attribute: &str) -> Option<&Bounds> {
        self.bounds.get(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bounds)> {
        self.bounds
            .iter()
            .map(|(attribute, bounds)| (attribute.as_str(), bounds))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Bounds)> for NormalizationBounds {
    fn from_iter<T: IntoIterator<Item = (S, Bounds)>>(iter: T) -> Self {
        Self {
            bounds: iter
                .into_iter()
                .map(|(attribute, bounds)| (attribute.into(), bounds))
                .collect(),
        }
    }
}

/// Which features the range aggregation scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsScope {
    /// Only the features selected for scoring.
    #[default]
    Eligible,
    /// Every feature in the layer.
    All,
}

impl FromStr for BoundsScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "eligible" => Ok(Self::Eligible),
            "all" => Ok(Self::All),
            other => Err(format!("unknown bounds scope '{other}' (expected eligible or all)")),
        }
    }
}

impl fmt::Display for BoundsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eligible => f.write_str("eligible"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Scans `population` once per range-normalized attribute and records the
/// smallest and largest numeric value. Null and non-numeric cells are
/// skipped; an attribute with no numeric value gets no bounds.
pub fn aggregate_bounds<L>(
    catalog: &RuleCatalog,
    layer: &L,
    population: &[FeatureId],
) -> Result<NormalizationBounds, ScoringError>
where
    L: FeatureLayer + ?Sized,
{
    let mut result = NormalizationBounds::default();

    for entry in catalog.normalized_entries() {
        let attribute = entry.attribute.as_str();
        if !layer.has_field(attribute) {
            return Err(ScoringError::MissingAttribute(attribute.to_string()));
        }

        let mut observed: Option<Bounds> = None;
        for id in population {
            let Some(value) = layer.attribute(*id, attribute).and_then(|cell| cell.as_number())
            else {
                continue;
            };
            match observed.as_mut() {
                Some(bounds) => bounds.widen(value),
                None => observed = Some(Bounds::new(value, value)),
            }
        }

        match observed {
            Some(bounds) => {
                info!(
                    attribute,
                    min = bounds.min,
                    max = bounds.max,
                    "attribute range observed"
                );
                result.bounds.insert(attribute.to_string(), bounds);
            }
            None => warn!(attribute, "no numeric values found; attribute has no range"),
        }
    }

    Ok(result)
}
