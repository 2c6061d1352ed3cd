use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use super::aggregate::CategoryWeightTotals;
use super::standard;

/// Risk dimension an attribute contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hazard,
    StructuralVulnerability,
    SocialVulnerability,
}

impl Category {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::Hazard,
            Self::StructuralVulnerability,
            Self::SocialVulnerability,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hazard => "Hazard",
            Self::StructuralVulnerability => "Structural vulnerability",
            Self::SocialVulnerability => "Social vulnerability",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Hazard => 0,
            Self::StructuralVulnerability => 1,
            Self::SocialVulnerability => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-open interval `[min, max)` mapped to a sub-score. Missing or `null`
/// bounds in JSON stand for an unbounded side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeRule {
    #[serde(default = "unbounded_below", deserialize_with = "lower_bound")]
    pub min: f64,
    #[serde(default = "unbounded_above", deserialize_with = "upper_bound")]
    pub max: f64,
    pub value: f64,
}

impl RangeRule {
    pub const fn new(min: f64, max: f64, value: f64) -> Self {
        Self { min, max, value }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value < self.max
    }
}

fn unbounded_below() -> f64 {
    f64::NEG_INFINITY
}

fn unbounded_above() -> f64 {
    f64::INFINITY
}

fn lower_bound<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
}

fn upper_bound<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

/// Evaluation strategy for one attribute, carrying only the parameters that
/// strategy needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RuleMode {
    /// Min-max normalization against bounds observed in the layer.
    RangeNormalized,
    /// First interval containing the value wins.
    RangeClassified { rules: Vec<RangeRule> },
    /// Exact match on the value's text form.
    CategoricalLookup { matches: BTreeMap<String, f64> },
}

impl RuleMode {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RangeNormalized => "range_normalized",
            Self::RangeClassified { .. } => "range_classified",
            Self::CategoricalLookup { .. } => "categorical_lookup",
        }
    }
}

/// Scoring rule for a single attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub attribute: String,
    pub category: Category,
    pub weight: f64,
    #[serde(default)]
    pub default_value: f64,
    #[serde(flatten)]
    pub mode: RuleMode,
}

impl RuleEntry {
    pub fn normalized(
        attribute: impl Into<String>,
        category: Category,
        weight: f64,
        default_value: f64,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            category,
            weight,
            default_value,
            mode: RuleMode::RangeNormalized,
        }
    }

    pub fn classified(
        attribute: impl Into<String>,
        category: Category,
        weight: f64,
        default_value: f64,
        rules: Vec<RangeRule>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            category,
            weight,
            default_value,
            mode: RuleMode::RangeClassified { rules },
        }
    }

    pub fn lookup<I, K>(
        attribute: impl Into<String>,
        category: Category,
        weight: f64,
        default_value: f64,
        matches: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            attribute: attribute.into(),
            category,
            weight,
            default_value,
            mode: RuleMode::CategoricalLookup {
                matches: matches
                    .into_iter()
                    .map(|(key, value)| (key.into(), value))
                    .collect(),
            },
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self.mode, RuleMode::RangeNormalized)
    }
}

/// Ordered, validated set of rules keyed by attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogDocument", into = "CatalogDocument")]
pub struct RuleCatalog {
    entries: Vec<RuleEntry>,
}

#[derive(Serialize, Deserialize)]
struct CatalogDocument {
    rules: Vec<RuleEntry>,
}

impl TryFrom<CatalogDocument> for RuleCatalog {
    type Error = CatalogError;

    fn try_from(document: CatalogDocument) -> Result<Self, Self::Error> {
        Self::new(document.rules)
    }
}

impl From<RuleCatalog> for CatalogDocument {
    fn from(catalog: RuleCatalog) -> Self {
        Self {
            rules: catalog.entries,
        }
    }
}

impl RuleCatalog {
    pub fn new(entries: Vec<RuleEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.attribute.as_str()) {
                return Err(CatalogError::DuplicateAttribute(entry.attribute.clone()));
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(CatalogError::InvalidWeight {
                    attribute: entry.attribute.clone(),
                    weight: entry.weight,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Catalog tuned for the Groningen induced-seismicity building dataset.
    pub fn standard() -> Self {
        Self {
            entries: standard::entries(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, attribute: &str) -> Result<&RuleEntry, CatalogError> {
        self.entries
            .iter()
            .find(|entry| entry.attribute == attribute)
            .ok_or_else(|| CatalogError::UnknownAttribute(attribute.to_string()))
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn normalized_entries(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter().filter(|entry| entry.is_normalized())
    }

    pub fn weight_totals(&self) -> CategoryWeightTotals {
        CategoryWeightTotals::from_entries(&self.entries)
    }
}

impl<'a> IntoIterator for &'a RuleCatalog {
    type Item = &'a RuleEntry;
    type IntoIter = std::slice::Iter<'a, RuleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Configuration errors raised while building or querying a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("attribute `{0}` is configured more than once")]
    DuplicateAttribute(String),
    #[error("attribute `{attribute}` has invalid weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { attribute: String, weight: f64 },
    #[error("no scoring rule configured for attribute `{0}`")]
    UnknownAttribute(String),
    #[error("invalid rule catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read rule catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
