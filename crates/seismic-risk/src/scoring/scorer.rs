use std::fmt;

use serde::Serialize;

use super::bounds::NormalizationBounds;
use super::catalog::{RuleEntry, RuleMode};
use super::ScoringError;
use crate::layer::AttributeValue;

/// Sub-score for one attribute, plus the reason the configured default was
/// used when no rule applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeScore {
    pub value: f64,
    pub diagnostic: Option<ScoreDiagnostic>,
}

impl AttributeScore {
    fn matched(value: f64) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    fn fallback(value: f64, diagnostic: ScoreDiagnostic) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.diagnostic.is_none()
    }
}

/// Non-fatal condition raised while scoring a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreDiagnostic {
    /// No classification interval contains the value.
    UnmatchedRange { attribute: String, value: f64 },
    /// A range rule received a null or non-numeric cell.
    NonNumericValue { attribute: String },
}

impl ScoreDiagnostic {
    pub fn attribute(&self) -> &str {
        match self {
            Self::UnmatchedRange { attribute, .. } | Self::NonNumericValue { attribute } => {
                attribute
            }
        }
    }
}

impl fmt::Display for ScoreDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedRange { attribute, value } => {
                write!(f, "no rule satisfied for col \"{attribute}\" (value {value})")
            }
            Self::NonNumericValue { attribute } => {
                write!(f, "non-numeric value for col \"{attribute}\"")
            }
        }
    }
}

/// Evaluates `raw` against a single rule entry.
pub fn score_attribute(
    entry: &RuleEntry,
    bounds: &NormalizationBounds,
    raw: &AttributeValue,
) -> Result<AttributeScore, ScoringError> {
    match &entry.mode {
        RuleMode::RangeNormalized => {
            let Some(value) = raw.as_number() else {
                return Ok(non_numeric(entry));
            };
            let range = bounds
                .get(&entry.attribute)
                .ok_or_else(|| ScoringError::MissingBounds(entry.attribute.clone()))?;
            Ok(AttributeScore::matched(range.normalize(value)))
        }
        RuleMode::RangeClassified { rules } => {
            let Some(value) = raw.as_number() else {
                return Ok(non_numeric(entry));
            };
            Ok(rules
                .iter()
                .find(|rule| rule.contains(value))
                .map(|rule| AttributeScore::matched(rule.value))
                .unwrap_or_else(|| {
                    AttributeScore::fallback(
                        entry.default_value,
                        ScoreDiagnostic::UnmatchedRange {
                            attribute: entry.attribute.clone(),
                            value,
                        },
                    )
                }))
        }
        RuleMode::CategoricalLookup { matches } => {
            let value = raw
                .lookup_key()
                .and_then(|key| matches.get(&*key).copied())
                .unwrap_or(entry.default_value);
            Ok(AttributeScore::matched(value))
        }
    }
}

fn non_numeric(entry: &RuleEntry) -> AttributeScore {
    AttributeScore::fallback(
        entry.default_value,
        ScoreDiagnostic::NonNumericValue {
            attribute: entry.attribute.clone(),
        },
    )
}
