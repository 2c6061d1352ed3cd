//! Feature layer abstraction the scoring engine reads attributes from and
//! writes its results back into.

mod table;

pub use table::CsvLayer;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Column the building export uses to flag rows with BAG data.
pub const DEFAULT_ELIGIBILITY_FIELD: &str = "bag_available";

/// Position of a feature within its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub usize);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute cell. Cells read from a layer keep their source text and are
/// interpreted on access; values written by the engine are numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Wraps a raw text cell without reinterpreting it. Only empty cells
    /// become [`AttributeValue::Null`].
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Null
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Trimmed text of a non-null cell. Blank cells and `NULL` markers have
    /// no content.
    fn content(text: &str) -> Option<&str> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Numeric reading of the cell; text must parse to a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Number(number) => Some(*number),
            Self::Text(text) => Self::content(text)
                .and_then(|content| content.parse::<f64>().ok())
                .filter(|number| number.is_finite()),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(_) => false,
            Self::Text(text) => Self::content(text).is_none(),
        }
    }

    /// Key used for categorical lookups. Text cells use their trimmed source
    /// text, so `01` looks up `"01"`; engine-written numbers use their
    /// shortest display form.
    pub fn lookup_key(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Number(number) => Some(Cow::Owned(number.to_string())),
            Self::Text(text) => Self::content(text).map(Cow::Borrowed),
        }
    }

    pub fn is_truthy(&self) -> bool {
        if let Some(number) = self.as_number() {
            return number != 0.0;
        }
        match self {
            Self::Text(text) => Self::content(text).is_some_and(|content| {
                matches!(
                    content.to_ascii_lowercase().as_str(),
                    "true" | "t" | "yes" | "y"
                )
            }),
            _ => false,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Selection predicate for the features that get scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureFilter {
    All,
    FieldIsTrue(String),
}

impl FeatureFilter {
    /// Builds the filter for an eligibility column; a blank name selects
    /// every feature.
    pub fn eligibility(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            Self::All
        } else {
            Self::FieldIsTrue(field.to_string())
        }
    }
}

impl Default for FeatureFilter {
    fn default() -> Self {
        Self::FieldIsTrue(DEFAULT_ELIGIBILITY_FIELD.to_string())
    }
}

/// Names of the four columns a scoring run writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFields {
    pub risk: String,
    pub hazard: String,
    pub structural: String,
    pub social: String,
}

impl Default for OutputFields {
    fn default() -> Self {
        Self {
            risk: "risk".to_string(),
            hazard: "risk_hazard".to_string(),
            structural: "risk_structural".to_string(),
            social: "risk_social".to_string(),
        }
    }
}

/// Storage seam for the scoring engine, modelled on a GIS vector layer with
/// an explicit edit session.
pub trait FeatureLayer {
    fn field_names(&self) -> Vec<&str>;

    fn has_field(&self, name: &str) -> bool {
        self.field_names().iter().any(|field| *field == name)
    }

    /// Requests an edit session. Returns whether the layer is now editable.
    fn start_editing(&mut self) -> bool;

    fn is_editable(&self) -> bool;

    fn feature_ids(&self, filter: &FeatureFilter) -> Result<Vec<FeatureId>, LayerError>;

    fn attribute(&self, id: FeatureId, field: &str) -> Option<&AttributeValue>;

    fn set_attribute(
        &mut self,
        id: FeatureId,
        field: &str,
        value: AttributeValue,
    ) -> Result<(), LayerError>;
}

/// Error enumeration for feature layer failures.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("failed to read or write layer data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV layer data: {0}")]
    Csv(#[from] csv::Error),
    #[error("layer has no field named `{0}`")]
    MissingField(String),
    #[error("layer declares field `{0}` more than once")]
    DuplicateField(String),
    #[error("layer is not in editable mode")]
    NotEditable,
    #[error("feature {0} does not exist")]
    UnknownFeature(FeatureId),
}
