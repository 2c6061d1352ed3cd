use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::aggregate::{CategoryWeightTotals, ScoreAccumulator};
use super::bounds::{aggregate_bounds, BoundsScope, NormalizationBounds};
use super::catalog::{Category, RuleCatalog};
use super::combine::RiskAssessment;
use super::scorer::{score_attribute, AttributeScore, ScoreDiagnostic};
use super::ScoringError;
use crate::layer::{AttributeValue, FeatureFilter, FeatureId, FeatureLayer, OutputFields};

/// Stateless evaluator that applies a rule catalog to features.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    catalog: RuleCatalog,
    totals: CategoryWeightTotals,
}

/// Knobs for a full scoring run over a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub filter: FeatureFilter,
    pub output: OutputFields,
    pub bounds_scope: BoundsScope,
}

/// Result of scoring one record, with the intermediate contributions kept
/// for audits.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordAssessment {
    pub assessment: RiskAssessment,
    pub contributions: ScoreAccumulator,
    pub diagnostics: Vec<ScoreDiagnostic>,
}

/// Aggregate report for a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub features_scored: usize,
    pub unmatched_rules: usize,
    pub non_numeric_values: usize,
    pub bounds: NormalizationBounds,
    pub max_risk: Option<f64>,
    pub mean_risk: Option<f64>,
    #[serde(skip)]
    risk_total: f64,
}

impl RunSummary {
    fn new(bounds: NormalizationBounds) -> Self {
        Self {
            generated_at: Utc::now(),
            features_scored: 0,
            unmatched_rules: 0,
            non_numeric_values: 0,
            bounds,
            max_risk: None,
            mean_risk: None,
            risk_total: 0.0,
        }
    }

    fn record(&mut self, record: &RecordAssessment) {
        for diagnostic in &record.diagnostics {
            match diagnostic {
                ScoreDiagnostic::UnmatchedRange { .. } => self.unmatched_rules += 1,
                ScoreDiagnostic::NonNumericValue { .. } => self.non_numeric_values += 1,
            }
        }

        let risk = record.assessment.risk;
        self.features_scored += 1;
        self.risk_total += risk;
        self.max_risk = Some(self.max_risk.map_or(risk, |max| max.max(risk)));
        self.mean_risk = Some(self.risk_total / self.features_scored as f64);
    }

    pub fn warnings(&self) -> usize {
        self.unmatched_rules + self.non_numeric_values
    }
}

impl RiskEngine {
    pub fn new(catalog: RuleCatalog) -> Self {
        let totals = catalog.weight_totals();
        for category in Category::ordered() {
            if totals.total(category) == 0.0 {
                warn!(
                    category = category.label(),
                    members = totals.members(category),
                    "category carries no weight; every composite risk will be 0"
                );
            }
        }

        Self { catalog, totals }
    }

    pub fn standard() -> Self {
        Self::new(RuleCatalog::standard())
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn weight_totals(&self) -> &CategoryWeightTotals {
        &self.totals
    }

    /// Scores one raw value for a catalog attribute.
    pub fn score(
        &self,
        attribute: &str,
        raw: &AttributeValue,
        bounds: &NormalizationBounds,
    ) -> Result<AttributeScore, ScoringError> {
        let entry = self.catalog.get(attribute)?;
        score_attribute(entry, bounds, raw)
    }

    /// Scores every catalog attribute of one record. `read` resolves an
    /// attribute name to the record's cell; `None` means the column is
    /// absent.
    pub fn assess<'a, F>(
        &self,
        bounds: &NormalizationBounds,
        read: F,
    ) -> Result<RecordAssessment, ScoringError>
    where
        F: Fn(&str) -> Option<&'a AttributeValue>,
    {
        let mut contributions = ScoreAccumulator::new();
        let mut diagnostics = Vec::new();

        for entry in &self.catalog {
            let raw = read(&entry.attribute)
                .ok_or_else(|| ScoringError::MissingAttribute(entry.attribute.clone()))?;
            let score = score_attribute(entry, bounds, raw)?;
            contributions.add(&self.totals, entry, score.value);
            if let Some(diagnostic) = score.diagnostic {
                diagnostics.push(diagnostic);
            }
        }

        let assessment = RiskAssessment::from_sums(&contributions.sums());
        Ok(RecordAssessment {
            assessment,
            contributions,
            diagnostics,
        })
    }

    /// Bounds over the population selected by `options`.
    pub fn bounds<L>(
        &self,
        layer: &L,
        options: &RunOptions,
    ) -> Result<NormalizationBounds, ScoringError>
    where
        L: FeatureLayer + ?Sized,
    {
        let filter = match options.bounds_scope {
            BoundsScope::Eligible => &options.filter,
            BoundsScope::All => &FeatureFilter::All,
        };
        let population = layer.feature_ids(filter)?;
        aggregate_bounds(&self.catalog, layer, &population)
    }

    /// Scores every eligible feature and writes the results into the layer.
    ///
    /// The layer must accept an edit session. Any fatal error aborts the run;
    /// features processed before the failure keep their written values.
    /// Committing the edits is left to the caller.
    pub fn run<L>(&self, layer: &mut L, options: &RunOptions) -> Result<RunSummary, ScoringError>
    where
        L: FeatureLayer + ?Sized,
    {
        layer.start_editing();
        if !layer.is_editable() {
            return Err(ScoringError::NotEditable);
        }

        if let Some(entry) = self
            .catalog
            .iter()
            .find(|entry| !layer.has_field(&entry.attribute))
        {
            return Err(ScoringError::MissingAttribute(entry.attribute.clone()));
        }

        let bounds = self.bounds(&*layer, options)?;
        let eligible = layer.feature_ids(&options.filter)?;
        let mut summary = RunSummary::new(bounds);

        for id in eligible {
            let record = {
                let reader: &L = layer;
                self.assess(&summary.bounds, |attribute| reader.attribute(id, attribute))?
            };

            for diagnostic in &record.diagnostics {
                warn!(feature = %id, attribute = diagnostic.attribute(), "{diagnostic}");
            }

            write_assessment(layer, id, &options.output, &record.assessment)?;
            summary.record(&record);
        }

        info!(
            scored = summary.features_scored,
            warnings = summary.warnings(),
            max_risk = summary.max_risk,
            "risk scoring complete"
        );

        Ok(summary)
    }
}

fn write_assessment<L>(
    layer: &mut L,
    id: FeatureId,
    fields: &OutputFields,
    assessment: &RiskAssessment,
) -> Result<(), ScoringError>
where
    L: FeatureLayer + ?Sized,
{
    layer.set_attribute(id, &fields.risk, assessment.risk.into())?;
    layer.set_attribute(id, &fields.hazard, assessment.hazard.into())?;
    layer.set_attribute(id, &fields.structural, assessment.structural.into())?;
    layer.set_attribute(id, &fields.social, assessment.social.into())?;
    Ok(())
}
