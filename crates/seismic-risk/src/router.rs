use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::layer::{CsvLayer, FeatureFilter};
use crate::scoring::{BoundsScope, RiskEngine, RuleCatalog, RunOptions, RunSummary};

/// Engine plus the run defaults applied when a request does not override
/// them.
#[derive(Debug, Clone)]
pub struct RiskService {
    engine: RiskEngine,
    defaults: RunOptions,
}

impl RiskService {
    pub fn new(engine: RiskEngine, defaults: RunOptions) -> Self {
        Self { engine, defaults }
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Scores a CSV layer held in memory and returns the edited table.
    pub fn score_csv(&self, request: ScoreRequest) -> Result<ScoreResponse, AppError> {
        let ScoreRequest {
            csv,
            catalog,
            eligibility_field,
            bounds_scope,
        } = request;

        let custom;
        let engine = match catalog {
            Some(catalog) => {
                custom = RiskEngine::new(catalog);
                &custom
            }
            None => &self.engine,
        };

        let mut options = self.defaults.clone();
        if let Some(field) = eligibility_field {
            options.filter = FeatureFilter::eligibility(&field);
        }
        if let Some(scope) = bounds_scope {
            options.bounds_scope = scope;
        }

        let mut layer = CsvLayer::from_reader(Cursor::new(csv.into_bytes()))?;
        let summary = engine.run(&mut layer, &options)?;
        let csv = layer.commit_to_string()?;

        Ok(ScoreResponse { summary, csv })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub csv: String,
    #[serde(default)]
    pub catalog: Option<RuleCatalog>,
    #[serde(default)]
    pub eligibility_field: Option<String>,
    #[serde(default)]
    pub bounds_scope: Option<BoundsScope>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub summary: RunSummary,
    pub csv: String,
}

/// Router builder exposing the scoring endpoints.
pub fn risk_router(service: Arc<RiskService>) -> Router {
    Router::new()
        .route("/api/v1/risk/catalog", get(catalog_handler))
        .route("/api/v1/risk/score", post(score_handler))
        .with_state(service)
}

pub(crate) async fn catalog_handler(State(service): State<Arc<RiskService>>) -> Json<RuleCatalog> {
    Json(service.engine.catalog().clone())
}

pub(crate) async fn score_handler(
    State(service): State<Arc<RiskService>>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    service.score_csv(request).map(Json)
}
