use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bias::report::{BiasInsights, BiasReport, ComprehensiveRequest};
use crate::bias::{BiasEngine, BiasFinding, RawCandidate};
use crate::errors::AppError;
use crate::state::AppState;

fn default_attribute() -> String {
    "gender".to_string()
}

#[derive(Deserialize)]
pub struct CandidateAnalysisRequest {
    pub candidates: Vec<RawCandidate>,
    #[serde(default = "default_attribute")]
    pub protected_attribute: String,
}

#[derive(Deserialize)]
pub struct TextAnalysisRequest {
    pub text: String,
    #[serde(default)]
    pub metadata: Option<RawCandidate>,
}

#[derive(Deserialize)]
pub struct InsightsRequest {
    pub candidates: Vec<RawCandidate>,
}

/// Response envelope. Identity and timestamp live here so the wrapped result stays deterministic.
#[derive(Serialize)]
pub struct AnalysisResponse<T> {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: T,
}

impl<T> AnalysisResponse<T> {
    fn wrap(result: T) -> Json<Self> {
        Json(Self {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            result,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn check_candidate_count(candidates: &[RawCandidate], max: usize) -> Result<(), AppError> {
    if candidates.len() > max {
        return Err(AppError::Validation(format!(
            "Too many candidates: {} (limit {max})",
            candidates.len()
        )));
    }
    Ok(())
}

fn check_attribute(attribute: &str) -> Result<(), AppError> {
    if attribute.trim().is_empty() {
        return Err(AppError::Validation(
            "protected_attribute must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Runs a CPU-bound analysis off the async executor.
async fn run_blocking<T, F>(label: &'static str, engine: Arc<BiasEngine>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&BiasEngine) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {label}: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/bias/demographic
pub async fn handle_demographic(
    State(state): State<AppState>,
    Json(req): Json<CandidateAnalysisRequest>,
) -> Result<Json<AnalysisResponse<BiasFinding>>, AppError> {
    check_candidate_count(&req.candidates, state.config.max_candidates)?;
    check_attribute(&req.protected_attribute)?;

    let finding = run_blocking("demographic analysis", state.engine.clone(), move |engine| {
        engine.analyze_demographic_bias(&req.candidates, &req.protected_attribute)
    })
    .await?;
    Ok(AnalysisResponse::wrap(finding))
}

/// POST /api/v1/bias/scores
pub async fn handle_scores(
    State(state): State<AppState>,
    Json(req): Json<CandidateAnalysisRequest>,
) -> Result<Json<AnalysisResponse<BiasFinding>>, AppError> {
    check_candidate_count(&req.candidates, state.config.max_candidates)?;
    check_attribute(&req.protected_attribute)?;

    let finding = run_blocking("score analysis", state.engine.clone(), move |engine| {
        engine.analyze_score_bias(&req.candidates, &req.protected_attribute)
    })
    .await?;
    Ok(AnalysisResponse::wrap(finding))
}

/// POST /api/v1/bias/text
pub async fn handle_text(
    State(state): State<AppState>,
    Json(req): Json<TextAnalysisRequest>,
) -> Result<Json<AnalysisResponse<BiasFinding>>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }

    let finding = run_blocking("text analysis", state.engine.clone(), move |engine| {
        engine.analyze_text(&req.text, req.metadata.as_ref())
    })
    .await?;
    Ok(AnalysisResponse::wrap(finding))
}

/// POST /api/v1/bias/comprehensive
pub async fn handle_comprehensive(
    State(state): State<AppState>,
    Json(req): Json<ComprehensiveRequest>,
) -> Result<Json<AnalysisResponse<BiasReport>>, AppError> {
    check_candidate_count(&req.candidates, state.config.max_candidates)?;
    for attribute in &req.protected_attributes {
        check_attribute(attribute)?;
    }

    let report = run_blocking("comprehensive analysis", state.engine.clone(), move |engine| {
        engine.comprehensive(&req)
    })
    .await?;
    Ok(AnalysisResponse::wrap(report))
}

/// POST /api/v1/bias/insights
pub async fn handle_insights(
    State(state): State<AppState>,
    Json(req): Json<InsightsRequest>,
) -> Result<Json<AnalysisResponse<BiasInsights>>, AppError> {
    check_candidate_count(&req.candidates, state.config.max_candidates)?;

    let insights = run_blocking("bias insights", state.engine.clone(), move |engine| {
        engine.insights(&req.candidates)
    })
    .await?;
    Ok(AnalysisResponse::wrap(insights))
}
