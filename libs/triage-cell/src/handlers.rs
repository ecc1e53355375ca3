use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::SymptomEntry;

use crate::models::{RecommendationResult, SymptomInput};
use crate::services::recommendation::RecommendationService;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub symptoms: Vec<SymptomEntry>,
}

#[axum::debug_handler]
pub async fn recommend_specialists(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Value>, AppError> {
    let service = RecommendationService::new(&state.config)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let result = service
        .recommend_specialists(&SymptomInput::Entries(request.symptoms))
        .await;

    let body = match result {
        RecommendationResult::Recommended {
            specialists,
            rationale,
        } => json!({
            "recommended_specialist": specialists,
            "rationale": rationale,
            "status": "done"
        }),
        RecommendationResult::Unavailable => json!({
            "recommended_specialist": [],
            "rationale": "",
            "status": "unavailable"
        }),
    };

    Ok(Json(body))
}
