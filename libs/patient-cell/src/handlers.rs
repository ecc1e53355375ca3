use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::services::patient::PatientService;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub email: String,
}

#[axum::debug_handler]
pub async fn lookup_patient(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state.db);

    let profile = service
        .find_by_email(&query.email)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    match profile {
        Some(profile) => Ok(Json(json!(profile))),
        None => Err(AppError::NotFound("Patient not found".to_string())),
    }
}
