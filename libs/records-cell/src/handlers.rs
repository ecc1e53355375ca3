use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::PatientRecord;

use crate::models::MappedOperation;
use crate::services::import::ImportService;
use crate::services::mapping::map_patient_record;

#[derive(Debug, Deserialize)]
pub struct MapRequest {
    pub patient_data: PatientRecord,
}

/// Produce the intermediate operation list without touching the store.
#[axum::debug_handler]
pub async fn map_record(
    Json(request): Json<MapRequest>,
) -> Result<Json<Value>, AppError> {
    let operations = map_patient_record(&request.patient_data, Utc::now().naive_utc());
    Ok(Json(json!(operations)))
}

/// Execute a previously mapped operation list.
#[axum::debug_handler]
pub async fn import_operations(
    State(state): State<Arc<AppState>>,
    Json(operations): Json<Vec<MappedOperation>>,
) -> Result<Json<Value>, AppError> {
    let service = ImportService::new(&state.db);

    let report = service
        .import_operations(&operations)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(report)))
}

/// Map and import in one step, the path the completed intake takes.
#[axum::debug_handler]
pub async fn submit_record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MapRequest>,
) -> Result<Json<Value>, AppError> {
    let operations = map_patient_record(&request.patient_data, Utc::now().naive_utc());
    let service = ImportService::new(&state.db);

    let report = service
        .import_operations(&operations)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "report": report,
        "operations": operations
    })))
}
