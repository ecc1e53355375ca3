use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::DoctorError;
use crate::services::{availability::AvailabilityService, doctor::DoctorService};

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state.db);

    let doctors = service
        .list_doctors(query.specialization.as_deref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&state.db);

    let doctor = service.get_doctor(doctor_id).await.map_err(|e| match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        other => AppError::Database(other.to_string()),
    })?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state.db);

    let slots = service
        .available_slots(doctor_id, query.date)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "available_slots": slots
    })))
}
