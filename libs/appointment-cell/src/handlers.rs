use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{AutoBookOutcome, AutoBookRequest, ReservationError, ReserveRequest};
use crate::services::{reservation::ReservationService, scheduler::SchedulerService};

fn map_reservation_error(e: ReservationError) -> AppError {
    match e {
        ReservationError::SlotAlreadyBooked | ReservationError::PatientAlreadyBooked => {
            AppError::Conflict(e.to_string())
        }
        ReservationError::PatientNotFound => AppError::NotFound(e.to_string()),
        ReservationError::InvalidTime(_) => AppError::ValidationError(e.to_string()),
        ReservationError::ExternalService(msg) => AppError::ExternalService(msg),
        ReservationError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn reserve_slot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReserveRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReservationService::new(&state.db, &state.config);

    let appointment = service
        .reserve(&request)
        .await
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "message": "Appointment slot reserved successfully!",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn auto_book(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AutoBookRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulerService::new(&state.db, &state.config);

    let outcome = service
        .book_first_available(
            &request.specialists,
            &request.patient_email,
            Utc::now().date_naive(),
        )
        .await
        .map_err(map_reservation_error)?;

    let message = match &outcome {
        AutoBookOutcome::Booked {
            doctor_name, date, time, ..
        } => format!(
            "Appointment booked with Dr. {} on {} at {}",
            doctor_name, date, time
        ),
        AutoBookOutcome::NoSlotAvailable => {
            "No available slots found for any recommended specialist in the next 7 days."
                .to_string()
        }
    };

    Ok(Json(json!({
        "message": message,
        "result": outcome
    })))
}
