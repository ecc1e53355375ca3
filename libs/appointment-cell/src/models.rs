use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored appointment row. `status` is 1 for an active (held) booking;
/// there is no cancelled state, only presence or absence of an active row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub status: i8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReserveRequest {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub patient_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoBookRequest {
    pub specialists: Vec<String>,
    pub patient_email: String,
}

/// Result of the 7-day auto-scheduling walk.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutoBookOutcome {
    Booked {
        doctor_id: i64,
        doctor_name: String,
        specialization: String,
        date: NaiveDate,
        time: String,
    },
    NoSlotAvailable,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("This slot is already booked")]
    SlotAlreadyBooked,

    #[error("Patient not found. Please complete registration first")]
    PatientNotFound,

    #[error("You already have an appointment at this time")]
    PatientAlreadyBooked,

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ReservationError {
    fn from(e: sqlx::Error) -> Self {
        ReservationError::Database(e.to_string())
    }
}
