use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A doctor with their recurring weekly offering.
///
/// `available_days` keeps the compact stored notation (`"mon-fri"` or
/// `"mon,wed,fri"`); `available_slots` is the parsed weekly `HH:MM` list,
/// independent of any calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: i64,
    pub full_name: String,
    pub specialization: String,
    pub experience_years: Option<i64>,
    pub hospital_affiliation: String,
    pub available_days: String,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for DoctorError {
    fn from(e: sqlx::Error) -> Self {
        DoctorError::Database(e.to_string())
    }
}
