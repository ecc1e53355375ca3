use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored patient plus their aggregated medical history, shaped for the
/// returning-patient confirmation screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub patient_id: i64,
    pub full_name: String,
    pub age: Option<i64>,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(rename = "DOB")]
    pub dob: String,
    pub previous_symptoms: String,
    pub previous_medications: String,
    pub previous_allergies: String,
    pub previous_surgeries: String,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for PatientError {
    fn from(e: sqlx::Error) -> Self {
        PatientError::Database(e.to_string())
    }
}
