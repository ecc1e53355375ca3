use std::env;
use tracing::warn;

/// Policy for a reservation whose patient email has no matching row.
///
/// The UI-driven flow aborts and asks the patient to register; the
/// auto-scheduling flow synthesizes a placeholder profile instead. Both
/// behaviors are deliberate, selected here rather than duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissingPatient {
    Abort,
    AutoCreate,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub oracle_api_key: String,
    pub oracle_base_url: String,
    pub oracle_model: String,
    pub oracle_timeout_secs: u64,
    pub on_missing_patient: OnMissingPatient,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| {
                warn!("DATABASE_URL not set, using empty value");
                String::new()
            }),
            oracle_api_key: env::var("ORACLE_API_KEY").unwrap_or_else(|_| {
                warn!("ORACLE_API_KEY not set, using empty value");
                String::new()
            }),
            oracle_base_url: env::var("ORACLE_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com".to_string()
            }),
            oracle_model: env::var("ORACLE_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            oracle_timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            on_missing_patient: match env::var("AUTO_CREATE_MISSING_PATIENT").as_deref() {
                Ok("1") | Ok("true") => OnMissingPatient::AutoCreate,
                _ => OnMissingPatient::Abort,
            },
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty() && !self.oracle_api_key.is_empty()
    }
}

/// Textual schema description fed to oracle mapping prompts.
///
/// Mirrors the live MySQL schema. The unique index on appointments is the
/// storage-level backstop for the check-then-insert reservation path.
pub fn db_schema_text() -> &'static str {
    "\
TABLE: allergies (allergy_id:int, patient_id:int, substance:varchar, severity:varchar)
TABLE: appointments (appointment_id:int, patient_id:int, doctor_id:int, appointment_date:date, appointment_time:time, status:tinyint, UNIQUE(doctor_id, appointment_date, appointment_time, status))
TABLE: doctors (doctor_id:int, full_name:varchar, specialization:varchar, experience_years:int, email:varchar, phone:varchar, hospital_affiliation:varchar, available_days:varchar, available_slots:json)
TABLE: medical_history (history_id:int, patient_id:int, condition:varchar, diagnosis_date:date, notes:text, is_chronic:tinyint)
TABLE: medications (id:int, patient_id:int, medication_name:varchar, dosage:varchar, start_date:date, end_date:date)
TABLE: patients (patient_id:int, full_name:varchar, age:int, gender:varchar, email:varchar, phone:varchar, address:text, DOB:date)
TABLE: surgeries (surgery_id:int, patient_id:int, procedure_name:varchar, surgery_date:date, hospital_name:varchar)
TABLE: symptoms (symptom_id:int, patient_id:int, symptom_description:text, severity:varchar, duration:varchar, recorded_at:datetime)
"
}
