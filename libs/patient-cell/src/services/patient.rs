use sqlx::Row;
use tracing::debug;

use shared_database::Database;

use crate::models::{PatientError, PatientProfile};

pub struct PatientService {
    db: Database,
}

impl PatientService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Look up a patient by email, aggregating their recorded history into
    /// display strings. `None` means no such patient; that is a normal
    /// outcome, not an error.
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PatientProfile>, PatientError> {
        debug!("Looking up patient by email");

        let row = sqlx::query(
            "SELECT patient_id, full_name, age, gender, email, phone, address, \
             CAST(DOB AS CHAR) AS dob \
             FROM patients WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let patient_id: i64 = row.try_get("patient_id")?;

        let previous_symptoms = self
            .aggregate(
                "SELECT GROUP_CONCAT(CONCAT(symptom_description, ' (', severity, ', ', duration, ')')) \
                 FROM symptoms WHERE patient_id = ?",
                patient_id,
            )
            .await?;
        let previous_medications = self
            .aggregate(
                "SELECT GROUP_CONCAT(CONCAT(medication_name, ' (', dosage, ')')) \
                 FROM medications WHERE patient_id = ?",
                patient_id,
            )
            .await?;
        let previous_allergies = self
            .aggregate(
                "SELECT GROUP_CONCAT(CONCAT(substance, ' (', severity, ')')) \
                 FROM allergies WHERE patient_id = ?",
                patient_id,
            )
            .await?;
        let previous_surgeries = self
            .aggregate(
                "SELECT GROUP_CONCAT(CONCAT(procedure_name, ' at ', hospital_name, ' on ', surgery_date)) \
                 FROM surgeries WHERE patient_id = ?",
                patient_id,
            )
            .await?;

        Ok(Some(PatientProfile {
            patient_id,
            full_name: row.try_get::<Option<String>, _>("full_name")?.unwrap_or_default(),
            age: row.try_get::<Option<i64>, _>("age")?,
            gender: row.try_get::<Option<String>, _>("gender")?.unwrap_or_default(),
            email: row.try_get::<Option<String>, _>("email")?.unwrap_or_default(),
            phone: row.try_get::<Option<String>, _>("phone")?.unwrap_or_default(),
            address: row.try_get::<Option<String>, _>("address")?.unwrap_or_default(),
            dob: row.try_get::<Option<String>, _>("dob")?.unwrap_or_default(),
            previous_symptoms,
            previous_medications,
            previous_allergies,
            previous_surgeries,
        }))
    }

    /// Resolve a patient id from an email.
    pub async fn id_by_email(&self, email: &str) -> Result<Option<i64>, PatientError> {
        let row = sqlx::query("SELECT patient_id FROM patients WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(match row {
            Some(row) => Some(row.try_get("patient_id")?),
            None => None,
        })
    }

    async fn aggregate(&self, sql: &str, patient_id: i64) -> Result<String, PatientError> {
        let row = sqlx::query(sql)
            .bind(patient_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(row.try_get::<Option<String>, _>(0)?.unwrap_or_default())
    }
}
