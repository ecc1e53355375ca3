use sqlx::Row;
use tracing::{debug, warn};

use shared_database::Database;

use crate::models::{Doctor, DoctorError};

pub struct DoctorService {
    db: Database,
}

impl DoctorService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// List doctors, optionally filtered by exact specialization, ordered
    /// by name. A doctor whose stored slot JSON is malformed keeps an empty
    /// slot list rather than failing the listing.
    pub async fn list_doctors(
        &self,
        specialization: Option<&str>,
    ) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors, specialization filter: {:?}", specialization);

        let base = "SELECT doctor_id, full_name, specialization, experience_years, \
                    hospital_affiliation, available_days, \
                    CAST(available_slots AS CHAR) AS available_slots \
                    FROM doctors";

        let rows = match specialization {
            Some(specialization) => {
                let sql = format!("{} WHERE specialization = ? ORDER BY full_name", base);
                sqlx::query(&sql)
                    .bind(specialization)
                    .fetch_all(self.db.pool())
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY full_name", base);
                sqlx::query(&sql).fetch_all(self.db.pool()).await?
            }
        };

        let mut doctors = Vec::with_capacity(rows.len());
        for row in rows {
            let doctor_id: i64 = row.try_get("doctor_id")?;
            let mut slots =
                parse_weekly_slots(row.try_get::<Option<String>, _>("available_slots")?.as_deref());
            if slots.is_empty() {
                warn!("Doctor {} has no usable weekly slots", doctor_id);
            }
            slots.sort();

            doctors.push(Doctor {
                doctor_id,
                full_name: row
                    .try_get::<Option<String>, _>("full_name")?
                    .unwrap_or_default(),
                specialization: row
                    .try_get::<Option<String>, _>("specialization")?
                    .unwrap_or_default(),
                experience_years: row.try_get::<Option<i64>, _>("experience_years")?,
                hospital_affiliation: row
                    .try_get::<Option<String>, _>("hospital_affiliation")?
                    .unwrap_or_default(),
                available_days: row
                    .try_get::<Option<String>, _>("available_days")?
                    .unwrap_or_default(),
                available_slots: slots,
            });
        }

        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        let row = sqlx::query(
            "SELECT doctor_id, full_name, specialization, experience_years, \
             hospital_affiliation, available_days, \
             CAST(available_slots AS CHAR) AS available_slots \
             FROM doctors WHERE doctor_id = ?",
        )
        .bind(doctor_id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(DoctorError::NotFound)?;

        let mut slots =
            parse_weekly_slots(row.try_get::<Option<String>, _>("available_slots")?.as_deref());
        slots.sort();

        Ok(Doctor {
            doctor_id,
            full_name: row
                .try_get::<Option<String>, _>("full_name")?
                .unwrap_or_default(),
            specialization: row
                .try_get::<Option<String>, _>("specialization")?
                .unwrap_or_default(),
            experience_years: row.try_get::<Option<i64>, _>("experience_years")?,
            hospital_affiliation: row
                .try_get::<Option<String>, _>("hospital_affiliation")?
                .unwrap_or_default(),
            available_days: row
                .try_get::<Option<String>, _>("available_days")?
                .unwrap_or_default(),
            available_slots: slots,
        })
    }
}

/// Parse a stored weekly slot JSON array. Malformed or absent input is an
/// empty list; availability degrades, it never raises.
pub fn parse_weekly_slots(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}
