use sqlx::Row;
use tracing::{info, warn};

use shared_config::{AppConfig, OnMissingPatient};
use shared_database::Database;
use shared_models::PatientRecord;
use shared_utils::dates::normalize_date;
use shared_utils::times::{normalize_slot_time, to_24_hour};
use triage_cell::services::profile::ProfileService;

use crate::models::{Appointment, ReservationError, ReserveRequest};

/// Transactionally reserves an appointment slot.
///
/// All checks and the insert run inside one transaction; every early abort
/// rolls back explicitly, and any unexpected failure rolls back on drop.
/// The unique index on (doctor_id, appointment_date, appointment_time,
/// status) backstops the check-then-insert race: a duplicate-key violation
/// surfaces as the same "slot already booked" outcome.
pub struct ReservationService {
    db: Database,
    config: AppConfig,
    policy: OnMissingPatient,
}

impl ReservationService {
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        Self {
            db: db.clone(),
            config: config.clone(),
            policy: config.on_missing_patient,
        }
    }

    pub fn with_policy(mut self, policy: OnMissingPatient) -> Self {
        self.policy = policy;
        self
    }

    /// Reserve `(doctor, date, time)` for the patient behind `email`.
    ///
    /// Ordered checks, each a potential abort:
    ///   1. slot already actively booked for the doctor,
    ///   2. patient missing (abort or auto-create, per policy),
    ///   3. patient already actively booked at that date/time with any doctor,
    ///   4. insert and commit.
    pub async fn reserve(&self, request: &ReserveRequest) -> Result<Appointment, ReservationError> {
        // Accept 12-hour display times ("2:30 PM") as well as the stored
        // 24-hour forms, then pin to HH:MM:SS.
        let upper = request.time.to_uppercase();
        let base = if upper.contains("AM") || upper.contains("PM") {
            to_24_hour(&request.time).map_err(|e| ReservationError::InvalidTime(e.0))?
        } else {
            request.time.clone()
        };
        let time =
            normalize_slot_time(&base).map_err(|e| ReservationError::InvalidTime(e.0))?;

        let mut tx = self.db.pool().begin().await?;

        let slot_taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE doctor_id = ? AND appointment_date = ? AND appointment_time = ? AND status = 1",
        )
        .bind(request.doctor_id)
        .bind(request.date)
        .bind(&time)
        .fetch_one(&mut *tx)
        .await?;

        if slot_taken > 0 {
            tx.rollback().await?;
            return Err(ReservationError::SlotAlreadyBooked);
        }

        let existing: Option<i64> = sqlx::query(
            "SELECT patient_id FROM patients WHERE email = ?",
        )
        .bind(&request.patient_email)
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| row.try_get("patient_id"))
        .transpose()?;

        let patient_id = match existing {
            Some(id) => id,
            None => match self.policy {
                OnMissingPatient::Abort => {
                    tx.rollback().await?;
                    return Err(ReservationError::PatientNotFound);
                }
                OnMissingPatient::AutoCreate => {
                    let profiles = ProfileService::new(&self.config)
                        .map_err(|e| ReservationError::ExternalService(e.to_string()))?;
                    let profile = profiles.synthesize_profile(&request.patient_email).await;
                    info!(
                        "Auto-creating patient for reservation, email {}",
                        request.patient_email
                    );
                    insert_patient(&mut tx, &profile).await?
                }
            },
        };

        let patient_busy: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE patient_id = ? AND appointment_date = ? AND appointment_time = ? AND status = 1",
        )
        .bind(patient_id)
        .bind(request.date)
        .bind(&time)
        .fetch_one(&mut *tx)
        .await?;

        if patient_busy > 0 {
            tx.rollback().await?;
            return Err(ReservationError::PatientAlreadyBooked);
        }

        let inserted = sqlx::query(
            "INSERT INTO appointments \
             (patient_id, doctor_id, appointment_date, appointment_time, status) \
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(patient_id)
        .bind(request.doctor_id)
        .bind(request.date)
        .bind(&time)
        .execute(&mut *tx)
        .await;

        let inserted = match inserted {
            Ok(result) => result,
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                // Lost the check-then-insert race; the index caught it.
                warn!(
                    "Unique index rejected racing reservation for doctor {} at {} {}",
                    request.doctor_id, request.date, time
                );
                tx.rollback().await?;
                return Err(ReservationError::SlotAlreadyBooked);
            }
            Err(e) => return Err(e.into()),
        };

        let appointment_id = inserted.last_insert_id() as i64;
        tx.commit().await?;

        info!(
            "Reserved appointment {} for patient {} with doctor {} on {} at {}",
            appointment_id, patient_id, request.doctor_id, request.date, time
        );

        Ok(Appointment {
            appointment_id,
            patient_id,
            doctor_id: request.doctor_id,
            appointment_date: request.date,
            appointment_time: time,
            status: 1,
        })
    }
}

/// Insert a synthesized patient inside the reservation transaction,
/// applying the same fallbacks the profile generator guarantees.
async fn insert_patient(
    tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
    profile: &PatientRecord,
) -> Result<i64, ReservationError> {
    let full_name = if profile.full_name.is_empty() {
        "Guest User"
    } else {
        profile.full_name.as_str()
    };
    let gender = if profile.gender.is_empty() {
        "Other"
    } else {
        profile.gender.as_str()
    };
    let phone = if profile.phone.is_empty() {
        "0000000000"
    } else {
        profile.phone.as_str()
    };
    let dob = if profile.dob.is_empty() {
        "1990-01-01".to_string()
    } else {
        normalize_date(&profile.dob)
    };

    let result = sqlx::query(
        "INSERT INTO patients (full_name, age, gender, email, phone, address, DOB) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(full_name)
    .bind(profile.age.unwrap_or(30))
    .bind(gender)
    .bind(&profile.email)
    .bind(phone)
    .bind(&profile.address)
    .bind(dob)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_id() as i64)
}
