use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use doctor_cell::services::{availability::AvailabilityService, doctor::DoctorService};
use shared_config::AppConfig;
use shared_database::Database;
use shared_utils::days::parse_available_days;

use crate::models::{AutoBookOutcome, ReservationError, ReserveRequest};
use crate::services::reservation::ReservationService;

/// How far ahead the auto-scheduler looks for a free slot.
const BOOKING_HORIZON_DAYS: i64 = 7;

/// Books the first free slot for a recommended specialist.
///
/// Walks specialists in recommendation order, each specialist's doctors in
/// name order, the next seven calendar days, and each day's open slots, and
/// reserves the first one that holds. Losing a slot race just moves on to
/// the next candidate.
pub struct SchedulerService {
    db: Database,
    config: AppConfig,
}

impl SchedulerService {
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        Self {
            db: db.clone(),
            config: config.clone(),
        }
    }

    pub async fn book_first_available(
        &self,
        specialists: &[String],
        patient_email: &str,
        from: NaiveDate,
    ) -> Result<AutoBookOutcome, ReservationError> {
        let doctors_service = DoctorService::new(&self.db);
        let availability = AvailabilityService::new(&self.db);
        let reservations = ReservationService::new(&self.db, &self.config);

        for specialist in specialists {
            let doctors = doctors_service
                .list_doctors(Some(specialist))
                .await
                .map_err(|e| ReservationError::Database(e.to_string()))?;

            if doctors.is_empty() {
                debug!("No doctors found for specialization {}", specialist);
                continue;
            }

            for doctor in doctors {
                let days = parse_available_days(&doctor.available_days);
                if days.is_empty() || doctor.available_slots.is_empty() {
                    continue;
                }

                for date in candidate_dates(from, &days, BOOKING_HORIZON_DAYS) {
                    let open = availability
                        .available_slots(doctor.doctor_id, date)
                        .await
                        .map_err(|e| ReservationError::Database(e.to_string()))?;

                    for slot in open {
                        let request = ReserveRequest {
                            doctor_id: doctor.doctor_id,
                            date,
                            time: slot,
                            patient_email: patient_email.to_string(),
                        };

                        match reservations.reserve(&request).await {
                            Ok(appointment) => {
                                info!(
                                    "Auto-booked appointment {} with Dr. {} on {}",
                                    appointment.appointment_id, doctor.full_name, date
                                );
                                return Ok(AutoBookOutcome::Booked {
                                    doctor_id: doctor.doctor_id,
                                    doctor_name: doctor.full_name,
                                    specialization: doctor.specialization,
                                    date,
                                    time: appointment.appointment_time,
                                });
                            }
                            Err(ReservationError::SlotAlreadyBooked) => continue,
                            Err(e) => return Err(e),
                        }
                    }
                }
            }
        }

        Ok(AutoBookOutcome::NoSlotAvailable)
    }
}

/// Dates within the horizon whose weekday the doctor works.
pub fn candidate_dates(from: NaiveDate, days: &[String], horizon: i64) -> Vec<NaiveDate> {
    (0..horizon)
        .map(|offset| from + Duration::days(offset))
        .filter(|date| days.contains(&date.format("%A").to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_names(days: &[&str]) -> Vec<String> {
        days.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn candidate_dates_respect_working_days() {
        // 2026-08-03 is a Monday.
        let from = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let dates = candidate_dates(from, &day_names(&["Monday", "Wednesday"]), 7);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
                NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            ]
        );
    }

    #[test]
    fn candidate_dates_cover_the_whole_horizon() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let all_days = day_names(&[
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ]);
        assert_eq!(candidate_dates(from, &all_days, 7).len(), 7);
    }

    #[test]
    fn no_working_days_means_no_candidates() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert!(candidate_dates(from, &[], 7).is_empty());
    }
}
