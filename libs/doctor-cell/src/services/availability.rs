use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::Row;
use tracing::debug;

use shared_database::Database;
use shared_utils::times::truncate_to_minutes;

use crate::models::DoctorError;
use crate::services::doctor::parse_weekly_slots;

pub struct AvailabilityService {
    db: Database,
}

impl AvailabilityService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Compute the open `HH:MM` slots for a doctor on a given date.
    ///
    /// One join/aggregate query fetches the weekly offering and the times
    /// already booked that day; the result is the set difference, sorted
    /// ascending. An absent doctor, an empty offering, or malformed stored
    /// slot JSON all yield an empty list; "no availability" is a normal
    /// answer here, not an error.
    pub async fn available_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<String>, DoctorError> {
        debug!("Computing available slots for doctor {} on {}", doctor_id, date);

        let row = sqlx::query(
            "SELECT CAST(d.available_slots AS CHAR) AS weekly_slots, \
             CAST(GROUP_CONCAT(DISTINCT a.appointment_time) AS CHAR) AS booked_slots \
             FROM doctors d \
             LEFT JOIN appointments a \
               ON d.doctor_id = a.doctor_id \
              AND a.status = 1 \
              AND a.appointment_date = ? \
             WHERE d.doctor_id = ? \
             GROUP BY d.doctor_id",
        )
        .bind(date)
        .bind(doctor_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };

        let weekly = parse_weekly_slots(
            row.try_get::<Option<String>, _>("weekly_slots")?.as_deref(),
        );
        let booked = row.try_get::<Option<String>, _>("booked_slots")?;

        Ok(subtract_booked(weekly, booked.as_deref()))
    }
}

/// Subtract booked times from the weekly offering.
///
/// Booked entries arrive comma-concatenated as `HH:MM:SS` and are truncated
/// (not rounded) to `HH:MM` before comparison. The result is sorted and
/// duplicate-free; zero-padded 24-hour strings sort correctly as text.
pub fn subtract_booked(weekly: Vec<String>, booked: Option<&str>) -> Vec<String> {
    if weekly.is_empty() {
        return Vec::new();
    }

    let booked_times: HashSet<String> = booked
        .unwrap_or_default()
        .split(',')
        .filter_map(truncate_to_minutes)
        .collect();

    let mut open: Vec<String> = weekly
        .into_iter()
        .filter(|slot| !booked_times.contains(slot))
        .collect();

    open.sort();
    open.dedup();
    open
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly() -> Vec<String> {
        vec![
            "10:00".to_string(),
            "09:00".to_string(),
            "14:30".to_string(),
        ]
    }

    #[test]
    fn result_is_sorted_and_subset_of_weekly() {
        let open = subtract_booked(weekly(), None);
        assert_eq!(open, vec!["09:00", "10:00", "14:30"]);
    }

    #[test]
    fn booked_times_are_removed_after_truncation() {
        let open = subtract_booked(weekly(), Some("10:00:00,14:30:59"));
        assert_eq!(open, vec!["09:00"]);
    }

    #[test]
    fn duplicate_weekly_entries_are_collapsed() {
        let open = subtract_booked(
            vec!["09:00".to_string(), "09:00".to_string()],
            None,
        );
        assert_eq!(open, vec!["09:00"]);
    }

    #[test]
    fn unparseable_booked_entries_are_ignored() {
        let open = subtract_booked(weekly(), Some("garbage,10:00:00"));
        assert_eq!(open, vec!["09:00", "14:30"]);
    }

    #[test]
    fn empty_weekly_offering_means_no_availability() {
        assert!(subtract_booked(Vec::new(), Some("10:00:00")).is_empty());
    }

    #[test]
    fn fully_booked_day_yields_empty() {
        let open = subtract_booked(weekly(), Some("09:00:00,10:00:00,14:30:00"));
        assert!(open.is_empty());
    }
}
