use chrono::NaiveTime;

use crate::validation::ValidationError;

/// Convert a time string to 24-hour `HH:MM`.
///
/// Accepts `"H:MM"`/`"HH:MM"` (re-zero-padded) and 12-hour forms like
/// `"2:30 PM"`. Anything else is a validation error, never a silent default.
pub fn to_24_hour(time: &str) -> Result<String, ValidationError> {
    let trimmed = time.trim();
    let upper = trimmed.to_uppercase();

    if trimmed.contains(':') && !upper.contains("AM") && !upper.contains("PM") {
        let mut parts = trimmed.split(':');
        if let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) {
            if let (Ok(h), Ok(m)) = (hours.trim().parse::<u32>(), minutes.trim().parse::<u32>()) {
                if h <= 23 && m <= 59 {
                    return Ok(format!("{:02}:{:02}", h, m));
                }
            }
        }
        return Err(ValidationError(format!("Invalid time format: {}", time)));
    }

    NaiveTime::parse_from_str(&upper, "%I:%M %p")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| ValidationError(format!("Invalid time format: {}", time)))
}

/// Normalize a slot time to the stored `HH:MM:SS` form.
pub fn normalize_slot_time(time: &str) -> Result<String, ValidationError> {
    let parts: Vec<&str> = time.trim().split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (h.trim(), m.trim(), "0"),
        [h, m, s] => (h.trim(), m.trim(), s.trim()),
        _ => return Err(ValidationError(format!("Invalid time format: {}", time))),
    };

    match (
        hours.parse::<u32>(),
        minutes.parse::<u32>(),
        seconds.parse::<u32>(),
    ) {
        (Ok(h), Ok(m), Ok(s)) if h <= 23 && m <= 59 && s <= 59 => {
            Ok(format!("{:02}:{:02}:{:02}", h, m, s))
        }
        _ => Err(ValidationError(format!("Invalid time format: {}", time))),
    }
}

/// Truncate a stored `HH:MM:SS` value to `HH:MM`. Truncation, not rounding.
pub fn truncate_to_minutes(time: &str) -> Option<String> {
    let mut parts = time.split(':');
    match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => Some(format!("{}:{}", h, m)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_four_hour_input_is_repadded() {
        assert_eq!(to_24_hour("14:30").unwrap(), "14:30");
        assert_eq!(to_24_hour("9:05").unwrap(), "09:05");
    }

    #[test]
    fn twelve_hour_input_is_converted() {
        assert_eq!(to_24_hour("2:30 PM").unwrap(), "14:30");
        assert_eq!(to_24_hour("12:00 am").unwrap(), "00:00");
    }

    #[test]
    fn out_of_range_times_are_rejected() {
        assert!(to_24_hour("25:00").is_err());
        assert!(to_24_hour("12:75").is_err());
        assert!(to_24_hour("noonish").is_err());
    }

    #[test]
    fn slot_times_gain_seconds() {
        assert_eq!(normalize_slot_time("10:30").unwrap(), "10:30:00");
        assert_eq!(normalize_slot_time("10:30:15").unwrap(), "10:30:15");
    }

    #[test]
    fn malformed_slot_times_are_rejected() {
        assert!(normalize_slot_time("10").is_err());
        assert!(normalize_slot_time("10:30:00:00").is_err());
        assert!(normalize_slot_time("ten thirty").is_err());
    }

    #[test]
    fn truncation_drops_seconds_without_rounding() {
        assert_eq!(truncate_to_minutes("10:30:59").unwrap(), "10:30");
        assert_eq!(truncate_to_minutes("10:30").unwrap(), "10:30");
        assert!(truncate_to_minutes("10").is_none());
    }
}
