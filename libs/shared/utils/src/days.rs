const DAY_KEYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Expand compact available-day notation into full weekday names.
///
/// `"mon-fri"` is a range (wrapping, so `"fri-mon"` works), `"mon,wed,fri"`
/// a list. Unknown tokens are dropped from lists; a malformed range yields
/// no days rather than an error.
pub fn parse_available_days(days: &str) -> Vec<String> {
    let days = days.trim().to_lowercase();

    if days.contains('-') {
        parse_day_range(&days)
    } else {
        parse_day_list(&days)
    }
}

fn parse_day_range(days: &str) -> Vec<String> {
    let mut bounds = days.split('-').map(str::trim);
    let (Some(start), Some(end)) = (bounds.next(), bounds.next()) else {
        return Vec::new();
    };

    let (Some(start_idx), Some(end_idx)) = (
        DAY_KEYS.iter().position(|k| *k == start),
        DAY_KEYS.iter().position(|k| *k == end),
    ) else {
        return Vec::new();
    };

    let end_idx = if end_idx < start_idx {
        end_idx + 7
    } else {
        end_idx
    };

    (start_idx..=end_idx)
        .map(|i| DAY_NAMES[i % 7].to_string())
        .collect()
}

fn parse_day_list(days: &str) -> Vec<String> {
    days.split(',')
        .map(str::trim)
        .filter_map(|part| {
            DAY_KEYS
                .iter()
                .position(|k| *k == part)
                .map(|i| DAY_NAMES[i].to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_expands_in_order() {
        assert_eq!(
            parse_available_days("mon-fri"),
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        );
    }

    #[test]
    fn range_wraps_across_the_week() {
        assert_eq!(
            parse_available_days("fri-mon"),
            vec!["Friday", "Saturday", "Sunday", "Monday"]
        );
        assert_eq!(parse_available_days("sat-sun"), vec!["Saturday", "Sunday"]);
    }

    #[test]
    fn list_keeps_known_tokens_only() {
        assert_eq!(
            parse_available_days("mon, wed ,fri,xyz"),
            vec!["Monday", "Wednesday", "Friday"]
        );
    }

    #[test]
    fn malformed_range_yields_no_days() {
        assert!(parse_available_days("mon-funday").is_empty());
        assert!(parse_available_days("-").is_empty());
    }

    #[test]
    fn case_and_whitespace_are_normalized() {
        assert_eq!(
            parse_available_days("  MON-TUE "),
            vec!["Monday", "Tuesday"]
        );
    }
}
