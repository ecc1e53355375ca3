use chrono::NaiveDate;

/// Accepted textual date layouts, tried in order. Day-month-year wins over
/// month-day-year when both could apply, matching the upstream contract.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
];

/// Normalize a date string to `YYYY-MM-DD`.
///
/// Unparseable input is returned unchanged; the caller decides whether a
/// raw value is acceptable. The `datetime.date(Y, M, D)` branch exists
/// because one upstream producer serializes dates as debug representations
/// rather than ISO text.
pub fn normalize_date(input: &str) -> String {
    let input = input.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if input.contains("datetime.date") {
        if let Some(date) = parse_date_repr(input) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    input.to_string()
}

/// Parse the `(year, month, day)` triple out of a `datetime.date(...)` repr.
fn parse_date_repr(input: &str) -> Option<NaiveDate> {
    let inner = input.split('(').nth(1)?.split(')').next()?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<i64>());

    let year = parts.next()?.ok()?;
    let month = parts.next()?.ok()?;
    let day = parts.next()?.ok()?;

    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
}
