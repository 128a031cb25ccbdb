use chrono::{Datelike, NaiveDate, NaiveTime};

// ── Grouping keys ─────────────────────────────────────────────────────────────

/// `YYYY-MM-DD` key for a calendar day.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM` key for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// The month key of a day key (its first seven characters).
pub fn month_of_day_key(day_key: &str) -> &str {
    day_key.get(..7).unwrap_or(day_key)
}

// ── Timestamps ────────────────────────────────────────────────────────────────

/// Combine a date and a time of day, both taken as UTC, into epoch
/// milliseconds.
pub fn timestamp_ms(date: NaiveDate, time: NaiveTime) -> i64 {
    date.and_time(time).and_utc().timestamp_millis()
}

/// Parse a CloudFront time-of-day column (`HH:MM:SS`, optionally with a
/// fractional second).
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    const FMTS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f"];
    FMTS.iter().find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// Parse a CloudFront date column (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ── Month helpers ─────────────────────────────────────────────────────────────

/// Render a month key as `"<Month> <Year>"`, e.g. `"2022-01"` → `"January 2022"`.
///
/// Keys that are not a valid `YYYY-MM` are returned unchanged.
pub fn pretty_month(id: &str) -> String {
    match NaiveDate::parse_from_str(&format!("{}-01", id), "%Y-%m-%d") {
        Ok(first) => first.format("%B %Y").to_string(),
        Err(_) => id.to_string(),
    }
}

/// Largest look-back accepted by [`month_prefixes`]: one hundred years.
pub const MAX_PREVIOUS_MONTHS: i64 = 1200;

/// `YYYY-MM-` prefixes for the month of `today` and the `previous` months
/// before it, newest first. `previous` is clamped to
/// `0..=MAX_PREVIOUS_MONTHS`.
pub fn month_prefixes(today: NaiveDate, previous: i64) -> Vec<String> {
    let previous = previous.clamp(0, MAX_PREVIOUS_MONTHS);
    let current = i64::from(today.year()) * 12 + i64::from(today.month0());

    (0..=previous)
        .map(|i| {
            let index = current - i;
            let year = index.div_euclid(12);
            let month = index.rem_euclid(12) + 1;
            format!("{:04}-{:02}-", year, month)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_day_and_month_keys() {
        let d = date("2024-03-07");
        assert_eq!(day_key(d), "2024-03-07");
        assert_eq!(month_key(d), "2024-03");
    }

    #[test]
    fn test_month_of_day_key() {
        assert_eq!(month_of_day_key("2024-03-07"), "2024-03");
        assert_eq!(month_of_day_key("2024"), "2024");
    }

    #[test]
    fn test_timestamp_ms_epoch() {
        let t = parse_time_of_day("00:00:00").unwrap();
        assert_eq!(timestamp_ms(date("1970-01-01"), t), 0);
    }

    #[test]
    fn test_timestamp_ms_keeps_milliseconds() {
        let t = parse_time_of_day("00:10:00.250").unwrap();
        assert_eq!(timestamp_ms(date("1970-01-01"), t), 600_250);
    }

    #[test]
    fn test_parse_time_of_day_rejects_garbage() {
        assert!(parse_time_of_day("not-a-time").is_none());
        assert!(parse_time_of_day("25:00:00").is_none());
        assert!(parse_time_of_day("").is_none());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("#Fields:").is_none());
    }

    #[test]
    fn test_pretty_month() {
        assert_eq!(pretty_month("2022-01"), "January 2022");
        assert_eq!(pretty_month("2024-12"), "December 2024");
    }

    #[test]
    fn test_pretty_month_invalid_id_passthrough() {
        assert_eq!(pretty_month("garbage"), "garbage");
    }

    #[test]
    fn test_month_prefixes_current_only() {
        assert_eq!(month_prefixes(date("2024-03-15"), 0), vec!["2024-03-"]);
    }

    #[test]
    fn test_month_prefixes_crosses_year_boundary() {
        assert_eq!(
            month_prefixes(date("2024-02-29"), 3),
            vec!["2024-02-", "2024-01-", "2023-12-", "2023-11-"]
        );
    }

    #[test]
    fn test_month_prefixes_negative_treated_as_zero() {
        assert_eq!(month_prefixes(date("2024-02-01"), -5), vec!["2024-02-"]);
    }

    #[test]
    fn test_month_prefixes_at_upper_bound() {
        let prefixes = month_prefixes(date("2024-03-01"), MAX_PREVIOUS_MONTHS);
        assert_eq!(prefixes.len(), 1201);
        assert_eq!(prefixes.first().map(String::as_str), Some("2024-03-"));
        assert_eq!(prefixes.last().map(String::as_str), Some("1924-03-"));
    }

    #[test]
    fn test_month_prefixes_huge_count_is_clamped() {
        let prefixes = month_prefixes(date("2024-03-01"), i64::MAX);
        assert_eq!(prefixes.len(), 1201);
    }
}
