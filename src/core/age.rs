use chrono::{DateTime, Datelike, NaiveDate};

/// Parse a birth date as sent by the API
///
/// Accepts RFC 3339 timestamps (`1999-04-12T00:00:00.000Z`) and plain
/// `YYYY-MM-DD` dates. Returns `None` for anything else, including the empty string.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Whole years elapsed between `birth` and `today`
///
/// Returns `None` when the birth date lies in the future.
#[inline]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth.year();

    // Birthday not reached yet this year
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }

    u32::try_from(years).ok()
}

/// Age derived from a raw birth-date string, if it can be read
pub fn age_from_birth_date(raw: &str, today: NaiveDate) -> Option<u32> {
    parse_birth_date(raw).and_then(|birth| age_on(birth, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_birth_date("1999-04-12T00:00:00.000Z"), Some(date(1999, 4, 12)));
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_birth_date("2001-12-31"), Some(date(2001, 12, 31)));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_birth_date(""), None);
        assert_eq!(parse_birth_date("N/A"), None);
        assert_eq!(parse_birth_date("12/04/1999"), None);
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birth = date(2000, 6, 15);
        assert_eq!(age_on(birth, date(2024, 6, 14)), Some(23));
        assert_eq!(age_on(birth, date(2024, 6, 15)), Some(24));
        assert_eq!(age_on(birth, date(2024, 12, 1)), Some(24));
    }

    #[test]
    fn test_future_birth_date() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), None);
    }

    #[test]
    fn test_age_from_birth_date() {
        let today = date(2026, 10, 19);
        assert_eq!(age_from_birth_date("2001-10-20T00:00:00.000Z", today), Some(24));
        assert_eq!(age_from_birth_date("not a date", today), None);
    }
}
