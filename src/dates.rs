use chrono::{DateTime, Datelike, Duration, NaiveDate, Weekday};

const DAY_NAMES: [&str; 7] = [
    "PAZARTESİ",
    "SALI",
    "ÇARŞAMBA",
    "PERŞEMBE",
    "CUMA",
    "CUMARTESİ",
    "PAZAR",
];

/// Every date from `start` through `end`, inclusive. Empty when reversed.
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut dates = Vec::with_capacity(inclusive_day_count(start, end) as usize);
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// Inclusive day count; zero or negative when `end` precedes `start`.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// `dd.mm.yyyy`
pub fn format_locale(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn day_name(date: NaiveDate) -> &'static str {
    weekday_name(date.weekday())
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    DAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Parses `YYYY-MM-DD`, falling back to the date part of an RFC 3339 timestamp.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Serde adapter for optional dates stored either as `null` or `""`.
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_date(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn dates_in_range_is_inclusive() {
        let dates = dates_in_range(d(2025, 2, 27), d(2025, 3, 2));
        assert_eq!(
            dates,
            vec![d(2025, 2, 27), d(2025, 2, 28), d(2025, 3, 1), d(2025, 3, 2)]
        );
        assert!(dates_in_range(d(2025, 3, 2), d(2025, 3, 1)).is_empty());
    }

    #[test]
    fn locale_format_and_day_names() {
        // 2025-03-07 is a Friday
        assert_eq!(format_locale(d(2025, 3, 7)), "07.03.2025");
        assert_eq!(day_name(d(2025, 3, 7)), "CUMA");
        assert_eq!(day_name(d(2025, 3, 9)), "PAZAR");
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2025-01-05"), Some(d(2025, 1, 5)));
        assert_eq!(parse_date("2025-01-05T10:00:00Z"), Some(d(2025, 1, 5)));
        assert_eq!(parse_date("  "), None);
        assert_eq!(parse_date("05/01/2025"), None);
    }
}
