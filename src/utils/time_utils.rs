use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";

    /// Midnight UTC at the start of `date`, in epoch milliseconds.
    pub fn date_start_ms(date: NaiveDate) -> i64 {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .timestamp_millis()
    }

    /// Last millisecond of `date` (UTC), so a range ending on `date` includes it.
    pub fn date_end_ms(date: NaiveDate) -> i64 {
        Self::date_start_ms(date) + Self::MS_IN_D - 1
    }

    pub fn parse_date(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), Self::STANDARD_TIME_FORMAT).ok()
    }

    pub fn format_date(date: NaiveDate) -> String {
        date.format(Self::STANDARD_TIME_FORMAT).to_string()
    }

    /// Today's local date shifted back by `days`.
    pub fn days_ago(days: i64) -> NaiveDate {
        (Local::now() - chrono::Duration::days(days)).date_naive()
    }
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn local_now_as_timestamp_ms() -> i64 {
    Local::now().timestamp_millis()
}

pub fn how_many_seconds_ago(past_timestamp_ms: i64) -> i64 {
    // How many seconds ago was the event described by `past_timestamp_ms` ?
    (local_now_as_timestamp_ms() - past_timestamp_ms) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_bounds() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let start = TimeUtils::date_start_ms(d);
        assert_eq!(start % TimeUtils::MS_IN_D, 0);
        assert_eq!(TimeUtils::date_end_ms(d) - start, TimeUtils::MS_IN_D - 1);
        assert_eq!(epoch_ms_to_utc(start), "2024-03-01");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            TimeUtils::parse_date(" 2024-02-29 "),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(TimeUtils::parse_date("2023-02-29").is_none());
        assert!(TimeUtils::parse_date("yesterday").is_none());
    }
}
