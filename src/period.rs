/// Calendar keys used for bucketing contributions.
///
/// Every key is derived from an instant already converted into the
/// presentation time zone, so bucket membership always agrees with what the
/// reader sees as "today" or "this month".
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar month of a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// Number of days in the month, 28-31.
    pub fn days_in_month(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }
}

/// Month and day without the year, e.g. every October 25th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthDay {
    /// 1-12
    pub month: u32,
    /// 1-31
    pub day: u32,
}

impl MonthDay {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn label(&self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }
}

/// Local calendar position of a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStamp {
    pub date: NaiveDate,
    /// 0-23
    pub hour: u32,
}

impl LocalStamp {
    /// Reads the wall-clock date and hour of `instant` in its own time zone.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let local = instant.naive_local();
        Self {
            date: local.date(),
            hour: local.hour(),
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// 0-11
    pub fn month0(&self) -> u32 {
        self.date.month0()
    }

    /// 1-31
    pub fn day_of_month(&self) -> u32 {
        self.date.day()
    }

    /// 1-366
    pub fn day_of_year(&self) -> u32 {
        self.date.ordinal()
    }

    /// 0 = Sunday .. 6 = Saturday
    pub fn weekday(&self) -> u32 {
        self.date.weekday().num_days_from_sunday()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.date.year(),
            month: self.date.month(),
        }
    }

    pub fn month_day(&self) -> MonthDay {
        MonthDay::of(self.date)
    }
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sunday closing the week that starts on `monday`.
pub fn week_end(monday: NaiveDate) -> NaiveDate {
    monday + Duration::days(6)
}

/// English name for a 0-based month index, empty when out of range.
pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES.get(month0 as usize).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_local_stamp_follows_offset() {
        // 23:30 UTC on Oct 28 is already Oct 29 in UTC+2
        let utc = Utc.with_ymd_and_hms(2025, 10, 28, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let stamp_utc = LocalStamp::of(&utc);
        let stamp_local = LocalStamp::of(&utc.with_timezone(&plus_two));

        assert_eq!(stamp_utc.date, date(2025, 10, 28));
        assert_eq!(stamp_utc.hour, 23);
        assert_eq!(stamp_local.date, date(2025, 10, 29));
        assert_eq!(stamp_local.hour, 1);
        assert_eq!(stamp_local.weekday(), 3); // Wednesday
    }

    #[test]
    fn test_stamp_components() {
        let instant = Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        let stamp = LocalStamp::of(&instant);
        assert_eq!(stamp.year(), 2024);
        assert_eq!(stamp.month0(), 1);
        assert_eq!(stamp.day_of_month(), 29);
        assert_eq!(stamp.weekday(), 4); // Thursday
        assert_eq!(stamp.year_month(), YearMonth { year: 2024, month: 2 });
        assert_eq!(stamp.month_day().label(), "02-29");
    }

    #[test]
    fn test_leap_day_key_is_distinct() {
        assert_ne!(MonthDay::of(date(2024, 2, 29)), MonthDay::of(date(2023, 2, 28)));
        assert_ne!(MonthDay::of(date(2024, 2, 29)), MonthDay::of(date(2023, 3, 1)));
        assert_eq!(MonthDay::of(date(2020, 2, 29)), MonthDay::of(date(2024, 2, 29)));
    }

    #[test]
    fn test_week_start() {
        // 2025-10-29 is a Wednesday
        assert_eq!(week_start(date(2025, 10, 29)), date(2025, 10, 27));
        // Monday maps to itself
        assert_eq!(week_start(date(2025, 10, 27)), date(2025, 10, 27));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_start(date(2025, 11, 2)), date(2025, 10, 27));
        // Across a year boundary
        assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 30));
        assert_eq!(week_end(date(2024, 12, 30)), date(2025, 1, 5));
    }

    #[test]
    fn test_year_month_order_and_label() {
        let dec = YearMonth { year: 2024, month: 12 };
        let jan = YearMonth { year: 2025, month: 1 };
        assert!(dec < jan);
        assert_eq!(jan.label(), "2025-01");
        assert_eq!(jan.first_day(), Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_days_in_month_and_year() {
        assert_eq!(YearMonth { year: 2024, month: 2 }.days_in_month(), 29);
        assert_eq!(YearMonth { year: 2025, month: 2 }.days_in_month(), 28);
        assert_eq!(YearMonth { year: 2025, month: 4 }.days_in_month(), 30);
        assert_eq!(YearMonth { year: 2025, month: 12 }.days_in_month(), 31);

        let stamp = LocalStamp { date: date(2024, 12, 31), hour: 0 };
        assert_eq!(stamp.day_of_year(), 366);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(0), "January");
        assert_eq!(month_name(9), "October");
        assert_eq!(month_name(12), "");
    }
}
