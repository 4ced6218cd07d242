/// Busiest days, weeks, months and years.
///
/// Unlike the averages in the snapshot builder, rankings keep the period that
/// contains the reference instant: a partial current week still competes with
/// complete ones.
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::contrib::ContributionRecord;
use crate::error::InvalidRecordError;
use crate::period::{self, LocalStamp, YearMonth};

/// One ranked period.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopPeriod {
    pub label: String,
    pub count: u32,
    /// First local calendar day of the period
    pub period_start: NaiveDate,
}

/// Rankings for every granularity, each sorted by count descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopPeriods {
    pub days: Vec<TopPeriod>,
    pub weeks: Vec<TopPeriod>,
    pub months: Vec<TopPeriod>,
    pub years: Vec<TopPeriod>,
}

impl TopPeriods {
    /// Ranks periods from per-day totals.
    ///
    /// Iteration over `by_date` is chronological, so the stable sort leaves
    /// equal counts in calendar order.
    pub fn from_daily(by_date: &BTreeMap<NaiveDate, u32>) -> Self {
        let mut by_week: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        let mut by_month: BTreeMap<YearMonth, u32> = BTreeMap::new();
        let mut by_year: BTreeMap<i32, u32> = BTreeMap::new();

        for (&date, &count) in by_date {
            *by_week.entry(period::week_start(date)).or_insert(0) += count;
            let stamp = LocalStamp { date, hour: 0 };
            *by_month.entry(stamp.year_month()).or_insert(0) += count;
            *by_year.entry(stamp.year()).or_insert(0) += count;
        }

        let days = rank(by_date.iter().map(|(&date, &count)| TopPeriod {
            label: date.format("%Y-%m-%d").to_string(),
            count,
            period_start: date,
        }));

        let weeks = rank(by_week.into_iter().map(|(monday, count)| TopPeriod {
            label: format!(
                "{} to {}",
                monday.format("%Y-%m-%d"),
                period::week_end(monday).format("%Y-%m-%d")
            ),
            count,
            period_start: monday,
        }));

        let months = rank(by_month.into_iter().filter_map(|(ym, count)| {
            ym.first_day().map(|first| TopPeriod {
                label: ym.label(),
                count,
                period_start: first,
            })
        }));

        let years = rank(by_year.into_iter().filter_map(|(year, count)| {
            NaiveDate::from_ymd_opt(year, 1, 1).map(|first| TopPeriod {
                label: year.to_string(),
                count,
                period_start: first,
            })
        }));

        TopPeriods {
            days,
            weeks,
            months,
            years,
        }
    }

    /// Keeps at most `limit` entries per granularity.
    pub fn truncate(&mut self, limit: usize) {
        self.days.truncate(limit);
        self.weeks.truncate(limit);
        self.months.truncate(limit);
        self.years.truncate(limit);
    }
}

/// Ranks `contributions` in the time zone `tz`.
pub fn rank_periods<Tz: TimeZone>(
    contributions: &[ContributionRecord],
    tz: &Tz,
) -> Result<TopPeriods, InvalidRecordError> {
    let mut by_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for record in contributions {
        let local: DateTime<Tz> = record.instant()?.with_timezone(tz);
        *by_date.entry(LocalStamp::of(&local).date).or_insert(0) += 1;
    }
    Ok(TopPeriods::from_daily(&by_date))
}

fn rank(periods: impl Iterator<Item = TopPeriod>) -> Vec<TopPeriod> {
    let mut ranked: Vec<TopPeriod> = periods.collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}
