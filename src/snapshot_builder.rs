/// Snapshot aggregation.
///
/// Turns a batch of contributions into a `Snapshot` relative to a caller
/// supplied reference instant. Every calendar bucket is taken in the
/// reference instant's time zone. Averages describe the historic population
/// only: the day, month or year containing the reference instant is left out.
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::contrib::{ContributionRecord, UserProfile};
use crate::error::InvalidRecordError;
use crate::namespace;
use crate::period::{self, LocalStamp, MonthDay, YearMonth};
use crate::snapshot::*;
use crate::top_periods::TopPeriods;

// ============================================================================
// Intermediate Aggregation Structs (private, internal to snapshot_builder)
// ============================================================================

/// Calendar buckets for every record (private).
struct TemporalAggregates {
    by_hour: [u32; 24],
    by_weekday: [u32; 7],
    /// Index 0 is the 1st
    by_day_of_month: [u32; 31],
    by_month: [u32; 12],
    /// Day-of-month distribution restricted to the reference month, any year
    current_month_by_day: [u32; 31],
    weekday_hour: [[u32; 24]; 7],
    by_year: BTreeMap<i32, u32>,
    by_year_month: BTreeMap<YearMonth, u32>,
    by_date: BTreeMap<NaiveDate, u32>,
}

impl TemporalAggregates {
    fn new() -> Self {
        Self {
            by_hour: [0; 24],
            by_weekday: [0; 7],
            by_day_of_month: [0; 31],
            by_month: [0; 12],
            current_month_by_day: [0; 31],
            weekday_hour: [[0; 24]; 7],
            by_year: BTreeMap::new(),
            by_year_month: BTreeMap::new(),
            by_date: BTreeMap::new(),
        }
    }

    fn record(&mut self, stamp: &LocalStamp, reference_month0: u32) {
        let hour = stamp.hour as usize;
        let weekday = stamp.weekday() as usize;
        let day_idx = stamp.day_of_month() as usize - 1;

        self.by_hour[hour] += 1;
        self.by_weekday[weekday] += 1;
        self.by_day_of_month[day_idx] += 1;
        self.by_month[stamp.month0() as usize] += 1;
        self.weekday_hour[weekday][hour] += 1;

        if stamp.month0() == reference_month0 {
            self.current_month_by_day[day_idx] += 1;
        }

        *self.by_year.entry(stamp.year()).or_insert(0) += 1;
        *self.by_year_month.entry(stamp.year_month()).or_insert(0) += 1;
        *self.by_date.entry(stamp.date).or_insert(0) += 1;
    }
}

/// Namespace edit and creation counts (private).
struct NamespaceMetrics {
    edits: BTreeMap<i32, u32>,
    created: BTreeMap<i32, u32>,
}

impl NamespaceMetrics {
    fn new() -> Self {
        Self {
            edits: BTreeMap::new(),
            created: BTreeMap::new(),
        }
    }

    fn record(&mut self, record: &ContributionRecord) {
        *self.edits.entry(record.namespace_id).or_insert(0) += 1;
        if record.is_page_creation {
            *self.created.entry(record.namespace_id).or_insert(0) += 1;
        }
    }
}

/// Sample bounds (private).
struct SampleBounds {
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

impl SampleBounds {
    fn new() -> Self {
        Self {
            first: None,
            last: None,
        }
    }

    fn update(&mut self, instant: DateTime<Utc>) {
        self.first = Some(self.first.map_or(instant, |old| old.min(instant)));
        self.last = Some(self.last.map_or(instant, |old| old.max(instant)));
    }
}

/// Reference instant broken into the keys the buckets use (private).
struct ReferenceKeys {
    date: NaiveDate,
    hour: u32,
    year: i32,
    month0: u32,
    day_of_month: u32,
    day_of_year: u32,
    weekday: u32,
    year_month: YearMonth,
    month_day: MonthDay,
}

impl ReferenceKeys {
    fn of<Tz: TimeZone>(reference: &DateTime<Tz>) -> Self {
        let stamp = LocalStamp::of(reference);
        Self {
            date: stamp.date,
            hour: stamp.hour,
            year: stamp.year(),
            month0: stamp.month0(),
            day_of_month: stamp.day_of_month(),
            day_of_year: stamp.day_of_year(),
            weekday: stamp.weekday(),
            year_month: stamp.year_month(),
            month_day: stamp.month_day(),
        }
    }
}

/// Builds a `Snapshot` of `contributions` relative to `reference`.
///
/// Records are converted into the time zone of `reference` before bucketing,
/// so "this day" and the hourly distribution agree with what the reader sees
/// on their clock. The function keeps no state between calls.
///
/// # Arguments
///
/// * `user` - Profile copied into the snapshot
/// * `contributions` - Edits in any order
/// * `reference` - Instant treated as "now"
///
/// # Errors
///
/// Fails on the first record whose timestamp is not a valid RFC 3339 instant.
pub fn compute_snapshot<Tz>(
    user: &UserProfile,
    contributions: &[ContributionRecord],
    reference: &DateTime<Tz>,
) -> Result<Snapshot, InvalidRecordError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tracing::debug!(
        user = %user.name,
        records = contributions.len(),
        reference = %reference.to_rfc3339(),
        "Computing snapshot"
    );

    let tz = reference.timezone();
    let current = ReferenceKeys::of(reference);

    let mut temporal = TemporalAggregates::new();
    let mut namespaces = NamespaceMetrics::new();
    let mut bounds = SampleBounds::new();
    let mut pages: IndexMap<&str, EditedPage> = IndexMap::new();

    for record in contributions {
        let instant = record.instant()?;
        let stamp = LocalStamp::of(&instant.with_timezone(&tz));

        temporal.record(&stamp, current.month0);
        namespaces.record(record);
        bounds.update(instant);

        pages
            .entry(record.title.as_str())
            .or_insert_with(|| EditedPage {
                title: record.title.clone(),
                count: 0,
                ns: record.namespace_id,
            })
            .count += 1;
    }

    let total = contributions.len() as u64;

    // Current period counters
    let this_day_edits = temporal.by_date.get(&current.date).copied().unwrap_or(0);
    let this_month_edits = temporal
        .by_year_month
        .get(&current.year_month)
        .copied()
        .unwrap_or(0);
    let this_year_edits = temporal.by_year.get(&current.year).copied().unwrap_or(0);

    // Historic averages
    let averages = compute_averages(&temporal, &current);
    let projections = build_projections(
        this_day_edits,
        this_month_edits,
        this_year_edits,
        &averages,
        &current,
    );

    let top = TopPeriods::from_daily(&temporal.by_date);

    let snapshot = Snapshot {
        schema_version: SCHEMA_VERSION,
        user: user.clone(),
        reference_instant: reference.to_rfc3339(),
        reference_date: current.date,
        total_fetched: total,
        first_edit_in_sample: bounds.first.map(|dt| dt.to_rfc3339()),
        last_edit_in_sample: bounds.last.map(|dt| dt.to_rfc3339()),
        this_day_edits,
        this_month_edits,
        this_year_edits,
        avg_daily_edits: averages.daily,
        avg_monthly_edits: averages.monthly,
        average_previous_years_edits: averages.previous_years,
        avg_edits_on_current_weekday: averages.current_weekday,
        avg_edits_on_current_date: averages.current_date,
        projections,
        namespace_stats: build_namespace_stats(&namespaces.edits, total),
        ns_breakdown: namespaces.edits,
        created_articles_by_ns: namespaces.created,
        hourly_stats: build_distribution(&temporal.by_hour, 0, |hour| format!("{}:00", hour)),
        day_of_week_stats: build_distribution(&temporal.by_weekday, 0, |day| {
            period::WEEKDAY_NAMES[day as usize].to_string()
        }),
        day_of_month_stats: build_distribution(&temporal.by_day_of_month, 1, |day| {
            day.to_string()
        }),
        monthly_stats: build_distribution(&temporal.by_month, 0, |month0| {
            period::month_name(month0).to_string()
        }),
        current_month_name: period::month_name(current.month0).to_string(),
        current_month_daily_stats: build_distribution(&temporal.current_month_by_day, 1, |day| {
            day.to_string()
        }),
        weekday_hour_stats: build_weekday_hour_stats(&temporal.weekday_hour),
        edited_pages: rank_pages(pages),
        top_days: top.days,
        top_weeks: top.weeks,
        top_months: top.months,
        top_years: top.years,
    };

    tracing::debug!(
        total = snapshot.total_fetched,
        this_day = snapshot.this_day_edits,
        this_month = snapshot.this_month_edits,
        this_year = snapshot.this_year_edits,
        "Snapshot computed"
    );

    Ok(snapshot)
}

// ============================================================================
// Helper Functions for Averages
// ============================================================================

struct Averages {
    daily: f64,
    monthly: f64,
    previous_years: f64,
    current_weekday: f64,
    current_date: f64,
}

fn compute_averages(temporal: &TemporalAggregates, current: &ReferenceKeys) -> Averages {
    let previous_years = mean(
        temporal
            .by_year
            .range(..current.year)
            .map(|(_, &count)| count),
    );

    let monthly = historic_mean(temporal.by_year_month.iter(), &current.year_month);

    let daily = historic_mean(temporal.by_date.iter(), &current.date);

    // Every earlier (or later) day falling on the same weekday
    let current_weekday = historic_mean(
        temporal
            .by_date
            .iter()
            .filter(|(date, _)| date.weekday().num_days_from_sunday() == current.weekday),
        &current.date,
    );

    // The same calendar date in other years; Feb 29 only meets Feb 29
    let current_date = historic_mean(
        temporal
            .by_date
            .iter()
            .filter(|(date, _)| MonthDay::of(**date) == current.month_day),
        &current.date,
    );

    Averages {
        daily,
        monthly,
        previous_years,
        current_weekday,
        current_date,
    }
}

/// Mean of bucket counts, leaving out the bucket keyed by `current`.
fn historic_mean<'a, K>(buckets: impl Iterator<Item = (&'a K, &'a u32)>, current: &K) -> f64
where
    K: PartialEq + 'a,
{
    mean(
        buckets
            .filter(|(key, _)| *key != current)
            .map(|(_, &count)| count),
    )
}

fn mean(counts: impl Iterator<Item = u32>) -> f64 {
    let (sum, n) = counts.fold((0u64, 0u64), |(sum, n), count| (sum + count as u64, n + 1));
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}

/// Extrapolates the current day, month and year from the elapsed part of
/// each, all measured in the reference time zone.
fn build_projections(
    this_day: u32,
    this_month: u32,
    this_year: u32,
    averages: &Averages,
    current: &ReferenceKeys,
) -> Projections {
    let projected_yearly = project(this_year, current.day_of_year.max(1) as f64, 365.0);
    let projected_monthly = project(
        this_month,
        current.day_of_month.max(1) as f64,
        current.year_month.days_in_month() as f64,
    );
    let projected_daily = project(this_day, (current.hour + 1) as f64, 24.0);

    let is_yearly_positive = this_year as f64 > averages.previous_years;
    let is_monthly_positive = this_month as f64 > averages.monthly;
    let is_weekday_positive = this_day as f64 > averages.current_weekday;
    let is_date_positive = this_day as f64 > averages.current_date;

    Projections {
        projected_yearly,
        projected_monthly,
        projected_daily,
        is_yearly_positive,
        is_yearly_projected_under: !is_yearly_positive
            && (projected_yearly as f64) < averages.previous_years,
        is_monthly_positive,
        is_monthly_projected_under: !is_monthly_positive
            && (projected_monthly as f64) < averages.monthly,
        is_weekday_positive,
        is_weekday_projected_under: !is_weekday_positive
            && (projected_daily as f64) < averages.current_weekday,
        is_date_positive,
        is_date_projected_under: !is_date_positive
            && (projected_daily as f64) < averages.current_date,
    }
}

fn project(count: u32, elapsed: f64, length: f64) -> u64 {
    (count as f64 / elapsed * length).round() as u64
}

// ============================================================================
// Helper Functions for Building Sections
// ============================================================================

/// Namespace list sorted by count descending; ties keep ascending id order.
fn build_namespace_stats(edits: &BTreeMap<i32, u32>, total: u64) -> Vec<NamespaceStat> {
    let mut stats: Vec<NamespaceStat> = edits
        .iter()
        .map(|(&id, &count)| NamespaceStat {
            id,
            name: namespace::label(id).into_owned(),
            count,
            percentage: if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            },
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

fn build_distribution<F>(counts: &[u32], first_key: u32, label: F) -> Vec<TimeStat>
where
    F: Fn(u32) -> String,
{
    counts
        .iter()
        .zip(first_key..)
        .map(|(&count, key)| TimeStat {
            key,
            label: label(key),
            count,
        })
        .collect()
}

fn build_weekday_hour_stats(matrix: &[[u32; 24]; 7]) -> Vec<WeekdayHourStat> {
    let mut stats = Vec::with_capacity(7 * 24);
    for (weekday, hours) in (0u32..).zip(matrix.iter()) {
        for (hour, &count) in (0u32..).zip(hours.iter()) {
            stats.push(WeekdayHourStat {
                weekday,
                hour,
                count,
            });
        }
    }
    stats
}

/// Ranks pages by edit count; equal counts keep first-seen order.
fn rank_pages(pages: IndexMap<&str, EditedPage>) -> Vec<EditedPage> {
    let mut ranked: Vec<EditedPage> = pages.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}
