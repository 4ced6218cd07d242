use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::contrib::UserProfile;
use crate::top_periods::{TopPeriod, TopPeriods};

#[cfg(test)]
use anyhow::{anyhow, bail};
#[cfg(test)]
use jsonschema::{Draft, JSONSchema};

pub const SCHEMA_VERSION: i32 = 1;

/// Current-period totals extrapolated to the end of the period, compared
/// with the matching historic averages.
///
/// A period is "positive" when its total so far already beats the average,
/// and "projected under" when it does not and the projection falls short too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Projections {
    /// This year's edits per elapsed day, times 365
    pub projected_yearly: u64,
    /// This month's edits per elapsed day, times the days in the month
    pub projected_monthly: u64,
    /// Today's edits per started hour, times 24
    pub projected_daily: u64,
    pub is_yearly_positive: bool,
    pub is_yearly_projected_under: bool,
    pub is_monthly_positive: bool,
    pub is_monthly_projected_under: bool,
    pub is_weekday_positive: bool,
    pub is_weekday_projected_under: bool,
    pub is_date_positive: bool,
    pub is_date_projected_under: bool,
}

/// Complete statistics for one user relative to one reference instant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    pub schema_version: i32,
    pub user: UserProfile,
    /// RFC 3339, in the presentation time zone
    pub reference_instant: String,
    pub reference_date: NaiveDate,
    pub total_fetched: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_edit_in_sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edit_in_sample: Option<String>,

    pub this_day_edits: u32,
    pub this_month_edits: u32,
    pub this_year_edits: u32,

    pub avg_daily_edits: f64,
    pub avg_monthly_edits: f64,
    pub average_previous_years_edits: f64,
    pub avg_edits_on_current_weekday: f64,
    pub avg_edits_on_current_date: f64,

    pub projections: Projections,

    pub namespace_stats: Vec<NamespaceStat>,
    pub ns_breakdown: BTreeMap<i32, u32>,
    pub created_articles_by_ns: BTreeMap<i32, u32>,

    pub hourly_stats: Vec<TimeStat>,
    pub day_of_week_stats: Vec<TimeStat>,
    pub day_of_month_stats: Vec<TimeStat>,
    pub monthly_stats: Vec<TimeStat>,
    pub current_month_name: String,
    pub current_month_daily_stats: Vec<TimeStat>,
    pub weekday_hour_stats: Vec<WeekdayHourStat>,

    pub edited_pages: Vec<EditedPage>,

    pub top_days: Vec<TopPeriod>,
    pub top_weeks: Vec<TopPeriod>,
    pub top_months: Vec<TopPeriod>,
    pub top_years: Vec<TopPeriod>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NamespaceStat {
    pub id: i32,
    pub name: String,
    pub count: u32,
    pub percentage: f64,
}

/// One bucket of a fixed-size distribution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeStat {
    pub key: u32,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WeekdayHourStat {
    /// 0 = Sunday
    pub weekday: u32,
    pub hour: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditedPage {
    pub title: String,
    pub count: u32,
    pub ns: i32,
}

impl Snapshot {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;

        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

        Ok(snapshot)
    }

    pub fn top_periods(&self) -> TopPeriods {
        TopPeriods {
            days: self.top_days.clone(),
            weeks: self.top_weeks.clone(),
            months: self.top_months.clone(),
            years: self.top_years.clone(),
        }
    }

    /// Cuts the page ranking and every period ranking to `limit` entries.
    ///
    /// Distributions and counters are left untouched.
    pub fn truncate_rankings(&mut self, limit: usize) {
        self.edited_pages.truncate(limit);
        self.top_days.truncate(limit);
        self.top_weeks.truncate(limit);
        self.top_months.truncate(limit);
        self.top_years.truncate(limit);
    }

    #[cfg(test)]
    /// Validate snapshot JSON against the JSON schema
    pub fn validate_with_schema(json: &serde_json::Value, schema: &JSONSchema) -> Result<()> {
        match schema.validate(json) {
            Ok(_) => Ok(()),
            Err(errors) => {
                let error_messages: Vec<String> = errors
                    .map(|e| format!("  - {}: {}", e.instance_path, e))
                    .collect();
                bail!("Snapshot validation failed:\n{}", error_messages.join("\n"))
            }
        }
    }

    #[cfg(test)]
    /// Load and compile the JSON schema
    pub fn load_schema(schema_path: &Path) -> Result<JSONSchema> {
        let schema_content = std::fs::read_to_string(schema_path)
            .with_context(|| format!("Failed to read schema file: {}", schema_path.display()))?;

        let schema_json: serde_json::Value =
            serde_json::from_str(&schema_content).with_context(|| {
                format!(
                    "Failed to parse schema JSON from: {}",
                    schema_path.display()
                )
            })?;

        JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map_err(|e| anyhow!("Failed to compile JSON schema: {}", e))
    }
}
