/// Reference date and contribution window handling.
///
/// Parses the user-facing date arguments: the analysis date that stands in
/// for "now", and the window (e.g. '2025', '2025-03', '2025-W12',
/// '2025-03-15', 'life') that restricts which contributions are analysed.
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Weekday};

use crate::contrib::ContributionRecord;

/// Granularity of a contribution window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Year,
    Month,
    Week,
    Day,
    Life,
}

/// Inclusive UTC date range, the same bounds the contribution fetch uses.
#[derive(Debug, Clone)]
pub struct WindowScope {
    /// Window key as provided by user (e.g., "2025", "2025-03", "2025-W12", "2025-03-15", "life")
    pub key: String,
    pub kind: ScopeKind,
    /// Start date (inclusive, UTC); None for "life"
    pub from: Option<NaiveDate>,
    /// End date (inclusive, UTC); None for "life"
    pub to: Option<NaiveDate>,
}

impl WindowScope {
    /// Parse a window string into a WindowScope
    ///
    /// Supported formats:
    /// - "2025" → entire year 2025
    /// - "2025-03" → March 2025
    /// - "2025-W12" → ISO week 12 of 2025
    /// - "2025-03-15" → specific day
    /// - "life" → no restriction
    pub fn parse(window: &str) -> Result<Self> {
        let window = window.trim();

        if window == "life" {
            return Ok(WindowScope {
                key: "life".to_string(),
                kind: ScopeKind::Life,
                from: None,
                to: None,
            });
        }

        // Try year: "YYYY"
        if let Ok(year) = window.parse::<i32>() {
            if (2001..=2099).contains(&year) {
                let from = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| anyhow!("Invalid year: {}", year))?;
                let to = NaiveDate::from_ymd_opt(year, 12, 31)
                    .ok_or_else(|| anyhow!("Invalid year: {}", year))?;
                return Ok(Self::bounded(window, ScopeKind::Year, from, to));
            }
        }

        // Try month: "YYYY-MM"
        if let Some((year_str, month_str)) = window.split_once('-') {
            if let (Ok(year), Ok(month)) = (year_str.parse::<i32>(), month_str.parse::<u32>()) {
                if (2001..=2099).contains(&year) && (1..=12).contains(&month) {
                    let from = NaiveDate::from_ymd_opt(year, month, 1)
                        .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))?;
                    let next_month = if month == 12 {
                        NaiveDate::from_ymd_opt(year + 1, 1, 1)
                    } else {
                        NaiveDate::from_ymd_opt(year, month + 1, 1)
                    };
                    let to = next_month
                        .and_then(|d| d.pred_opt())
                        .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))?;
                    return Ok(Self::bounded(window, ScopeKind::Month, from, to));
                }
            }
        }

        // Try week: "YYYY-WXX"
        if let Some(pos) = window.find("-W") {
            let year_str = &window[..pos];
            let week_str = &window[pos + 2..];

            if let (Ok(year), Ok(week)) = (year_str.parse::<i32>(), week_str.parse::<u32>()) {
                if let Some(from) = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon) {
                    let to = crate::period::week_end(from);
                    return Ok(Self::bounded(window, ScopeKind::Week, from, to));
                }
                return Err(anyhow!("Invalid week for year: {}-W{:02}", year, week));
            }
        }

        // Try day: "YYYY-MM-DD"
        if let Ok(date) = NaiveDate::parse_from_str(window, "%Y-%m-%d") {
            return Ok(Self::bounded(window, ScopeKind::Day, date, date));
        }

        Err(anyhow!(
            "Invalid window format: '{}'. Expected: '2025', '2025-03', '2025-W12', '2025-03-15', or 'life'",
            window
        ))
    }

    fn bounded(key: &str, kind: ScopeKind, from: NaiveDate, to: NaiveDate) -> Self {
        WindowScope {
            key: key.to_string(),
            kind,
            from: Some(from),
            to: Some(to),
        }
    }

    /// Whether the record's UTC date falls inside the window.
    ///
    /// Records with unparseable timestamps are kept so the aggregator can
    /// report them.
    pub fn contains(&self, record: &ContributionRecord) -> bool {
        let Ok(instant) = record.instant() else {
            return true;
        };
        let date = instant.date_naive();
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    pub fn filter_records(&self, records: &[ContributionRecord]) -> Vec<ContributionRecord> {
        records
            .iter()
            .filter(|r| self.contains(r))
            .cloned()
            .collect()
    }
}

/// Resolve the analysis date argument into the reference instant.
///
/// - `None` or "today" → `now`
/// - the date of `now` → `now`, so today's numbers stay live
/// - any other "YYYY-MM-DD" → 23:59:59 local time on that day, so past
///   days are shown complete
pub fn resolve_reference<Tz: TimeZone>(
    arg: Option<&str>,
    now: DateTime<Tz>,
) -> Result<DateTime<Tz>> {
    let arg = match arg.map(str::trim) {
        None | Some("") => return Ok(now),
        Some(s) if s.eq_ignore_ascii_case("today") => return Ok(now),
        Some(s) => s,
    };

    let date = NaiveDate::parse_from_str(arg, "%Y-%m-%d").map_err(|_| {
        anyhow!(
            "Invalid reference date: '{}'. Expected 'YYYY-MM-DD' or 'today'",
            arg
        )
    })?;

    let today = now.naive_local().date();
    if date == today {
        return Ok(now);
    }

    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow!("Invalid reference date: '{}'", arg))?;

    now.timezone()
        .from_local_datetime(&end_of_day)
        .earliest()
        .ok_or_else(|| {
            anyhow!(
                "Reference date {} has no 23:59:59 in the selected time zone",
                date.format("%Y-%m-%d")
            )
        })
}
