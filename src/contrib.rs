/// Contribution and user records as delivered by the MediaWiki API.
///
/// Field names on the wire follow `list=usercontribs` and `list=users`; the
/// Rust side uses descriptive names.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::InvalidRecordError;

/// A single edit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContributionRecord {
    #[serde(rename = "userid")]
    pub user_id: u64,
    #[serde(rename = "pageid")]
    pub page_id: u64,
    #[serde(rename = "revid")]
    pub revision_id: u64,
    #[serde(rename = "ns")]
    pub namespace_id: i32,
    pub title: String,
    /// ISO 8601 instant, e.g. `2025-10-29T10:00:00Z`
    pub timestamp: String,
    #[serde(
        rename = "new",
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_page_creation: bool,
    #[serde(rename = "size", default)]
    pub byte_size: i64,
}

impl ContributionRecord {
    /// Parses the record timestamp into a UTC instant.
    pub fn instant(&self) -> Result<DateTime<Utc>, InvalidRecordError> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| InvalidRecordError {
                revision_id: self.revision_id,
                timestamp: self.timestamp.clone(),
                source,
            })
    }
}

/// Account the contributions belong to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(rename = "userid")]
    pub id: u64,
    pub name: String,
    #[serde(rename = "editcount", default)]
    pub total_edit_count: u64,
    /// Missing for accounts created before registration dates were recorded
    #[serde(default)]
    pub registration: Option<String>,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// The API marks page creations with an empty-string `new` key; exported
/// files may carry a boolean instead.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(flag)) => flag,
        Some(_) => true,
    })
}

/// Namespace restriction applied before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceFilter {
    #[default]
    All,
    Only(i32),
}

impl NamespaceFilter {
    pub fn matches(&self, record: &ContributionRecord) -> bool {
        match self {
            NamespaceFilter::All => true,
            NamespaceFilter::Only(ns) => record.namespace_id == *ns,
        }
    }
}

impl FromStr for NamespaceFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(NamespaceFilter::All);
        }
        s.parse::<i32>().map(NamespaceFilter::Only).map_err(|_| {
            anyhow::anyhow!(
                "Invalid namespace filter: '{}'. Expected 'all' or a namespace id",
                s
            )
        })
    }
}

/// Keeps the records accepted by `filter`, preserving input order.
pub fn filter_by_namespace(
    records: &[ContributionRecord],
    filter: NamespaceFilter,
) -> Vec<ContributionRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_api_contribution() {
        let raw = json!({
            "userid": 123,
            "user": "TestUser",
            "pageid": 42,
            "revid": 987654,
            "parentid": 987000,
            "ns": 0,
            "title": "Warsaw",
            "timestamp": "2025-10-29T10:00:00Z",
            "comment": "copyedit",
            "size": 5120,
            "new": "",
            "top": ""
        });

        let record: ContributionRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.user_id, 123);
        assert_eq!(record.page_id, 42);
        assert_eq!(record.revision_id, 987654);
        assert_eq!(record.namespace_id, 0);
        assert_eq!(record.title, "Warsaw");
        assert_eq!(record.byte_size, 5120);
        assert!(record.is_page_creation);
    }

    #[test]
    fn test_missing_new_flag_means_edit() {
        let raw = json!({
            "userid": 1,
            "pageid": 2,
            "revid": 3,
            "ns": 1,
            "title": "Talk:Warsaw",
            "timestamp": "2025-10-29T10:00:00Z",
            "size": 10
        });

        let record: ContributionRecord = serde_json::from_value(raw).unwrap();
        assert!(!record.is_page_creation);

        let exported = serde_json::to_value(&record).unwrap();
        assert!(exported.get("new").is_none());
    }

    #[test]
    fn test_exported_flag_is_read_back() {
        let raw = json!({
            "userid": 1,
            "pageid": 2,
            "revid": 3,
            "ns": 0,
            "title": "Kraków",
            "timestamp": "2025-10-29T10:00:00Z",
            "size": 10,
            "new": true
        });

        let record: ContributionRecord = serde_json::from_value(raw).unwrap();
        assert!(record.is_page_creation);
        let back: ContributionRecord =
            serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_instant_parsing() {
        let record = ContributionRecord {
            user_id: 1,
            page_id: 1,
            revision_id: 77,
            namespace_id: 0,
            title: "A".to_string(),
            timestamp: "2023-01-02T11:00:00Z".to_string(),
            is_page_creation: false,
            byte_size: 0,
        };
        let instant = record.instant().unwrap();
        assert_eq!(instant.to_rfc3339(), "2023-01-02T11:00:00+00:00");

        let broken = ContributionRecord {
            timestamp: "yesterday".to_string(),
            ..record
        };
        let err = broken.instant().unwrap_err();
        assert_eq!(err.revision_id, 77);
        assert_eq!(err.timestamp, "yesterday");
        assert!(err.to_string().contains("revision 77"));
    }

    #[test]
    fn test_deserialize_api_user() {
        let raw = json!({
            "userid": 123,
            "name": "TestUser",
            "editcount": 1000,
            "registration": "2020-01-01T00:00:00Z",
            "groups": ["user", "autoconfirmed", "*", "user"],
            "gender": "unknown"
        });

        let user: UserProfile = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, 123);
        assert_eq!(user.total_edit_count, 1000);
        assert_eq!(user.registration.as_deref(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(user.groups.len(), 3);
        assert!(user.groups.contains("autoconfirmed"));
    }

    #[test]
    fn test_user_without_optional_fields() {
        let raw = json!({
            "userid": 5,
            "name": "OldTimer",
            "editcount": 12,
            "registration": null
        });

        let user: UserProfile = serde_json::from_value(raw).unwrap();
        assert!(user.registration.is_none());
        assert!(user.groups.is_empty());
        assert!(user.gender.is_none());
    }

    #[test]
    fn test_namespace_filter() {
        let make = |ns: i32| ContributionRecord {
            user_id: 1,
            page_id: 1,
            revision_id: ns as u64,
            namespace_id: ns,
            title: format!("Page {}", ns),
            timestamp: "2023-01-01T00:00:00Z".to_string(),
            is_page_creation: false,
            byte_size: 0,
        };
        let records = vec![make(0), make(1), make(0), make(2)];

        assert_eq!(filter_by_namespace(&records, NamespaceFilter::All).len(), 4);
        let main_only = filter_by_namespace(&records, NamespaceFilter::Only(0));
        assert_eq!(main_only.len(), 2);
        assert!(main_only.iter().all(|r| r.namespace_id == 0));

        assert_eq!("all".parse::<NamespaceFilter>().unwrap(), NamespaceFilter::All);
        assert_eq!("14".parse::<NamespaceFilter>().unwrap(), NamespaceFilter::Only(14));
        assert!("talk".parse::<NamespaceFilter>().is_err());
    }
}
