/// Stored dataset files.
///
/// A dataset is what the fetch step saves per account and language: the user
/// profile plus every contribution fetched for the requested date range,
/// newest first.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::contrib::{ContributionRecord, UserProfile};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Requested fetch range, "YYYY-MM-DD"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_end: Option<String>,
    pub user: UserProfile,
    #[serde(default)]
    pub contributions: Vec<ContributionRecord>,
}

impl Dataset {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

        let dataset: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset JSON from: {}", path.display()))?;

        tracing::info!(
            "Loaded dataset for {} ({} contributions) from {}",
            dataset.user.name,
            dataset.contributions.len(),
            path.display()
        );

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_stored_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let raw = json!({
            "id": "TestUser@pl",
            "username": "TestUser",
            "lang": "pl",
            "lastUpdated": "2025-10-29T12:00:00.000Z",
            "timestamp": 1761739200000u64,
            "rangeStart": "2025-01-01",
            "rangeEnd": "2025-10-29",
            "user": {
                "userid": 123,
                "name": "TestUser",
                "editcount": 1000,
                "registration": "2020-01-01T00:00:00Z",
                "groups": ["user"]
            },
            "contributions": [
                {
                    "userid": 123, "user": "TestUser", "pageid": 1, "revid": 11,
                    "parentid": 0, "ns": 0, "title": "Warsaw",
                    "timestamp": "2025-10-29T10:00:00Z", "comment": "", "size": 100, "new": ""
                },
                {
                    "userid": 123, "user": "TestUser", "pageid": 2, "revid": 10,
                    "parentid": 9, "ns": 1, "title": "Talk:Warsaw",
                    "timestamp": "2025-10-28T10:00:00Z", "comment": "reply", "size": 50
                }
            ]
        });
        std::fs::write(&path, raw.to_string()).unwrap();

        let dataset = Dataset::load_from_file(&path).unwrap();
        assert_eq!(dataset.username.as_deref(), Some("TestUser"));
        assert_eq!(dataset.range_start.as_deref(), Some("2025-01-01"));
        assert_eq!(dataset.user.id, 123);
        assert_eq!(dataset.contributions.len(), 2);
        assert!(dataset.contributions[0].is_page_creation);
        assert!(!dataset.contributions[1].is_page_creation);
    }

    #[test]
    fn test_load_invalid_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"contributions\": []}").unwrap();

        let err = Dataset::load_from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse dataset JSON"));
    }
}
