use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;

/// A single advisory decoded from the audit feed.
///
/// Every field except `id` is optional and mirrors the feed verbatim. `version`
/// is not a feed field: it is the installed version of `module_name` resolved
/// from the advisory's findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub id: i64,
    pub overview: Option<String>,
    pub references: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub recommendation: Option<String>,
    pub title: Option<String>,
    pub module_name: Option<String>,
    pub vulnerable_versions: Option<String>,
    pub patched_versions: Option<String>,
    pub access: Option<String>,
    pub severity: Option<String>,
    pub cwe: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub cves: Vec<String>,
}

impl Advisory {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn severity_level(&self) -> Severity {
        self.severity
            .as_deref()
            .map(Severity::from_npm)
            .unwrap_or(Severity::Unknown)
    }

    /// Publication time, if `created` holds an RFC 3339 timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created.as_deref()?)
    }

    /// Last modification time, if `updated` holds an RFC 3339 timestamp.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.updated.as_deref()?)
    }

    /// Public page for this advisory on npmjs.com.
    pub fn url(&self) -> String {
        format!("https://www.npmjs.com/advisories/{}", self.id)
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_new_advisory_is_empty() {
        let advisory = Advisory::new(7);
        assert_eq!(advisory.id, 7);
        assert!(advisory.overview.is_none());
        assert!(advisory.version.is_none());
        assert!(advisory.cves.is_empty());
    }

    #[test]
    fn test_severity_level() {
        let mut advisory = Advisory::new(1);
        assert_eq!(advisory.severity_level(), Severity::Unknown);

        advisory.severity = Some("moderate".to_string());
        assert_eq!(advisory.severity_level(), Severity::Moderate);
    }

    #[test]
    fn test_timestamps() {
        let mut advisory = Advisory::new(1);
        advisory.created = Some("2016-05-04T16:34:12.000Z".to_string());
        advisory.updated = Some("not a date".to_string());

        let created = advisory.created_at().unwrap();
        assert_eq!(created.year(), 2016);
        assert_eq!(created.month(), 5);
        assert!(advisory.updated_at().is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut advisory = Advisory::new(48);
        advisory.module_name = Some("qs".to_string());
        advisory.patched_versions = Some(">= 1.x".to_string());

        let value = serde_json::to_value(&advisory).unwrap();
        assert_eq!(value["moduleName"], "qs");
        assert_eq!(value["patchedVersions"], ">= 1.x");
        assert!(value["vulnerableVersions"].is_null());
        assert_eq!(value["cves"], serde_json::json!([]));
    }

    #[test]
    fn test_url() {
        assert_eq!(
            Advisory::new(118).url(),
            "https://www.npmjs.com/advisories/118"
        );
    }
}
