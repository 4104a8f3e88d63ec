// src/models/page.rs

//! Catalog structures: pages and their monitored sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named logical site owning an ordered collection of sections.
///
/// Identity is the externally supplied `name`, stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub sections: Vec<Section>,
}

/// One monitored content region within a page.
///
/// `last_attempt` is stamped on every poll regardless of outcome;
/// `last_hash` and `last_update` move only when a change has been
/// detected and successfully recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub name: String,

    pub url: String,

    /// Fingerprint of the content at the last successful poll
    #[serde(default)]
    pub last_hash: Option<String>,

    /// Timestamp of the last detected change
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,

    /// Timestamp of the last poll attempt
    #[serde(default)]
    pub last_attempt: Option<DateTime<Utc>>,
}

impl Section {
    /// Whether freshly fingerprinted content differs from the last known
    /// fingerprint. A section that was never polled counts as changed.
    pub fn has_changed(&self, hash: &str) -> bool {
        self.last_hash.as_deref() != Some(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(last_hash: Option<&str>) -> Section {
        Section {
            name: "main_page".to_string(),
            url: "https://www.isel.pt/curso".to_string(),
            last_hash: last_hash.map(str::to_string),
            last_update: None,
            last_attempt: None,
        }
    }

    #[test]
    fn first_poll_always_changes() {
        assert!(section(None).has_changed("abc"));
    }

    #[test]
    fn equal_hash_is_unchanged() {
        assert!(!section(Some("abc")).has_changed("abc"));
    }

    #[test]
    fn different_hash_changes() {
        assert!(section(Some("A")).has_changed("B"));
    }

    #[test]
    fn serializes_timestamps_as_iso_or_null() {
        let mut s = section(Some("abc"));
        s.last_update = Some("2023-04-25T00:03:06Z".parse().unwrap());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["last_update"], "2023-04-25T00:03:06Z");
        assert!(json["last_attempt"].is_null());

        let back: Section = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn deserializes_catalog_without_state_fields() {
        let page: Page = serde_json::from_str(
            r#"{"name": "det", "sections": [{"name": "main_page", "url": "https://www.isel.pt/x"}]}"#,
        )
        .unwrap();
        assert_eq!(page.sections.len(), 1);
        assert!(page.sections[0].last_hash.is_none());
    }
}
