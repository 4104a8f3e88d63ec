// src/models/change.rs

//! Per-cycle change events and their digest formatting.

use chrono::{DateTime, Utc};

/// Ephemeral record that a section's content or file set changed this
/// cycle. Aggregated into the cycle digest, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub page: String,
    pub section: String,
    pub timestamp: DateTime<Utc>,
    pub file_count: u32,
}

impl ChangeEvent {
    pub fn new(page: impl Into<String>, section: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            page: page.into(),
            section: section.into(),
            timestamp,
            file_count: 0,
        }
    }

    /// One digest line for the owner notification.
    pub fn to_line(&self) -> String {
        let stamp = self.timestamp.format("%d-%m %H:%M");
        if self.file_count > 0 {
            format!(
                "{} of {} with {} new files at {}",
                self.section, self.page, self.file_count, stamp
            )
        } else {
            format!("{} of {} at {}", self.section, self.page, stamp)
        }
    }
}

/// Format the end-of-cycle digest: a banner line followed by one line per
/// change event, in the order the events were produced.
pub fn format_digest(changes: &[ChangeEvent]) -> String {
    let lines: Vec<String> = changes.iter().map(ChangeEvent::to_line).collect();
    format!("Found changes!\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> ChangeEvent {
        ChangeEvent::new(
            "det",
            "main_page",
            "2023-04-25T00:03:06Z".parse().unwrap(),
        )
    }

    #[test]
    fn line_without_files() {
        assert_eq!(event().to_line(), "main_page of det at 25-04 00:03");
    }

    #[test]
    fn line_with_files() {
        let mut e = event();
        e.file_count = 3;
        assert_eq!(
            e.to_line(),
            "main_page of det with 3 new files at 25-04 00:03"
        );
    }

    #[test]
    fn digest_joins_lines_under_banner() {
        let mut second = event();
        second.section = "announcements".to_string();
        second.file_count = 1;
        let digest = format_digest(&[event(), second]);
        assert_eq!(
            digest,
            "Found changes!\nmain_page of det at 25-04 00:03\n\
             announcements of det with 1 new files at 25-04 00:03"
        );
    }
}
