// src/storage/local.rs

//! Local filesystem artifact storage.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! └── {page}/
//!     └── {section}/
//!         └── {Y-M-D}/
//!             ├── {H}h{M}m{S}s.html       # archived page content
//!             └── {H}h{M}m{S}s{name}      # downloaded files
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Timelike, Utc};
use regex::Regex;

use crate::error::Result;
use crate::storage::ArtifactStore;

/// Filesystem-backed artifact store.
pub struct LocalArtifacts {
    root: PathBuf,
    unsafe_chars: Regex,
}

impl LocalArtifacts {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            unsafe_chars: Regex::new(r#"[\\/:*?"<>|[:cntrl:]]+"#)
                .expect("file name pattern is valid"),
        }
    }

    fn day_dir(&self, page: &str, section: &str, ts: &DateTime<Utc>) -> PathBuf {
        self.root
            .join(page)
            .join(section)
            .join(format!("{}-{}-{}", ts.year(), ts.month(), ts.day()))
    }

    fn time_prefix(ts: &DateTime<Utc>) -> String {
        format!("{}h{}m{}s", ts.hour(), ts.minute(), ts.second())
    }

    /// Strip path separators and other unsafe characters from a logical
    /// name before it touches the disk. History rows keep the raw name.
    fn sanitize(&self, name: &str) -> String {
        self.unsafe_chars.replace_all(name, "_").into_owned()
    }

    async fn write(&self, dir: PathBuf, file_name: String, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifacts {
    async fn store_file(
        &self,
        bytes: &[u8],
        name: &str,
        page: &str,
        section: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let file_name = format!("{}{}", Self::time_prefix(&timestamp), self.sanitize(name));
        self.write(self.day_dir(page, section, &timestamp), file_name, bytes)
            .await
    }

    async fn store_page(
        &self,
        html: &str,
        page: &str,
        section: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let file_name = format!("{}.html", Self::time_prefix(&timestamp));
        self.write(
            self.day_dir(page, section, &timestamp),
            file_name,
            html.as_bytes(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 4, 25, 0, 3, 6).unwrap()
    }

    #[tokio::test]
    async fn stores_file_under_day_directory() {
        let tmp = TempDir::new().unwrap();
        let store = LocalArtifacts::new(tmp.path());

        store
            .store_file(b"%PDF-", "doc.pdf", "det", "main_page", timestamp())
            .await
            .unwrap();

        let expected = tmp
            .path()
            .join("det")
            .join("main_page")
            .join("2023-4-25")
            .join("0h3m6sdoc.pdf");
        assert_eq!(std::fs::read(expected).unwrap(), b"%PDF-");
    }

    #[tokio::test]
    async fn stores_page_with_fixed_extension() {
        let tmp = TempDir::new().unwrap();
        let store = LocalArtifacts::new(tmp.path());

        store
            .store_page("<html></html>", "det", "main_page", timestamp())
            .await
            .unwrap();

        let expected = tmp
            .path()
            .join("det")
            .join("main_page")
            .join("2023-4-25")
            .join("0h3m6s.html");
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn repeated_stores_are_idempotent_on_directories() {
        let tmp = TempDir::new().unwrap();
        let store = LocalArtifacts::new(tmp.path());

        store
            .store_file(b"a", "a.pdf", "det", "main_page", timestamp())
            .await
            .unwrap();
        store
            .store_file(b"b", "b.pdf", "det", "main_page", timestamp())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sanitizes_hostile_logical_names() {
        let tmp = TempDir::new().unwrap();
        let store = LocalArtifacts::new(tmp.path());

        store
            .store_file(b"x", "..\\..\\evil?.pdf", "det", "main_page", timestamp())
            .await
            .unwrap();

        let dir = tmp.path().join("det").join("main_page").join("2023-4-25");
        let names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["0h3m6s.._.._evil_.pdf".to_string()]);
    }
}
