// src/services/ingest.rs

//! File ingestion pipeline: probe, filter, download, dedup, persist.

use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, DATE, LAST_MODIFIED};

use crate::config::Config;
use crate::error::Result;
use crate::models::FileHistoryRecord;
use crate::notify::Broadcaster;
use crate::services::fetcher;
use crate::storage::{ArtifactStore, HistoryStore};
use crate::utils::delay;
use crate::utils::http::header_string;
use crate::utils::time::parse_http_date_opt;

/// Service ingesting candidate file links for one section at a time.
pub struct FileIngestor {
    config: Arc<Config>,
    client: reqwest::Client,
    history: HistoryStore,
    artifacts: Arc<dyn ArtifactStore>,
    broadcaster: Arc<Broadcaster>,
}

impl FileIngestor {
    pub fn new(
        config: Arc<Config>,
        client: reqwest::Client,
        history: HistoryStore,
        artifacts: Arc<dyn ArtifactStore>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            config,
            client,
            history,
            artifacts,
            broadcaster,
        }
    }

    /// Work through the resolved links in document order and return how
    /// many new files were ingested. Already-known files are skipped
    /// silently; unexpected content types are skipped with an out-of-band
    /// warning to the owner.
    pub async fn ingest(
        &self,
        links: &[Option<String>],
        page: &str,
        section: &str,
    ) -> Result<u32> {
        let mut downloaded = 0;

        for link in links.iter().flatten() {
            let probe = self.client.head(link).send().await?;
            if probe.status() != StatusCode::OK {
                continue;
            }

            let file_name = file_name_of(link);
            let content_type = header_string(probe.headers(), CONTENT_TYPE);
            if !is_accepted_type(&self.config.watcher.accepted_types, content_type.as_deref()) {
                let message = format!(
                    "Found a weird content type {} for file {} at {}/{}.",
                    content_type.as_deref().unwrap_or("<none>"),
                    file_name,
                    page,
                    section
                );
                log::warn!("{message}");
                self.broadcaster.to_owner(&message).await;
                continue;
            }

            if self.download_file(link, file_name, page, section).await? {
                downloaded += 1;
            }
            delay::polite_sleep(&self.config.delays.link).await;
        }

        Ok(downloaded)
    }

    /// Download one accepted link, returning whether it was new.
    async fn download_file(
        &self,
        link: &str,
        name: &str,
        page: &str,
        section: &str,
    ) -> Result<bool> {
        let response = self.client.get(link).send().await?;
        if response.status() != StatusCode::OK {
            log::warn!("Download of {} returned {}", link, response.status());
            return Ok(false);
        }

        let timestamp = header_string(response.headers(), DATE);
        let lastmodified = header_string(response.headers(), LAST_MODIFIED);
        let bytes = response.bytes().await?;

        let record = FileHistoryRecord {
            page: page.to_string(),
            section: section.to_string(),
            name: name.to_string(),
            url: link.to_string(),
            hash: fetcher::fingerprint(&bytes),
            timestamp,
            lastmodified,
        };

        if self.history.is_known_file(
            &record.page,
            &record.section,
            &record.name,
            &record.hash,
            record.lastmodified.as_deref(),
        )? {
            return Ok(false);
        }

        self.history.record_file_ingestion(&record)?;

        let stored_at = parse_http_date_opt(record.timestamp.as_deref()).unwrap_or_else(Utc::now);
        self.artifacts
            .store_file(&bytes, name, page, section, stored_at)
            .await?;

        Ok(true)
    }
}

/// Candidate file name: the final path segment of the link.
pub(crate) fn file_name_of(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Content-type gate. The media type is compared without parameters; the
/// accepted set holds exact media types from configuration.
pub(crate) fn is_accepted_type(accepted: &[String], content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or(value).trim();
    accepted.iter().any(|a| a == essence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted() -> Vec<String> {
        vec!["application/pdf".to_string(), "application/msword".to_string()]
    }

    #[test]
    fn accepts_listed_media_type() {
        assert!(is_accepted_type(&accepted(), Some("application/pdf")));
    }

    #[test]
    fn accepts_media_type_with_parameters() {
        assert!(is_accepted_type(
            &accepted(),
            Some("application/pdf; charset=binary")
        ));
    }

    #[test]
    fn rejects_unlisted_media_type() {
        assert!(!is_accepted_type(&accepted(), Some("text/plain")));
    }

    #[test]
    fn rejects_missing_content_type() {
        assert!(!is_accepted_type(&accepted(), None));
    }

    #[test]
    fn file_name_is_final_path_segment() {
        assert_eq!(
            file_name_of("https://www.isel.pt/sites/default/files/LECM23PModelo.pdf"),
            "LECM23PModelo.pdf"
        );
        assert_eq!(file_name_of("plain-name.pdf"), "plain-name.pdf");
    }
}
