// src/pipeline/watch.rs

//! The scheduler: drives fetching, change detection, and file ingestion
//! over the catalog on an endless randomized cadence.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use scraper::Html;

use crate::config::Config;
use crate::error::Result;
use crate::models::{ChangeEvent, Page, PageHistoryRecord, Section, format_digest};
use crate::notify::Broadcaster;
use crate::services::fetcher::{self, FetchOutcome, PageResponse};
use crate::services::{FileIngestor, links, parse_selector};
use crate::storage::{ArtifactStore, HistoryStore, catalog};
use crate::utils::{delay, http};

/// Single sequential worker over the page catalog. All collaborators are
/// passed in explicitly; the watcher owns the catalog for the lifetime of
/// the process.
pub struct Watcher {
    config: Arc<Config>,
    client: reqwest::Client,
    history: HistoryStore,
    artifacts: Arc<dyn ArtifactStore>,
    broadcaster: Arc<Broadcaster>,
    ingestor: FileIngestor,
}

impl Watcher {
    pub fn new(
        config: Arc<Config>,
        history: HistoryStore,
        artifacts: Arc<dyn ArtifactStore>,
        broadcaster: Arc<Broadcaster>,
    ) -> Result<Self> {
        let client = http::create_client(&config.watcher)?;
        let ingestor = FileIngestor::new(
            Arc::clone(&config),
            client.clone(),
            history.clone(),
            Arc::clone(&artifacts),
            Arc::clone(&broadcaster),
        );
        Ok(Self {
            config,
            client,
            history,
            artifacts,
            broadcaster,
            ingestor,
        })
    }

    /// Watch the catalog forever. Each cycle scouts every section, then
    /// persists the catalog snapshot and sends the change digest before a
    /// long randomized nap. A cycle aborted by a storage failure is
    /// logged and retried on the next round; nothing was committed.
    pub async fn run(&self, pages: &mut [Page]) -> Result<()> {
        loop {
            match self.run_cycle(pages).await {
                Ok(changes) => {
                    let snapshot = Path::new(&self.config.storage.working_catalog);
                    if let Err(e) = catalog::save_catalog(snapshot, pages).await {
                        log::error!("Failed to persist catalog snapshot: {e}");
                    }
                    if !changes.is_empty() {
                        self.broadcaster.to_owner(&format_digest(&changes)).await;
                    }
                }
                Err(e) => log::error!("Cycle aborted: {e}"),
            }

            let nap = self.config.delays.cycle.sample();
            log::info!(
                "Taking a nap for about {} minutes.",
                (nap.as_secs_f64() / 60.0).floor()
            );
            tokio::time::sleep(nap).await;
        }
    }

    /// One pass over every page and section, in catalog order, strictly
    /// sequential. Fetch failures are section-local; the attempt stamp
    /// advances regardless of outcome.
    pub async fn run_cycle(&self, pages: &mut [Page]) -> Result<Vec<ChangeEvent>> {
        let mut changes = Vec::new();

        for page in pages.iter_mut() {
            for section in page.sections.iter_mut() {
                section.last_attempt = Some(Utc::now());
                if let Some(event) = self.scout_section(&page.name, section).await? {
                    changes.push(event);
                }
                delay::polite_sleep(&self.config.delays.section).await;
            }
            delay::polite_sleep(&self.config.delays.page).await;
        }

        Ok(changes)
    }

    /// Scout one section: fetch, diff, record a detected change, then run
    /// the file ingestion pipeline either way.
    async fn scout_section(
        &self,
        page_name: &str,
        section: &mut Section,
    ) -> Result<Option<ChangeEvent>> {
        let response = match fetcher::fetch_page(&self.client, &section.url).await {
            Ok(FetchOutcome::Page(response)) => response,
            Ok(FetchOutcome::Status(status)) => {
                log::error!("{} returned {}", section.url, status);
                return Ok(None);
            }
            Err(e) if e.is_fetch_failure() => {
                log::error!(
                    "Could not fetch section {} of {}: {e}",
                    section.name,
                    page_name
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let content_selector = parse_selector(&self.config.watcher.content_selector)?;
        let link_selector = parse_selector(&self.config.watcher.file_link_selector)?;

        // Parse once, pull everything out, and drop the document before
        // the first await: Html is not Send.
        let (hash, file_links) = {
            let document = Html::parse_document(&response.body);
            let region = fetcher::content_region(&document, &content_selector);
            let text = fetcher::normalize(region);
            let file_links = links::extract_candidate_links(
                region,
                &link_selector,
                &self.config.watcher.canonical_host,
            );
            (fetcher::fingerprint(text.as_bytes()), file_links)
        };

        let mut event = None;
        if section.has_changed(&hash) {
            log::info!(
                "Section {} of {} has changed! Recording..",
                section.name,
                page_name
            );
            let timestamp = self
                .record_page_change(page_name, section, &response, &hash)
                .await?;
            event = Some(ChangeEvent::new(page_name, section.name.clone(), timestamp));
        }

        if !file_links.is_empty() {
            match self
                .ingestor
                .ingest(&file_links, page_name, &section.name)
                .await
            {
                Ok(0) => {}
                Ok(count) => {
                    log::info!(
                        "Section {} of {} has {} new files!",
                        section.name,
                        page_name,
                        count
                    );
                    event
                        .get_or_insert_with(|| {
                            ChangeEvent::new(
                                page_name,
                                section.name.clone(),
                                response.change_timestamp(),
                            )
                        })
                        .file_count = count;
                }
                Err(e) if e.is_fetch_failure() => {
                    log::error!(
                        "File ingestion aborted for {} of {}: {e}",
                        section.name,
                        page_name
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(event)
    }

    /// Archive the changed page, append its history row, then advance the
    /// section state. The state moves only after both writes succeed.
    async fn record_page_change(
        &self,
        page_name: &str,
        section: &mut Section,
        response: &PageResponse,
        hash: &str,
    ) -> Result<DateTime<Utc>> {
        let timestamp = response.change_timestamp();

        self.artifacts
            .store_page(&response.body, page_name, &section.name, timestamp)
            .await?;
        self.history.record_page_change(&PageHistoryRecord {
            page: page_name.to_string(),
            section: section.name.clone(),
            url: section.url.clone(),
            hash: hash.to_string(),
            timestamp: response.date.clone(),
            lastmodified: response.last_modified.clone(),
        })?;

        section.last_hash = Some(hash.to_string());
        section.last_update = Some(timestamp);
        Ok(timestamp)
    }
}
