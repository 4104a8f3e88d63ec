// src/storage/mod.rs

//! Persistence: the durable history store, archived artifacts, and the
//! catalog state snapshot.

pub mod catalog;
pub mod history;
pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

// Re-export for convenience
pub use history::HistoryStore;
pub use local::LocalArtifacts;

/// Store for downloaded files and archived page content.
///
/// Content lands under a key deterministically derived from
/// (page, section, day-of-timestamp); the file name embeds the
/// time of day plus the logical name. Intermediate structure is
/// created idempotently.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store a downloaded file.
    async fn store_file(
        &self,
        bytes: &[u8],
        name: &str,
        page: &str,
        section: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;

    /// Store the raw HTML of a changed page.
    async fn store_page(
        &self,
        html: &str,
        page: &str,
        section: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;
}
