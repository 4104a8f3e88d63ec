// src/storage/history.rs

//! SQLite-backed append-only history of page changes and file ingestions.
//!
//! The store backs change detection and download deduplication across
//! restarts. Both tables are append-only; rows are never updated or
//! deleted. One short-lived connection per operation — there is a single
//! writer in this design.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::{FileHistoryRecord, PageHistoryRecord};

/// Repository over the history database.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    db_path: PathBuf,
}

impl HistoryStore {
    /// Open the store, creating the schema when missing. Safe to call on
    /// every startup.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            db_path: db_path.as_ref().to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pagehistory (
                page TEXT NOT NULL,
                section TEXT NOT NULL,
                url TEXT NOT NULL,
                hash TEXT NOT NULL,
                timestamp TEXT,
                lastmodified TEXT
            );

            CREATE TABLE IF NOT EXISTS filehistory (
                page TEXT NOT NULL,
                section TEXT NOT NULL,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                hash TEXT NOT NULL,
                timestamp TEXT,
                lastmodified TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Append a detected page change. Duplicates are accepted; each
    /// detected change is a fact.
    pub fn record_page_change(&self, record: &PageHistoryRecord) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO pagehistory (page, section, url, hash, timestamp, lastmodified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.page,
                record.section,
                record.url,
                record.hash,
                record.timestamp,
                record.lastmodified,
            ],
        )?;
        Ok(())
    }

    /// Append an ingested file version. The caller has already passed the
    /// dedup gate.
    pub fn record_file_ingestion(&self, record: &FileHistoryRecord) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO filehistory (page, section, name, url, hash, timestamp, lastmodified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.page,
                record.section,
                record.name,
                record.url,
                record.hash,
                record.timestamp,
                record.lastmodified,
            ],
        )?;
        Ok(())
    }

    /// Dedup gate: true iff a prior record matches (page, section, name,
    /// hash) and its most recent `lastmodified` equals the candidate's.
    pub fn is_known_file(
        &self,
        page: &str,
        section: &str,
        name: &str,
        hash: &str,
        lastmodified: Option<&str>,
    ) -> Result<bool> {
        let conn = self.connect()?;
        let stored: Option<Option<String>> = conn
            .query_row(
                "SELECT lastmodified FROM filehistory
                 WHERE page = ?1 AND section = ?2 AND name = ?3 AND hash = ?4
                 ORDER BY lastmodified DESC
                 LIMIT 1",
                params![page, section, name, hash],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match stored {
            Some(stored) => stored.as_deref() == lastmodified,
            None => false,
        })
    }
}
