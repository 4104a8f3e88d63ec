// src/models/history.rs

//! Durable history rows, mapped through the history store repository.
//!
//! Header-reported values (`timestamp`, `lastmodified`) are stored raw;
//! the origin occasionally omits them, hence the options.

/// One row per detected page-content change. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHistoryRecord {
    pub page: String,
    pub section: String,
    pub url: String,
    pub hash: String,
    /// Origin-reported `Date` header
    pub timestamp: Option<String>,
    /// Origin-reported `Last-Modified` header
    pub lastmodified: Option<String>,
}

/// One row per distinct ingested file version. Append-only.
///
/// Dedup identity is (page, section, name, hash) plus an equal
/// `lastmodified` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHistoryRecord {
    pub page: String,
    pub section: String,
    pub name: String,
    pub url: String,
    pub hash: String,
    /// Origin-reported `Date` header
    pub timestamp: Option<String>,
    /// Origin-reported `Last-Modified` header
    pub lastmodified: Option<String>,
}
