// src/services/mod.rs

//! Page fetching, link extraction, and file ingestion services.

pub mod fetcher;
pub mod ingest;
pub mod links;

pub use ingest::FileIngestor;

use scraper::Selector;

use crate::error::{AppError, Result};

/// Parse a CSS selector from configuration.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selector_valid() {
        assert!(parse_selector("div#content").is_ok());
        assert!(parse_selector("a[href][rel*='noopener']").is_ok());
    }

    #[test]
    fn parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
