// src/services/fetcher.rs

//! Page fetching, content-region normalization, and fingerprinting.

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use reqwest::StatusCode;
use reqwest::header::{DATE, LAST_MODIFIED};
use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::utils::http::header_string;
use crate::utils::time::parse_http_date_opt;

/// A successfully fetched page with the origin date headers captured raw.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub body: String,
    /// Origin-reported `Date` header
    pub date: Option<String>,
    /// Origin-reported `Last-Modified` header
    pub last_modified: Option<String>,
}

impl PageResponse {
    /// Timestamp to record for a detected change: `Last-Modified` when
    /// parseable, else `Date`, else the current wall-clock time.
    pub fn change_timestamp(&self) -> DateTime<Utc> {
        parse_http_date_opt(self.last_modified.as_deref())
            .or_else(|| parse_http_date_opt(self.date.as_deref()))
            .unwrap_or_else(Utc::now)
    }
}

/// Outcome of a page fetch. A non-200 status is an expected, frequent
/// result and is modeled as data rather than an error; transport failures
/// surface as `AppError::Http`.
#[derive(Debug)]
pub enum FetchOutcome {
    Page(PageResponse),
    Status(StatusCode),
}

/// Issue a GET, accepting only a 200.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<FetchOutcome> {
    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        return Ok(FetchOutcome::Status(response.status()));
    }

    let date = header_string(response.headers(), DATE);
    let last_modified = header_string(response.headers(), LAST_MODIFIED);
    let body = response.text().await?;

    Ok(FetchOutcome::Page(PageResponse {
        body,
        date,
        last_modified,
    }))
}

/// Select the designated content container of a page. A page without the
/// container hashes as empty content further down, which surfaces as a
/// one-time spurious change rather than a crash.
pub fn content_region<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Collect the visible text of the content region into a stable UTF-8
/// representation for hashing.
pub fn normalize(region: Option<ElementRef<'_>>) -> String {
    region.map(|el| el.text().collect()).unwrap_or_default()
}

/// 128-bit content fingerprint, hex encoded. Equality, not security, is
/// the contract; digests stay comparable with previously stored hashes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::parse_selector;
    use chrono::TimeZone;

    const PAGE: &str = r#"
        <html><body>
        <div id="nav">Menu</div>
        <div id="content"><h1>Title</h1><p>Some text.</p></div>
        </body></html>
    "#;

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint(b"hello world"), fingerprint(b"hello world"));
        assert_ne!(fingerprint(b"hello world"), fingerprint(b"hello worlds"));
    }

    #[test]
    fn fingerprint_matches_stored_md5_hashes() {
        // Known MD5 vectors; stored history rows were produced by MD5.
        assert_eq!(fingerprint(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            fingerprint(b"hello world"),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn normalize_extracts_region_text_only() {
        let document = Html::parse_document(PAGE);
        let selector = parse_selector("div#content").unwrap();
        let text = normalize(content_region(&document, &selector));
        assert!(text.contains("Title"));
        assert!(text.contains("Some text."));
        assert!(!text.contains("Menu"));
    }

    #[test]
    fn missing_region_normalizes_to_empty() {
        let document = Html::parse_document("<html><body><p>x</p></body></html>");
        let selector = parse_selector("div#content").unwrap();
        assert_eq!(normalize(content_region(&document, &selector)), "");
    }

    #[test]
    fn change_timestamp_prefers_last_modified() {
        let response = PageResponse {
            body: String::new(),
            date: Some("Tue, 25 Apr 2023 12:00:00 GMT".to_string()),
            last_modified: Some("Tue, 25 Apr 2023 00:03:06 GMT".to_string()),
        };
        assert_eq!(
            response.change_timestamp(),
            Utc.with_ymd_and_hms(2023, 4, 25, 0, 3, 6).unwrap()
        );
    }

    #[test]
    fn change_timestamp_falls_back_to_date_header() {
        let response = PageResponse {
            body: String::new(),
            date: Some("Tue, 25 Apr 2023 12:00:00 GMT".to_string()),
            last_modified: Some("not a date".to_string()),
        };
        assert_eq!(
            response.change_timestamp(),
            Utc.with_ymd_and_hms(2023, 4, 25, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn change_timestamp_degrades_to_now() {
        let response = PageResponse {
            body: String::new(),
            date: None,
            last_modified: None,
        };
        let before = Utc::now();
        let stamped = response.change_timestamp();
        assert!(stamped >= before);
    }
}
