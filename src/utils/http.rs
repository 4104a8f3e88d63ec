// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName};

use crate::config::WatcherConfig;
use crate::error::Result;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &WatcherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Read a header value as an owned string, if present and readable.
pub fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
