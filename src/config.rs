// src/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use rand::Rng;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and page-watching behavior settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Politeness delay ranges
    #[serde(default)]
    pub delays: DelayConfig,

    /// Persistence locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.watcher.user_agent.trim().is_empty() {
            return Err(AppError::config("watcher.user_agent is empty"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::config("watcher.timeout_secs must be > 0"));
        }
        if self.watcher.canonical_host.trim().is_empty() {
            return Err(AppError::config("watcher.canonical_host is empty"));
        }
        if self.watcher.accepted_types.is_empty() {
            return Err(AppError::config("watcher.accepted_types is empty"));
        }
        for selector in [
            &self.watcher.content_selector,
            &self.watcher.file_link_selector,
        ] {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        for (name, range) in [
            ("delays.link", &self.delays.link),
            ("delays.section", &self.delays.section),
            ("delays.page", &self.delays.page),
            ("delays.cycle", &self.delays.cycle),
        ] {
            if range.min_secs > range.max_secs || range.min_secs < 0.0 {
                return Err(AppError::config(format!("{name} range is invalid")));
            }
        }
        Ok(())
    }
}

/// Page-watching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Host that relative file links are rewritten against
    #[serde(default = "defaults::canonical_host")]
    pub canonical_host: String,

    /// CSS selector isolating the monitored content region of a page
    #[serde(default = "defaults::content_selector")]
    pub content_selector: String,

    /// CSS selector marking downloadable-file anchors inside the region
    #[serde(default = "defaults::file_link_selector")]
    pub file_link_selector: String,

    /// Content types accepted for file download
    #[serde(default = "defaults::accepted_types")]
    pub accepted_types: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            canonical_host: defaults::canonical_host(),
            content_selector: defaults::content_selector(),
            file_link_selector: defaults::file_link_selector(),
            accepted_types: defaults::accepted_types(),
        }
    }
}

/// Randomized politeness delay ranges, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Between file links within a section
    #[serde(default = "defaults::link_delay")]
    pub link: DelayRange,

    /// Between sections of a page
    #[serde(default = "defaults::section_delay")]
    pub section: DelayRange,

    /// Between pages
    #[serde(default = "defaults::page_delay")]
    pub page: DelayRange,

    /// Between full cycles
    #[serde(default = "defaults::cycle_delay")]
    pub cycle: DelayRange,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            link: defaults::link_delay(),
            section: defaults::section_delay(),
            page: defaults::page_delay(),
            cycle: defaults::cycle_delay(),
        }
    }
}

/// A uniform range to draw a delay from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Draw a delay uniformly from the range.
    pub fn sample(&self) -> Duration {
        let secs = if self.max_secs > self.min_secs {
            rand::rng().random_range(self.min_secs..self.max_secs)
        } else {
            self.min_secs
        };
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Persistence locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database holding the page and file history
    #[serde(default = "defaults::database_path")]
    pub database_path: String,

    /// Root directory for archived pages and downloaded files
    #[serde(default = "defaults::artifact_root")]
    pub artifact_root: String,

    /// Working catalog snapshot, rewritten at the end of every cycle
    #[serde(default = "defaults::working_catalog")]
    pub working_catalog: String,

    /// Pristine catalog used when no working snapshot is readable
    #[serde(default = "defaults::default_catalog")]
    pub default_catalog: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: defaults::database_path(),
            artifact_root: defaults::artifact_root(),
            working_catalog: defaults::working_catalog(),
            default_catalog: defaults::default_catalog(),
        }
    }
}

mod defaults {
    use super::DelayRange;

    // Watcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pagehoard/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn canonical_host() -> String {
        "www.isel.pt".into()
    }
    pub fn content_selector() -> String {
        "div#content".into()
    }
    pub fn file_link_selector() -> String {
        "a[href][rel*='noopener']".into()
    }
    pub fn accepted_types() -> Vec<String> {
        vec![
            "application/pdf".into(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
            "application/msword".into(),
        ]
    }

    // Delay defaults
    pub fn link_delay() -> DelayRange {
        DelayRange::new(5.0, 10.0)
    }
    pub fn section_delay() -> DelayRange {
        DelayRange::new(2.0, 10.0)
    }
    pub fn page_delay() -> DelayRange {
        DelayRange::new(2.0, 10.0)
    }
    pub fn cycle_delay() -> DelayRange {
        DelayRange::new(1800.0, 3600.0)
    }

    // Storage defaults
    pub fn database_path() -> String {
        "hoard.sqlite".into()
    }
    pub fn artifact_root() -> String {
        "archive".into()
    }
    pub fn working_catalog() -> String {
        "pages.json".into()
    }
    pub fn default_catalog() -> String {
        "pages.default.json".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.watcher.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.watcher.content_selector = "[[invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_delay_range() {
        let mut config = Config::default();
        config.delays.cycle = DelayRange::new(100.0, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_stays_within_bounds() {
        let range = DelayRange::new(1.0, 2.0);
        for _ in 0..100 {
            let d = range.sample();
            assert!(d >= Duration::from_secs_f64(1.0));
            assert!(d < Duration::from_secs_f64(2.0));
        }
    }

    #[test]
    fn sample_zero_width_range_yields_minimum() {
        let range = DelayRange::new(0.0, 0.0);
        assert_eq!(range.sample(), Duration::ZERO);
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [watcher]
            canonical_host = "example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.watcher.canonical_host, "example.org");
        assert_eq!(config.watcher.content_selector, "div#content");
        assert_eq!(config.storage.database_path, "hoard.sqlite");
    }
}
