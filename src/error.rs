// src/error.rs

//! Unified error handling for the watcher application.

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// History store operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Notification delivery error
    #[error("Notification error: {0}")]
    Notify(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a notification error.
    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify(message.into())
    }

    /// True for transport-level fetch failures that are section-local:
    /// the current section is skipped and the cycle moves on.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
