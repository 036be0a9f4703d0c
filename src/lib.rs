//! Kumo: a seed-driven web crawler
//!
//! Kumo resolves its start URLs at runtime from a document store
//! (organization -> spider config -> named URL collections -> URL lists),
//! feeds them into a deduplicated work queue, and drains the queue with a
//! bounded-concurrency fetch pool with per-URL retry and failure isolation.

pub mod config;
pub mod crawler;
pub mod output;
pub mod seeds;
pub mod state;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Kumo operations
///
/// Per-URL fetch failures never surface here; they are contained by the
/// dispatcher and reported in the final [`crawler::CrawlSummary`]. Only
/// startup problems (configuration, document store) abort a crawl.
#[derive(Debug, Error)]
pub enum KumoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Kumo operations
pub type Result<T> = std::result::Result<T, KumoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{start_crawl, CrawlSummary};
pub use seeds::SeedReference;
pub use state::TaskState;
pub use store::{Document, DocumentStore};
pub use crate::url::normalize_url;
