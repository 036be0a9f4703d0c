use serde::Deserialize;

/// Main configuration structure for Kumo
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub seed: SeedEntry,
    pub store: StoreConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
///
/// Every field has a default so a minimal config file only needs to name
/// the seed reference and the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Maximum number of retries for a failing URL (fetched at most
    /// max-retries + 1 times)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay before the first retry (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Multiplier applied to the delay on each further retry
    #[serde(rename = "backoff-multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound on the retry delay (milliseconds)
    #[serde(rename = "backoff-cap-ms")]
    pub backoff_cap_ms: u64,

    /// Per-request fetch timeout (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 8,
            max_retries: 3,
            backoff_base_ms: 500,
            backoff_multiplier: 2.0,
            backoff_cap_ms: 30_000,
            fetch_timeout_ms: 30_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Which spider configuration to resolve seeds from
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Organization that owns the spider configuration
    pub organization: String,

    /// Name of the spider document to resolve
    pub spider: String,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite document database
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}
