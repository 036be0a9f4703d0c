use crate::config::types::{Config, CrawlerConfig, SeedEntry, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_seed_entry(&config.seed)?;
    validate_paths(config)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.backoff_base_ms < 1 {
        return Err(ConfigError::Validation(
            "backoff_base_ms must be >= 1ms".to_string(),
        ));
    }

    if config.backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_multiplier must be >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    if config.backoff_cap_ms < config.backoff_base_ms {
        return Err(ConfigError::Validation(format!(
            "backoff_cap_ms ({}) must be >= backoff_base_ms ({})",
            config.backoff_cap_ms, config.backoff_base_ms
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the seed reference
///
/// Organization and spider names become document path segments
/// (`organizations/{org}/spiders/{spider}`), so they must be non-empty and
/// must not contain the path separator.
fn validate_seed_entry(seed: &SeedEntry) -> Result<(), ConfigError> {
    validate_path_segment("seed.organization", &seed.organization)?;
    validate_path_segment("seed.spider", &seed.spider)?;
    Ok(())
}

fn validate_path_segment(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} cannot be empty",
            field
        )));
    }

    if value.contains('/') {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain '/', got '{}'",
            field, value
        )));
    }

    Ok(())
}

/// Validates store and output paths
fn validate_paths(config: &Config) -> Result<(), ConfigError> {
    if config.store.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "store.database_path cannot be empty".to_string(),
        ));
    }

    if config.output.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "output.summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{OutputConfig, StoreConfig};

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            seed: SeedEntry {
                organization: "acme".to_string(),
                spider: "catalog".to_string(),
            },
            store: StoreConfig {
                database_path: "./documents.db".to_string(),
            },
            output: OutputConfig {
                summary_path: "./summary.md".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = valid_config();
        config.crawler.concurrency_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_backoff_cap_below_base_rejected() {
        let mut config = valid_config();
        config.crawler.backoff_base_ms = 5_000;
        config.crawler.backoff_cap_ms = 1_000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_multiplier_below_one_rejected() {
        let mut config = valid_config();
        config.crawler.backoff_multiplier = 0.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_spider_rejected() {
        let mut config = valid_config();
        config.seed.spider = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_slash_in_organization_rejected() {
        let mut config = valid_config();
        config.seed.organization = "acme/evil".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
