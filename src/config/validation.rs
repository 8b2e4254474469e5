use crate::config::types::{Config, CrawlerConfig, FetchConfig, QueryConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound accepted for `url-limit`
const MAX_URL_LIMIT: usize = 10_000;

/// Upper bound accepted for `retries`
const MAX_RETRIES: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_query_config(&config.query)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = parse_http_url("seed-url", &config.seed_url)?;
    let prefix = parse_http_url("link-prefix", &config.link_prefix)?;

    if seed.host_str() != prefix.host_str() {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' must be on the same host as link-prefix '{}'",
            config.seed_url, config.link_prefix
        )));
    }

    if !config.seed_url.starts_with(&config.link_prefix) {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' must start with link-prefix '{}'",
            config.seed_url, config.link_prefix
        )));
    }

    if config.url_limit < 1 || config.url_limit > MAX_URL_LIMIT {
        return Err(ConfigError::Validation(format!(
            "url-limit must be between 1 and {}, got {}",
            MAX_URL_LIMIT, config.url_limit
        )));
    }

    if scraper::Selector::parse(&config.date_selector).is_err() {
        return Err(ConfigError::Validation(format!(
            "date-selector '{}' is not a valid CSS selector",
            config.date_selector
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.connect_timeout_ms == 0 || config.connect_timeout_ms > config.timeout_ms {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-ms must be between 1 and timeout-ms ({}), got {}",
            config.timeout_ms, config.connect_timeout_ms
        )));
    }

    if config.retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "retries must be <= {}, got {}",
            MAX_RETRIES, config.retries
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates ranking configuration
fn validate_query_config(config: &QueryConfig) -> Result<(), ConfigError> {
    if config.query_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "query-limit must be >= 1, got {}",
            config.query_limit
        )));
    }

    if !config.title_match_weight.is_finite() || config.title_match_weight < 0.0 {
        return Err(ConfigError::Validation(format!(
            "title-match-weight must be a non-negative number, got {}",
            config.title_match_weight
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &crate::config::types::StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parses a URL and requires an HTTP(S) scheme
fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(url)
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
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

    fn crawler(seed: &str, prefix: &str) -> CrawlerConfig {
        CrawlerConfig {
            seed_url: seed.to_string(),
            link_prefix: prefix.to_string(),
            url_limit: 300,
            date_selector: "p.right".to_string(),
        }
    }

    #[test]
    fn test_seed_must_start_with_prefix() {
        assert!(validate_crawler_config(&crawler(
            "https://example.com/pages/index.htm",
            "https://example.com/pages/"
        ))
        .is_ok());

        assert!(validate_crawler_config(&crawler(
            "https://example.com/other/index.htm",
            "https://example.com/pages/"
        ))
        .is_err());
    }

    #[test]
    fn test_seed_must_share_host() {
        let result = validate_crawler_config(&crawler(
            "https://other.com/pages/index.htm",
            "https://example.com/pages/",
        ));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_non_http_urls() {
        let result = validate_crawler_config(&crawler("ftp://example.com/a", "ftp://example.com/"));
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_limit_bounds() {
        let mut config = crawler("https://example.com/a", "https://example.com/");
        config.url_limit = 0;
        assert!(validate_crawler_config(&config).is_err());
        config.url_limit = MAX_URL_LIMIT + 1;
        assert!(validate_crawler_config(&config).is_err());
        config.url_limit = 1;
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_date_selector() {
        let mut config = crawler("https://example.com/a", "https://example.com/");
        config.date_selector = "p..[".to_string();
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_fetch_timeouts() {
        let mut config = FetchConfig::default();
        assert!(validate_fetch_config(&config).is_ok());

        config.connect_timeout_ms = config.timeout_ms + 1;
        assert!(validate_fetch_config(&config).is_err());

        config = FetchConfig::default();
        config.retries = MAX_RETRIES + 1;
        assert!(validate_fetch_config(&config).is_err());
    }

    #[test]
    fn test_query_config() {
        let mut config = QueryConfig::default();
        assert!(validate_query_config(&config).is_ok());

        config.query_limit = 0;
        assert!(validate_query_config(&config).is_err());

        config = QueryConfig::default();
        config.title_match_weight = f64::NAN;
        assert!(validate_query_config(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
