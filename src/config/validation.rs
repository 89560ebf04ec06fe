use crate::config::types::{Config, CrawlerConfig, TimeoutConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_timeout_config(&config.timeouts)?;
    Ok(())
}

/// Validates crawl bounds and the seed URL
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    // max_depth = 0 is legal: the root scan is rejected and the run yields nothing

    if config.max_results < 1 {
        return Err(ConfigError::Validation(format!(
            "max_results must be >= 1, got {}",
            config.max_results
        )));
    }

    if config.max_errors < 1 {
        return Err(ConfigError::Validation(format!(
            "max_errors must be >= 1, got {}",
            config.max_errors
        )));
    }

    validate_seed_url(&config.url)
}

/// Validates the seed URL: it must parse and use http or https
fn validate_seed_url(seed: &str) -> ConfigResult<()> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https scheme",
            seed
        )));
    }

    Ok(())
}

/// Validates run and request deadlines
fn validate_timeout_config(config: &TimeoutConfig) -> ConfigResult<()> {
    if config.app_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "app_timeout must be >= 1s, got {}s",
            config.app_timeout
        )));
    }

    if config.req_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "req_timeout must be >= 1s, got {}s",
            config.req_timeout
        )));
    }

    if config.req_timeout > config.app_timeout {
        return Err(ConfigError::Validation(format!(
            "req_timeout ({}s) cannot exceed app_timeout ({}s)",
            config.req_timeout, config.app_timeout
        )));
    }

    Ok(())
}
