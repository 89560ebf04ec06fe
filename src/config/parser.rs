use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::io::ErrorKind;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_scan::config::load_config;
///
/// let config = load_config(Path::new("config/config.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads a configuration file, falling back to defaults when it does not exist
///
/// The returned configuration is not validated, so that command-line
/// overrides can be applied first. Call [`validate`] before using it.
///
/// # Returns
///
/// * `Ok(Config)` - Parsed configuration, or defaults if the file is missing
/// * `Err(ConfigError)` - The file exists but could not be read or parsed
pub fn load_config_or_default(path: &Path) -> ConfigResult<Config> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(
                "Config file {} not found, using default values",
                path.display()
            );
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-depth = 4
max-results = 50
max-errors = 5
url = "https://example.com"

[timeouts]
app-timeout = 30
req-timeout = 3
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 4);
        assert_eq!(config.crawler.max_results, 50);
        assert_eq!(config.crawler.max_errors, 5);
        assert_eq!(config.crawler.url, "https://example.com");
        assert_eq!(config.timeouts.app_timeout, 30);
        assert_eq!(config.timeouts.req_timeout, 3);
    }

    #[test]
    fn test_snake_case_keys_accepted() {
        let config_content = r#"
[crawler]
max_depth = 2
max_results = 7

[timeouts]
app_timeout = 15
"#;

        let config = parse_config(config_content).unwrap();
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.max_results, 7);
        assert_eq!(config.crawler.max_errors, 20);
        assert_eq!(config.timeouts.app_timeout, 15);
        assert_eq!(config.timeouts.req_timeout, 2);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.url, "https://telegram.org");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.crawler.max_results, 10);
        assert_eq!(config.timeouts.app_timeout, 10);
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            load_config_or_default(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
max-results = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }
}
