use serde::Deserialize;
use std::time::Duration;

/// Default recursion depth bound
pub const DEFAULT_MAX_DEPTH: u32 = 3;
/// Default number of successful results accepted before shutdown
pub const DEFAULT_MAX_RESULTS: u32 = 10;
/// Default number of failed results accepted before shutdown
pub const DEFAULT_MAX_ERRORS: u32 = 20;
/// Default seed URL
pub const DEFAULT_SEED_URL: &str = "https://telegram.org";
/// Default overall run deadline in seconds
pub const DEFAULT_APP_TIMEOUT: u64 = 10;
/// Default per-fetch deadline in seconds
pub const DEFAULT_REQ_TIMEOUT: u64 = 2;

/// Main configuration structure for Sumi-Scan
///
/// This is an immutable snapshot once loaded. The only value that changes
/// during a run is the depth bound, which the crawler copies into its own
/// atomic cell at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Crawl bounds and the seed URL
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Initial depth bound; scan attempts at `depth >= max_depth` are rejected
    #[serde(rename = "max-depth", alias = "max_depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Successful results accepted before the run is cancelled
    #[serde(
        rename = "max-results",
        alias = "max_results",
        default = "default_max_results"
    )]
    pub max_results: u32,

    /// Failed results accepted before the run is cancelled
    #[serde(
        rename = "max-errors",
        alias = "max_errors",
        default = "default_max_errors"
    )]
    pub max_errors: u32,

    /// Seed URL the crawl starts from
    #[serde(default = "default_seed_url")]
    pub url: String,
}

/// Run and request deadlines, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Overall run deadline
    #[serde(
        rename = "app-timeout",
        alias = "app_timeout",
        default = "default_app_timeout"
    )]
    pub app_timeout: u64,

    /// Deadline for a single page fetch
    #[serde(
        rename = "req-timeout",
        alias = "req_timeout",
        default = "default_req_timeout"
    )]
    pub req_timeout: u64,
}

impl TimeoutConfig {
    /// Overall run deadline as a `Duration`
    pub fn app(&self) -> Duration {
        Duration::from_secs(self.app_timeout)
    }

    /// Per-fetch deadline as a `Duration`
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.req_timeout)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_results: DEFAULT_MAX_RESULTS,
            max_errors: DEFAULT_MAX_ERRORS,
            url: DEFAULT_SEED_URL.to_string(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            app_timeout: DEFAULT_APP_TIMEOUT,
            req_timeout: DEFAULT_REQ_TIMEOUT,
        }
    }
}

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub max_depth: Option<u32>,
    pub max_results: Option<u32>,
    pub max_errors: Option<u32>,
}

impl Config {
    /// Applies command-line overrides on top of this configuration
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.url {
            self.crawler.url = url.clone();
        }
        if let Some(max_depth) = overrides.max_depth {
            self.crawler.max_depth = max_depth;
        }
        if let Some(max_results) = overrides.max_results {
            self.crawler.max_results = max_results;
        }
        if let Some(max_errors) = overrides.max_errors {
            self.crawler.max_errors = max_errors;
        }
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_max_errors() -> u32 {
    DEFAULT_MAX_ERRORS
}

fn default_seed_url() -> String {
    DEFAULT_SEED_URL.to_string()
}

fn default_app_timeout() -> u64 {
    DEFAULT_APP_TIMEOUT
}

fn default_req_timeout() -> u64 {
    DEFAULT_REQ_TIMEOUT
}
