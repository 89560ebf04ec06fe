//! Sumi-Scan: a bounded discovery crawler
//!
//! This crate walks a web site outward from a seed URL, following anchor links
//! up to a live-adjustable depth bound, and streams `(url, title)` results or
//! per-URL errors until a result budget, error budget, or deadline runs out.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Errors that end a run before it can produce a report
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Crawl task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

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

/// Errors produced while fetching a single page
///
/// Every variant is reported through the result stream as a failed crawl
/// result and counts against the error budget.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request for {url} cancelled")]
    Cancelled { url: String },

    #[error("Invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to decode body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Result type alias for Sumi-Scan operations
pub type Result<T> = std::result::Result<T, SumiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Crawler, CrawlResult, Document, Fetcher, HttpFetcher, ResultFunnel};
pub use output::RunReport;
pub use state::{RejectReason, ScanOutcome};
