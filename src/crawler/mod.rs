//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The crawl engine: guarded, deduplicated, depth-bounded fan-out
//! - The result funnel: budget accounting and shutdown
//! - HTTP fetching and HTML title/link extraction
//! - The run controller that ties them to deadlines and signals

mod engine;
mod fetcher;
mod funnel;
mod parser;
mod runtime;

pub use engine::{
    CrawlResult, Crawler, DepthBound, ResultStream, ScanFuture, RESULT_CHANNEL_CAPACITY,
};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher, USER_AGENT};
pub use funnel::{FunnelOutcome, FunnelReport, ResultFunnel};
pub use parser::{parse_html, Document, HtmlDocument};
pub use runtime::{
    run_crawl, run_crawl_with_control, spawn_signal_listener, ControlSignal, StopReason,
    DEPTH_SIGNAL_INCREMENT,
};
