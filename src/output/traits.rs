//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and
//! the data structures describing a finished run.

use crate::crawler::StopReason;
use crate::output::stats::StatsSnapshot;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A page accepted by the result funnel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    /// The page URL, exactly as it was linked
    pub url: String,

    /// Page title (empty if the page has none)
    pub title: String,
}

/// A failed fetch accepted by the result funnel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    /// The URL that failed
    pub url: String,

    /// Error message
    pub message: String,
}

/// Everything known about a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Seed URL the run started from
    pub seed: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Why the run ended
    pub stop_reason: StopReason,

    /// Depth bound in effect when the run ended
    pub final_depth_bound: u32,

    /// Pages accepted by the funnel, in arrival order
    pub pages: Vec<CrawledPage>,

    /// Failures accepted by the funnel, in arrival order
    pub errors: Vec<FailedPage>,

    /// Engine counters at the end of the run
    pub stats: StatsSnapshot,
}

impl RunReport {
    /// Total number of results the funnel accepted
    pub fn total_results(&self) -> usize {
        self.pages.len() + self.errors.len()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_results();
        if total == 0 {
            return 0.0;
        }
        (self.pages.len() as f64 / total as f64) * 100.0
    }

    /// Returns true if the run stopped because a budget ran out
    pub fn budget_exhausted(&self) -> bool {
        matches!(
            self.stop_reason,
            StopReason::ResultBudget | StopReason::ErrorBudget
        )
    }
}

/// Trait for output handlers
///
/// The result funnel hands every accepted result to its output handler as
/// it arrives. Handler errors are logged and do not stop the run.
pub trait OutputHandler: Send {
    /// Records a successfully crawled page
    fn record_page(&mut self, page: &CrawledPage) -> OutputResult<()>;

    /// Records a failed fetch
    fn record_error(&mut self, error: &FailedPage) -> OutputResult<()>;
}

/// Writes each page as a `url<TAB>title` line to stdout
#[derive(Debug, Default)]
pub struct StdoutOutput;

impl OutputHandler for StdoutOutput {
    fn record_page(&mut self, page: &CrawledPage) -> OutputResult<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}\t{}", page.url, page.title)?;
        Ok(())
    }

    fn record_error(&mut self, _error: &FailedPage) -> OutputResult<()> {
        // Failures are reported through the log
        Ok(())
    }
}
