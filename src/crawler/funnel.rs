//! Result funnel - the single consumer of the result stream
//!
//! The funnel counts results against the run's budgets and turns the first
//! exhausted budget into run-wide cancellation.

use crate::crawler::engine::{CrawlResult, ResultStream};
use crate::output::{CrawledPage, FailedPage, OutputHandler};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Why the funnel stopped consuming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunnelOutcome {
    /// `max_results` successes were consumed; the funnel cancelled the run
    ResultsExhausted,

    /// `max_errors` failures were consumed; the funnel cancelled the run
    ErrorsExhausted,

    /// The run was cancelled from outside (deadline or interrupt)
    Cancelled,

    /// The stream ended because no scan task is left
    Drained,
}

impl FunnelOutcome {
    /// Returns true if the funnel itself triggered cancellation
    pub fn triggered_cancel(&self) -> bool {
        matches!(self, Self::ResultsExhausted | Self::ErrorsExhausted)
    }
}

impl fmt::Display for FunnelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ResultsExhausted => "result budget exhausted",
            Self::ErrorsExhausted => "error budget exhausted",
            Self::Cancelled => "cancelled",
            Self::Drained => "no scans left",
        };
        write!(f, "{}", text)
    }
}

/// What the funnel consumed before it stopped
#[derive(Debug, Clone)]
pub struct FunnelReport {
    pub outcome: FunnelOutcome,

    /// Accepted pages, in arrival order
    pub pages: Vec<CrawledPage>,

    /// Accepted failures, in arrival order
    pub errors: Vec<FailedPage>,
}

/// Consumes a crawler's result stream under a result and an error budget
pub struct ResultFunnel {
    stream: ResultStream,
    remaining_results: i64,
    remaining_errors: i64,
    output: Option<Box<dyn OutputHandler>>,
}

impl ResultFunnel {
    /// Creates a funnel over `stream`
    ///
    /// # Arguments
    ///
    /// * `stream` - The crawler's result stream
    /// * `max_results` - Successes accepted before the run is cancelled
    /// * `max_errors` - Failures accepted before the run is cancelled
    pub fn new(stream: ResultStream, max_results: u32, max_errors: u32) -> Self {
        Self {
            stream,
            remaining_results: i64::from(max_results),
            remaining_errors: i64::from(max_errors),
            output: None,
        }
    }

    /// Streams every accepted result to `output` as it arrives
    pub fn with_output(mut self, output: Box<dyn OutputHandler>) -> Self {
        self.output = Some(output);
        self
    }

    /// Consumes results until a budget runs out, the run is cancelled, or the
    /// stream ends
    ///
    /// When a budget runs out the funnel cancels `cancel` once and stops
    /// reading immediately. The stream is dropped on return, so scan tasks
    /// still trying to report fail fast instead of waiting.
    pub async fn run(mut self, cancel: CancellationToken) -> FunnelReport {
        let mut pages = Vec::new();
        let mut errors = Vec::new();

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Run cancelled, result funnel stopping");
                    break FunnelOutcome::Cancelled;
                }
                next = self.stream.recv() => next,
            };

            match next {
                None => {
                    tracing::info!("All scans finished, result stream closed");
                    break FunnelOutcome::Drained;
                }
                Some(CrawlResult::Failed { url, error }) => {
                    self.remaining_errors -= 1;
                    tracing::error!("Crawler result returned error: {}", error);

                    let failed = FailedPage {
                        url,
                        message: error.to_string(),
                    };
                    if let Some(output) = self.output.as_mut() {
                        if let Err(e) = output.record_error(&failed) {
                            tracing::warn!("Failed to record error for {}: {}", failed.url, e);
                        }
                    }
                    errors.push(failed);

                    if self.remaining_errors <= 0 {
                        cancel.cancel();
                        tracing::warn!("Error limit reached, shutting down");
                        break FunnelOutcome::ErrorsExhausted;
                    }
                }
                Some(CrawlResult::Page { url, title }) => {
                    self.remaining_results -= 1;
                    tracing::info!("Crawler result: [url: {}] title: {}", url, title);

                    let page = CrawledPage { url, title };
                    if let Some(output) = self.output.as_mut() {
                        if let Err(e) = output.record_page(&page) {
                            tracing::warn!("Failed to record page {}: {}", page.url, e);
                        }
                    }
                    pages.push(page);

                    if self.remaining_results <= 0 {
                        cancel.cancel();
                        tracing::info!("Maximum number of results reached, shutting down");
                        break FunnelOutcome::ResultsExhausted;
                    }
                }
            }
        };

        FunnelReport {
            outcome,
            pages,
            errors,
        }
    }
}
