//! Crawl engine - recursive fan-out scanning
//!
//! Every scan attempt runs the same guard sequence (depth, scheme, duplicate,
//! cancellation), fetches the page, reports the outcome on the result stream,
//! and spawns one independent task per outgoing link. There is no queue and no
//! worker pool: the visited set is the only dedup oracle.

use crate::crawler::fetcher::Fetcher;
use crate::output::CrawlStats;
use crate::state::{RejectReason, ScanOutcome, VisitedSet};
use crate::url::has_crawlable_scheme;
use crate::FetchError;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Capacity of the result channel
///
/// One slot is the smallest bounded channel tokio offers; a producer waits
/// until the funnel has taken the previous result.
pub const RESULT_CHANNEL_CAPACITY: usize = 1;

/// Future returned by [`Crawler::scan`]
pub type ScanFuture = Pin<Box<dyn Future<Output = ScanOutcome> + Send + 'static>>;

/// One item on the result stream
#[derive(Debug)]
pub enum CrawlResult {
    /// The page was fetched and parsed
    Page { url: String, title: String },

    /// The fetch failed
    Failed { url: String, error: FetchError },
}

impl CrawlResult {
    /// The URL this result is about
    pub fn url(&self) -> &str {
        match self {
            Self::Page { url, .. } | Self::Failed { url, .. } => url,
        }
    }
}

/// Receiving end of a crawler's result stream
///
/// There is exactly one per crawler, so there is exactly one consumer. The
/// stream ends once every scan task has finished.
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::Receiver<CrawlResult>,
}

impl ResultStream {
    /// Receives the next result, or `None` once no scan task remains
    pub async fn recv(&mut self) -> Option<CrawlResult> {
        self.rx.recv().await
    }
}

/// Shared, live-adjustable depth bound
///
/// Reads and increases are single atomic operations, so raising the bound
/// never waits on in-flight scans. The bound only ever grows.
#[derive(Debug, Clone)]
pub struct DepthBound(Arc<AtomicU32>);

impl DepthBound {
    /// Creates a bound with the given initial value
    pub fn new(max_depth: u32) -> Self {
        Self(Arc::new(AtomicU32::new(max_depth)))
    }

    /// Current value of the bound
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    /// Raises the bound by `delta` and returns the new value
    pub fn increase(&self, delta: u32) -> u32 {
        let previous = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(delta))
            })
            .unwrap_or_else(|current| current);
        previous.saturating_add(delta)
    }
}

struct Shared<F> {
    fetcher: F,
    visited: RwLock<VisitedSet>,
    depth_bound: DepthBound,
    results: mpsc::Sender<CrawlResult>,
    cancel: CancellationToken,
    stats: Arc<CrawlStats>,
}

/// The crawl engine
///
/// Cloning a `Crawler` is cheap and every clone shares the same visited set,
/// depth bound, and result stream. Each scan task owns a clone, which is what
/// keeps the result stream open; once the caller's handle and every task are
/// gone, the stream ends.
pub struct Crawler<F> {
    shared: Arc<Shared<F>>,
}

impl<F> Clone for Crawler<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: Fetcher> Crawler<F> {
    /// Creates a crawler and the single result stream it reports to
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of parsed pages
    /// * `max_depth` - Initial depth bound
    /// * `cancel` - Run-scoped cancellation token, checked before each fetch
    pub fn new(fetcher: F, max_depth: u32, cancel: CancellationToken) -> (Self, ResultStream) {
        let (tx, rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);

        let crawler = Self {
            shared: Arc::new(Shared {
                fetcher,
                visited: RwLock::new(VisitedSet::new()),
                depth_bound: DepthBound::new(max_depth),
                results: tx,
                cancel,
                stats: Arc::new(CrawlStats::new()),
            }),
        };

        (crawler, ResultStream { rx })
    }

    /// Handle to the live depth bound
    pub fn depth_bound(&self) -> DepthBound {
        self.shared.depth_bound.clone()
    }

    /// Raises the depth bound by `delta`; returns the new bound
    ///
    /// Takes effect for every guard check that runs afterwards, including
    /// checks in scans that are already in flight.
    pub fn inc_max_depth(&self, delta: u32) -> u32 {
        let new_depth = self.shared.depth_bound.increase(delta);
        tracing::debug!("New max depth: {}", new_depth);
        new_depth
    }

    /// Counters for this crawler's scan attempts
    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.shared.stats)
    }

    /// Attempts to visit `url` at recursion depth `depth`
    ///
    /// The returned future resolves once this attempt is done: rejected,
    /// failed, or reported and expanded. Child scans are spawned onto the
    /// runtime and not awaited.
    ///
    /// # Guards
    ///
    /// Checked in order; a failing guard ends the attempt silently.
    ///
    /// 1. `depth` below the current depth bound
    /// 2. `url` starts with `http://` or `https://`
    /// 3. `url` not visited and not being fetched
    /// 4. run not cancelled
    pub fn scan(&self, url: impl Into<String>, depth: u32) -> ScanFuture {
        let crawler = self.clone();
        let url = url.into();
        Box::pin(async move {
            let outcome = crawler.attempt(url.clone(), depth).await;
            tracing::trace!("Scan of {} at depth {}: {}", url, depth, outcome);
            outcome
        })
    }

    async fn attempt(&self, url: String, depth: u32) -> ScanOutcome {
        let shared = &self.shared;
        shared.stats.record_attempt();

        let max_depth = shared.depth_bound.get();
        if depth >= max_depth {
            tracing::debug!("Actual depth: {}, max depth: {}", depth, max_depth);
            return self.reject(RejectReason::Depth);
        }

        if !has_crawlable_scheme(&url) {
            tracing::warn!("{} is not a valid link", url);
            return self.reject(RejectReason::Scheme);
        }

        let seen = shared.visited.read().await.contains(&url);
        if seen {
            tracing::debug!("URL {} is already visited", url);
            return self.reject(RejectReason::Duplicate);
        }

        if shared.cancel.is_cancelled() {
            tracing::debug!("Run cancelled, not scanning {}", url);
            return self.reject(RejectReason::Cancelled);
        }

        // Another task may have claimed the URL since the read check
        let claimed = shared.visited.write().await.try_claim(&url);
        if !claimed {
            tracing::debug!("URL {} was claimed by another scan", url);
            return self.reject(RejectReason::Duplicate);
        }

        match shared.fetcher.get(&shared.cancel, &url).await {
            Err(error) => {
                shared.visited.write().await.release(&url);
                shared.stats.record_failed();
                tracing::error!("Error fetching {}: {}", url, error);

                if self.emit(CrawlResult::Failed { url, error }).await {
                    ScanOutcome::Failed
                } else {
                    ScanOutcome::Dropped
                }
            }
            Ok(document) => {
                shared.visited.write().await.mark_visited(&url);
                tracing::debug!("URL {} moved to visited", url);
                shared.stats.record_fetched();

                let title = document.title(&shared.cancel);
                let links = document.links(&shared.cancel);
                drop(document);

                if !self
                    .emit(CrawlResult::Page {
                        url: url.clone(),
                        title,
                    })
                    .await
                {
                    return ScanOutcome::Dropped;
                }

                let children = links.len();
                for link in links {
                    tracing::debug!("Dispatching scan of {} at depth {}", link, depth + 1);
                    tokio::spawn(self.scan(link, depth + 1));
                }
                shared.stats.record_dispatched(children);

                ScanOutcome::Expanded { children }
            }
        }
    }

    fn reject(&self, reason: RejectReason) -> ScanOutcome {
        self.shared.stats.record_rejection(reason);
        ScanOutcome::Rejected(reason)
    }

    /// Hands a result to the funnel
    ///
    /// Races the send against cancellation, so a task never waits on a funnel
    /// that has stopped reading. Returns false if the result was dropped.
    ///
    /// A successful send means the result is in the channel's single slot,
    /// not that the funnel has received it. If the funnel stops first, that
    /// buffered result is discarded with the channel and never counted.
    async fn emit(&self, result: CrawlResult) -> bool {
        let shared = &self.shared;
        let url = result.url().to_string();

        let delivered = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => false,
            sent = shared.results.send(result) => sent.is_ok(),
        };

        if delivered {
            tracing::trace!("Sent result for {}", url);
        } else {
            tracing::debug!("Run shutting down, dropping result for {}", url);
            shared.stats.record_dropped();
        }
        delivered
    }
}
