//! Run controller - wires the engine, the funnel, deadlines and signals
//!
//! A run starts the root scan and the result funnel side by side, then waits
//! for whichever comes first: the funnel finishing (budget exhausted or no
//! scans left), the run deadline, or an interrupt. Depth increases arrive on
//! the same control channel and never restart anything.

use crate::config::Config;
use crate::crawler::engine::Crawler;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::funnel::{FunnelOutcome, ResultFunnel};
use crate::output::{OutputHandler, RunReport};
use crate::Result;
use chrono::Utc;
use std::fmt;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How much one depth signal raises the depth bound
pub const DEPTH_SIGNAL_INCREMENT: u32 = 2;

/// External requests delivered to a running crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Raise the depth bound by [`DEPTH_SIGNAL_INCREMENT`]
    IncreaseDepth,

    /// Cancel the run
    Interrupt,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The result budget was used up
    ResultBudget,

    /// The error budget was used up
    ErrorBudget,

    /// Every scan finished before any budget ran out
    Exhausted,

    /// The run deadline passed
    Deadline,

    /// An interrupt was received
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ResultBudget => "result budget exhausted",
            Self::ErrorBudget => "error budget exhausted",
            Self::Exhausted => "crawl exhausted",
            Self::Deadline => "run deadline reached",
            Self::Interrupted => "interrupted",
        };
        write!(f, "{}", text)
    }
}

/// Forwards process signals into a control channel
///
/// On Unix, `SIGUSR1` becomes [`ControlSignal::IncreaseDepth`] and `SIGINT`
/// becomes [`ControlSignal::Interrupt`]. Elsewhere only Ctrl-C is handled.
/// The listener stops once the receiving side is dropped.
#[cfg(unix)]
pub fn spawn_signal_listener(
    tx: mpsc::UnboundedSender<ControlSignal>,
) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(tokio::spawn(async move {
        loop {
            let control = tokio::select! {
                Some(()) = sigusr1.recv() => ControlSignal::IncreaseDepth,
                Some(()) = sigint.recv() => ControlSignal::Interrupt,
                else => break,
            };
            if tx.send(control).is_err() {
                break;
            }
        }
    }))
}

/// Forwards process signals into a control channel
#[cfg(not(unix))]
pub fn spawn_signal_listener(
    tx: mpsc::UnboundedSender<ControlSignal>,
) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(ControlSignal::Interrupt).is_err() {
                break;
            }
        }
    }))
}

/// Runs a complete crawl, listening for process signals
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Install the signal listener
/// 2. Start the root scan at depth 0 and the result funnel
/// 3. Wait for a budget, the deadline, an interrupt, or the crawl to run dry
/// 4. Cancel the run and collect the report
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `fetcher` - Source of parsed pages
/// * `output` - Optional handler that sees each accepted result as it arrives
pub async fn run_crawl<F: Fetcher>(
    config: &Config,
    fetcher: F,
    output: Option<Box<dyn OutputHandler>>,
) -> Result<RunReport> {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = spawn_signal_listener(tx)?;

    let report = run_crawl_with_control(config, fetcher, output, rx).await;
    listener.abort();
    report
}

/// Runs a complete crawl, taking external requests from `control`
///
/// The same as [`run_crawl`] without touching process signals.
pub async fn run_crawl_with_control<F: Fetcher>(
    config: &Config,
    fetcher: F,
    output: Option<Box<dyn OutputHandler>>,
    mut control: mpsc::UnboundedReceiver<ControlSignal>,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let start_time = Instant::now();
    let seed = config.crawler.url.clone();

    tracing::info!(
        "Starting crawl of {} (max depth {}, max results {}, max errors {})",
        seed,
        config.crawler.max_depth,
        config.crawler.max_results,
        config.crawler.max_errors
    );

    let cancel = CancellationToken::new();
    let (crawler, stream) = Crawler::new(fetcher, config.crawler.max_depth, cancel.clone());
    let depth_bound = crawler.depth_bound();
    let stats = crawler.stats();

    let mut funnel = ResultFunnel::new(
        stream,
        config.crawler.max_results,
        config.crawler.max_errors,
    );
    if let Some(output) = output {
        funnel = funnel.with_output(output);
    }
    let mut funnel_task = tokio::spawn(funnel.run(cancel.clone()));

    // The root task holds the only handle; the stream ends with the last scan
    tokio::spawn(crawler.scan(seed.clone(), 0));
    drop(crawler);

    let deadline = tokio::time::sleep(config.timeouts.app());
    tokio::pin!(deadline);

    let mut stop: Option<StopReason> = None;
    let mut control_open = true;

    let funnel_report = loop {
        tokio::select! {
            joined = &mut funnel_task => break joined?,
            _ = &mut deadline, if stop.is_none() => {
                tracing::info!(
                    "Run deadline of {}s reached, shutting down",
                    config.timeouts.app_timeout
                );
                stop = Some(StopReason::Deadline);
                cancel.cancel();
            }
            signal = control.recv(), if control_open => match signal {
                Some(ControlSignal::IncreaseDepth) => {
                    let new_depth = depth_bound.increase(DEPTH_SIGNAL_INCREMENT);
                    tracing::info!("Depth signal received, new max depth: {}", new_depth);
                }
                Some(ControlSignal::Interrupt) => {
                    tracing::info!("Interrupt received, shutting down");
                    stop.get_or_insert(StopReason::Interrupted);
                    cancel.cancel();
                }
                None => control_open = false,
            },
        }
    };

    if funnel_report.outcome.triggered_cancel() {
        tracing::debug!("Result funnel cancelled the run: {}", funnel_report.outcome);
    } else {
        tracing::debug!("Result funnel stopped: {}", funnel_report.outcome);
    }

    // Terminal for the run whatever ended it
    cancel.cancel();

    let stop_reason = match funnel_report.outcome {
        FunnelOutcome::ResultsExhausted => StopReason::ResultBudget,
        FunnelOutcome::ErrorsExhausted => StopReason::ErrorBudget,
        FunnelOutcome::Drained => StopReason::Exhausted,
        FunnelOutcome::Cancelled => stop.unwrap_or(StopReason::Interrupted),
    };

    match stop_reason {
        StopReason::ErrorBudget => tracing::warn!("Crawl stopped: {}", stop_reason),
        _ => tracing::info!("Crawl stopped: {}", stop_reason),
    }

    Ok(RunReport {
        seed,
        started_at,
        finished_at: Utc::now(),
        elapsed: start_time.elapsed(),
        stop_reason,
        final_depth_bound: depth_bound.get(),
        pages: funnel_report.pages,
        errors: funnel_report.errors,
        stats: stats.snapshot(),
    })
}
