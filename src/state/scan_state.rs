//! Scan attempt outcomes
//!
//! Every call to `Crawler::scan` ends in exactly one of these outcomes.
//! An attempt either stops at one of the guards, or reaches the fetch step
//! and produces a result for the result stream.

use std::fmt;

/// Why a scan attempt was turned away before fetching
///
/// Rejections are silent: they never reach the result stream and never count
/// against the error budget. They are tracked separately so that a run can
/// tell a cancelled crawl apart from one that simply ran out of depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// `depth >= depth bound` at the time of the check
    Depth,

    /// URL does not start with `http://` or `https://`
    Scheme,

    /// URL was already visited or is being fetched by another task
    Duplicate,

    /// The run was cancelled before the fetch started
    Cancelled,
}

impl RejectReason {
    /// Short machine-friendly name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depth => "depth_exhausted",
            Self::Scheme => "invalid_scheme",
            Self::Duplicate => "duplicate",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all rejection reasons in guard order
    pub fn all() -> [Self; 4] {
        [Self::Depth, Self::Scheme, Self::Duplicate, Self::Cancelled]
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome of one scan attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Stopped at a guard; nothing was fetched
    Rejected(RejectReason),

    /// The fetch failed and a failure result was reported
    Failed,

    /// The fetch succeeded, the page was reported, and one child scan was
    /// dispatched per outgoing link
    Expanded {
        /// Number of child scans dispatched
        children: usize,
    },

    /// A result was produced but the run shut down before the funnel took it
    Dropped,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "rejected ({})", reason),
            Self::Failed => write!(f, "failed"),
            Self::Expanded { children } => write!(f, "expanded into {} scans", children),
            Self::Dropped => write!(f, "dropped"),
        }
    }
}
