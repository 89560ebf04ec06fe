//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ScanOutcome` / `RejectReason`: how a single scan attempt ended
//! - `VisitedSet`: URLs fetched (or being fetched) during the run

mod scan_state;
mod visited;

// Re-export main types
pub use scan_state::{RejectReason, ScanOutcome};
pub use visited::VisitedSet;
