//! Visited-set bookkeeping for a single crawl run

use std::collections::HashSet;

/// URLs seen during a crawl run
///
/// `visited` holds every URL whose fetch succeeded; entries are never removed.
/// `pending` holds URLs currently being fetched. A claim in `pending` keeps two
/// tasks that discover the same link at the same moment from both fetching it.
/// A failed fetch releases its claim without marking the URL visited, so the
/// URL can be tried again if another page links to it later.
///
/// This type does no locking itself; the crawler keeps it behind a
/// reader/writer lock.
#[derive(Debug, Default)]
pub struct VisitedSet {
    visited: HashSet<String>,
    pending: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL was visited or is being fetched
    pub fn contains(&self, url: &str) -> bool {
        self.visited.contains(url) || self.pending.contains(url)
    }

    /// Claims the URL for fetching
    ///
    /// Returns false if the URL is already visited or claimed.
    pub fn try_claim(&mut self, url: &str) -> bool {
        if self.contains(url) {
            return false;
        }
        self.pending.insert(url.to_string())
    }

    /// Moves a claimed URL into the visited set
    pub fn mark_visited(&mut self, url: &str) {
        self.pending.remove(url);
        self.visited.insert(url.to_string());
    }

    /// Drops a claim after a failed fetch
    pub fn release(&mut self, url: &str) {
        self.pending.remove(url);
    }
}
