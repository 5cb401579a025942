//! Frontier management for the crawl engine
//!
//! The frontier is a FIFO queue of canonical URLs plus the visited set. It is
//! owned by the coordinator's dispatch loop, which is the only code that
//! mutates it; fetch workers never touch it.

use crate::url::CanonicalUrl;
use std::collections::{HashSet, VecDeque};

/// Breadth-first frontier with exactly-once dispatch
///
/// A URL moves from `queued` to `visited` in a single step when it is handed
/// out by [`Frontier::next_unvisited`], so the same URL can never be
/// dispatched twice.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs awaiting a fetch attempt, in discovery order
    queue: VecDeque<CanonicalUrl>,

    /// Members of `queue`
    queued: HashSet<CanonicalUrl>,

    /// URLs already dispatched (successfully fetched or not)
    visited: HashSet<CanonicalUrl>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn with_seed(seed: CanonicalUrl) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed);
        frontier
    }

    /// Appends a URL to the tail of the queue
    ///
    /// Returns false if the URL was already visited or is already waiting.
    pub fn push(&mut self, url: CanonicalUrl) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }

        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Appends every URL of a batch in order, returning how many were new
    pub fn extend<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = CanonicalUrl>,
    {
        urls.into_iter().filter(|url| self.push(url.clone())).count()
    }

    /// Dequeues the next URL and marks it visited
    ///
    /// Entries that are already visited are discarded on the way.
    pub fn next_unvisited(&mut self) -> Option<CanonicalUrl> {
        while let Some(url) = self.queue.pop_front() {
            self.queued.remove(&url);
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
        }
        None
    }

    /// Returns true if the URL has been dispatched
    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if no URL is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of dispatched URLs
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Distinct URLs seen so far (visited plus waiting)
    pub fn total_discovered(&self) -> usize {
        self.visited.len() + self.queued.len()
    }
}
