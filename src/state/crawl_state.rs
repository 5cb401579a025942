//! Crawl lifecycle state definitions
//!
//! A session starts in `Initializing`, moves to `Running` once the seed passed
//! the accessibility probe, and ends in exactly one terminal state.

use serde::Serialize;
use std::fmt;

/// Represents the current lifecycle state of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlState {
    // ===== Active States =====
    /// Session created, seed probe not finished yet
    Initializing,

    /// Seed accepted, the dispatch loop is running
    Running,

    // ===== Terminal States =====
    /// Frontier drained normally
    Completed,

    /// The dispatch loop itself failed (engine fault)
    Error,

    /// The seed failed validation or the accessibility probe
    Invalid,

    /// Cancelled through an external stop request
    Stopped,
}

impl CrawlState {
    /// Returns true if no further transition can happen from this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Initializing | Self::Running)
    }

    /// Returns true if this represents a successful finish
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }

    /// Checks whether moving from `self` to `next` is a legal lifecycle step
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        match (self, next) {
            (Self::Initializing, Self::Running) => true,
            (Self::Initializing, next) => next.is_terminal(),
            (Self::Running, next) => next.is_terminal(),
            _ => false,
        }
    }

    /// Returns the lowercase name used in logs and snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Invalid => "invalid",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
