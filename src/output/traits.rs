//! Result sink traits and types
//!
//! This module defines the interface the scheduler pushes results and status
//! lines through, and the summary it hands back when a session ends.

use crate::crawler::ProbeResult;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a result sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer behind the sink has gone away
    #[error("the result consumer has been closed")]
    Closed,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for result sinks
///
/// A sink receives one status line at every scheduler transition and exactly one
/// page result per URL taken from the frontier. A sink that can no longer deliver
/// must return an error; the scheduler then stops the session rather than
/// crawling on with nobody listening.
pub trait ResultSink: Send + Sync {
    /// Reports scheduler progress
    ///
    /// # Arguments
    ///
    /// * `message` - Human readable status line
    /// * `queue_depth` - Number of URLs still pending in the frontier
    fn on_status(&self, message: &str, queue_depth: usize) -> SinkResult<()>;

    /// Records the probe result for one URL
    fn on_page_result(&self, result: &ProbeResult) -> SinkResult<()>;
}

/// Counters for one crawl session
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// URLs recorded to the sink
    pub pages_recorded: u64,

    /// Pages loaded and scanned for links
    pub pages_loaded: u64,

    /// Probes abandoned by the watchdog
    pub probe_timeouts: u64,

    /// Probes that failed at the transport level
    pub probe_failures: u64,

    /// Page loads abandoned by the watchdog
    pub load_timeouts: u64,

    /// Page loads that failed at the transport level
    pub load_failures: u64,

    /// Links admitted into the frontier
    pub links_queued: u64,

    /// True if the frontier was exhausted, false if the session was stopped
    pub completed: bool,

    /// Wall-clock duration of the session
    pub duration: Duration,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }
}
