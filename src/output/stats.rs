//! Statistics over recorded crawl results
//!
//! Results are grouped by status class the way the results table colours them:
//! class `0` for URLs that never produced a status, `1`-`5` for the hundreds
//! digit of the HTTP status code.

use crate::crawler::ProbeResult;
use crate::output::traits::CrawlSummary;
use std::collections::BTreeMap;

/// Crawl result statistics
#[derive(Debug, Clone, Default)]
pub struct ResultStatistics {
    /// Total number of recorded URLs
    pub total: u64,

    /// Count of results by status class
    pub by_class: BTreeMap<u16, u64>,
}

impl ResultStatistics {
    /// Tallies a slice of recorded results
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut stats = Self::default();
        for result in results {
            stats.add(result);
        }
        stats
    }

    /// Adds one result to the tally
    pub fn add(&mut self, result: &ProbeResult) {
        self.total += 1;
        *self.by_class.entry(result.status_class()).or_insert(0) += 1;
    }

    /// Number of results in the given status class
    pub fn count(&self, class: u16) -> u64 {
        self.by_class.get(&class).copied().unwrap_or(0)
    }

    /// Number of URLs recorded without an HTTP status
    pub fn unable_to_load(&self) -> u64 {
        self.count(0)
    }
}

/// Human readable label for a status class
pub fn class_label(class: u16) -> &'static str {
    match class {
        0 => "Unable to load",
        1 => "1xx Informational",
        2 => "2xx Success",
        3 => "3xx Redirection",
        4 => "4xx Client error",
        5 => "5xx Server error",
        _ => "Other",
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - Tally of the recorded results
/// * `summary` - Counters reported by the scheduler
pub fn print_statistics(stats: &ResultStatistics, summary: &CrawlSummary) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs recorded: {}", stats.total);
    println!("  Pages scanned for links: {}", summary.pages_loaded);
    println!("  Links queued: {}", summary.links_queued);
    println!(
        "  Duration: {:.1}s ({})",
        summary.duration.as_secs_f64(),
        if summary.completed { "complete" } else { "stopped" }
    );
    println!();

    println!("Results by Status:");
    for (class, count) in &stats.by_class {
        let percentage = if stats.total > 0 {
            (*count as f64 / stats.total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", class_label(*class), count, percentage);
    }
    println!();

    if summary.probe_timeouts + summary.load_timeouts + summary.load_failures > 0 {
        println!("Watchdog:");
        println!("  Probe timeouts: {}", summary.probe_timeouts);
        println!("  Page load timeouts: {}", summary.load_timeouts);
        println!("  Page load failures: {}", summary.load_failures);
        println!();
    }
}
