//! Site-Spider: a bounded, single-lane site crawler
//!
//! This crate walks a website from a seed URL, following only links that match a
//! restriction pattern, and records the HTTP status, MIME type and referrer of
//! every URL it visits. One probe and one page load are in flight at most, and
//! both are guarded by watchdog timeouts so a hung server never stalls a session.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Site-Spider sessions
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Restrict regex error for '{pattern}': {source}")]
    InvalidRestrictionPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[from] UrlError),

    #[error("Result sink unavailable: {0}")]
    SinkUnavailable(#[from] output::SinkError),

    #[error("No crawl session has been started")]
    NotStarted,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Per-URL failures; these are absorbed by the scheduler and never end a session
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Probe of {url} timed out after {after:?}")]
    ProbeTimeout { url: String, after: Duration },

    #[error("Page load of {url} timed out after {after:?}")]
    LoadTimeout { url: String, after: Duration },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid restriction pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Site-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    CrawlPolicy, CrawlState, HttpFetcher, PageFetcher, ProbeResult, Scheduler, StopHandle,
};
pub use output::ResultSink;
pub use crate::url::{default_restriction, normalize, Restriction};
