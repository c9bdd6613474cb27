//! Crawler module for probing, loading and scheduling pages
//!
//! This module contains the core spidering logic, including:
//! - The frontier of pending and visited URLs
//! - The crawl policy deciding what is loaded and what is queued
//! - HTTP probing and page loading behind the `PageFetcher` trait
//! - HTML link extraction
//! - The scheduler that drives a session under watchdog timeouts

mod fetcher;
mod frontier;
mod inflight;
mod parser;
mod policy;
mod scheduler;

pub use fetcher::{
    build_http_client, mime_essence, user_agent_string, HttpFetcher, LoadedPage, PageFetcher,
    ProbeResponse, ProbeResult, MISSING_MIME, TIMED_OUT_MIME,
};
pub use frontier::{Frontier, FrontierEntry, ROOT_REFERRER};
pub use inflight::InFlight;
pub use parser::{extract_links, PageLinks};
pub use policy::{mime_allowed, CrawlPolicy, SPIDER_MIME};
pub use scheduler::{
    CrawlState, Scheduler, StopHandle, Timeouts, DEFAULT_LOAD_TIMEOUT, DEFAULT_PROBE_TIMEOUT,
};
