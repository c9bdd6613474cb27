//! Output module for crawl results
//!
//! This module handles:
//! - The result sink interface the scheduler reports through
//! - A channel-backed sink for front ends running on their own task
//! - Markdown reports and result statistics

mod channel;
mod markdown;
pub mod stats;
mod traits;

pub use channel::{ChannelSink, SpiderEvent};
pub use markdown::{format_markdown_report, write_markdown_report, CrawlReport};
pub use stats::{print_statistics, ResultStatistics};
pub use traits::{CrawlSummary, ResultSink, SinkError, SinkResult};
