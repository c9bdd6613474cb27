use crate::crawler::Timeouts;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Site-Spider
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spider: SpiderConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Watchdog configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpiderConfig {
    /// Seconds to wait for a HEAD probe before recording it as unable to load
    #[serde(rename = "probe-timeout-secs")]
    pub probe_timeout_secs: u64,

    /// Seconds to wait for a page load before abandoning its links
    #[serde(rename = "load-timeout-secs")]
    pub load_timeout_secs: u64,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 30,
            load_timeout_secs: 30,
        }
    }
}

impl SpiderConfig {
    /// The configured watchdog durations
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            probe: Duration::from_secs(self.probe_timeout_secs),
            load: Duration::from_secs(self.load_timeout_secs),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteSpider".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Crawl policy configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Regex a URL must match to be crawled; defaults to the seed's directory
    pub restriction: Option<String>,

    /// Follow off-pattern links found on on-pattern pages
    #[serde(rename = "allow-plus-one")]
    pub allow_plus_one: bool,

    /// Follow links with a query string
    #[serde(rename = "allow-arguments")]
    pub allow_arguments: bool,

    /// Also check images, scripts, stylesheets and frames
    #[serde(rename = "check-inline")]
    pub check_inline: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown report written when a session ends
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,
}
