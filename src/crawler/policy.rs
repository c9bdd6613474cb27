//! Crawl policy: which probed pages get loaded and which links get queued

use crate::config::PolicyConfig;
use crate::crawler::fetcher::{mime_essence, ProbeResult};
use crate::url::{default_restriction, has_arguments, Restriction};
use crate::SpiderError;

/// MIME types whose pages are loaded and scanned for links
pub const SPIDER_MIME: &[&str] = &["text/html", "text/plain", "text/xml"];

/// Per-session crawl policy
///
/// Built once before a session starts and never changed while it runs.
#[derive(Debug, Clone)]
pub struct CrawlPolicy {
    restriction: Restriction,
    allow_plus_one: bool,
    allow_arguments: bool,
    check_inline: bool,
}

impl CrawlPolicy {
    /// Creates a policy with every option off
    ///
    /// # Errors
    ///
    /// Returns `SpiderError::InvalidRestrictionPattern` if the pattern does not compile.
    ///
    /// # Example
    ///
    /// ```
    /// use site_spider::crawler::CrawlPolicy;
    ///
    /// let policy = CrawlPolicy::new(r"^http://example\.com/a/")
    ///     .unwrap()
    ///     .with_plus_one(true);
    /// assert!(policy.admit("http://other.com/x", "http://example.com/a/"));
    /// assert!(CrawlPolicy::new("(").is_err());
    /// ```
    pub fn new(pattern: &str) -> Result<Self, SpiderError> {
        Ok(Self {
            restriction: Restriction::compile(pattern)?,
            allow_plus_one: false,
            allow_arguments: false,
            check_inline: false,
        })
    }

    /// Builds the policy for a seed from configuration
    ///
    /// Without an explicit restriction the seed's directory is used.
    pub fn from_config(config: &PolicyConfig, seed: &str) -> Result<Self, SpiderError> {
        let pattern = match &config.restriction {
            Some(pattern) => pattern.clone(),
            None => default_restriction(seed),
        };

        Ok(Self::new(&pattern)?
            .with_plus_one(config.allow_plus_one)
            .with_arguments(config.allow_arguments)
            .with_inline(config.check_inline))
    }

    /// Also follows off-pattern links found on on-pattern pages, one hop deep
    pub fn with_plus_one(mut self, allow: bool) -> Self {
        self.allow_plus_one = allow;
        self
    }

    /// Also queues links that carry a query string
    pub fn with_arguments(mut self, allow: bool) -> Self {
        self.allow_arguments = allow;
        self
    }

    /// Also queues inline resources (images, scripts, stylesheets, frames)
    pub fn with_inline(mut self, check: bool) -> Self {
        self.check_inline = check;
        self
    }

    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    pub fn allow_plus_one(&self) -> bool {
        self.allow_plus_one
    }

    pub fn allow_arguments(&self) -> bool {
        self.allow_arguments
    }

    pub fn check_inline(&self) -> bool {
        self.check_inline
    }

    /// Decides whether a probed URL is loaded and scanned for links
    ///
    /// Redirects within the restriction are always followed. Successful
    /// responses are followed only for text MIME types. A missing status
    /// (timeout or transport failure) is never followed.
    pub fn eligible(&self, result: &ProbeResult) -> bool {
        if !self.restriction.matches(&result.url) {
            return false;
        }

        match result.status_code {
            Some(code) if (300..400).contains(&code) => true,
            Some(code) if code < 300 => mime_allowed(&result.mime_type),
            _ => false,
        }
    }

    /// Decides whether a link found on `current_url` is queued
    ///
    /// `link` is expected to be normalized already.
    pub fn admit(&self, link: &str, current_url: &str) -> bool {
        if link.is_empty() {
            return false;
        }
        if !self.allow_arguments && has_arguments(link) {
            return false;
        }

        self.restriction.matches(link)
            || (self.allow_plus_one && self.restriction.matches(current_url))
    }
}

/// Returns true if the Content-Type names one of the crawlable text types
pub fn mime_allowed(mime: &str) -> bool {
    let essence = mime_essence(mime);
    SPIDER_MIME.iter().any(|allowed| essence.contains(allowed))
}
