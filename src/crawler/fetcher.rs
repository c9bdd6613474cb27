//! Page fetching capability
//!
//! This module defines what the scheduler needs from the network:
//! - A metadata-only probe (HEAD) returning status and Content-Type
//! - A full page load (GET) returning the page's outbound and inline links
//!
//! `HttpFetcher` is the reqwest-backed implementation. The scheduler runs each
//! call on its own task and owns the watchdog; the per-request timeout passed in
//! here is a second line of defence at the same deadline.

use crate::config::UserAgentConfig;
use crate::crawler::parser::extract_links;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, Response, StatusCode};
use std::time::Duration;

/// Mime placeholder recorded when the probe was abandoned by the watchdog
pub const TIMED_OUT_MIME: &str = "[???]";

/// Mime placeholder recorded when the server sent no Content-Type
pub const MISSING_MIME: &str = "[none]";

/// Maximum redirect hops followed by a probe or a page load
const MAX_REDIRECTS: usize = 10;

/// The recorded outcome of probing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// The URL as it was taken from the frontier
    pub url: String,

    /// HTTP status code, `None` if the probe timed out or never reached a server
    pub status_code: Option<u16>,

    /// Raw Content-Type header value, or a bracketed placeholder
    pub mime_type: String,

    /// The page that linked here, or `[root page]` for the seed
    pub referrer: String,
}

impl ProbeResult {
    /// Builds the result for a probe that answered
    pub fn answered(url: &str, referrer: &str, response: ProbeResponse) -> Self {
        Self {
            url: url.to_string(),
            status_code: Some(response.status_code),
            mime_type: response.mime_type,
            referrer: referrer.to_string(),
        }
    }

    /// Builds the result for a probe abandoned by the watchdog
    pub fn timed_out(url: &str, referrer: &str) -> Self {
        Self {
            url: url.to_string(),
            status_code: None,
            mime_type: TIMED_OUT_MIME.to_string(),
            referrer: referrer.to_string(),
        }
    }

    /// Builds the result for a probe that failed before any response
    pub fn unreachable(url: &str, referrer: &str) -> Self {
        Self {
            url: url.to_string(),
            status_code: None,
            mime_type: MISSING_MIME.to_string(),
            referrer: referrer.to_string(),
        }
    }

    /// The MIME essence: the Content-Type up to any `;` parameters
    ///
    /// ```
    /// use site_spider::crawler::ProbeResult;
    ///
    /// let result = ProbeResult {
    ///     url: "http://example.com/".to_string(),
    ///     status_code: Some(200),
    ///     mime_type: "text/html; charset=utf-8".to_string(),
    ///     referrer: "[root page]".to_string(),
    /// };
    /// assert_eq!(result.mime_essence(), "text/html");
    /// ```
    pub fn mime_essence(&self) -> &str {
        mime_essence(&self.mime_type)
    }

    /// Status code with its reason phrase, or `Unable to load`
    pub fn status_label(&self) -> String {
        match self.status_code {
            Some(code) => match StatusCode::from_u16(code)
                .ok()
                .and_then(|status| status.canonical_reason())
            {
                Some(reason) => format!("{} {}", code, reason),
                None => code.to_string(),
            },
            None => "Unable to load".to_string(),
        }
    }

    /// Hundreds digit of the status code, `0` when there is none
    pub fn status_class(&self) -> u16 {
        self.status_code.map(|code| code / 100).unwrap_or(0)
    }
}

/// Returns the text of a Content-Type value before any `;`
pub fn mime_essence(mime: &str) -> &str {
    match mime.find(';') {
        Some(idx) => mime[..idx].trim_end(),
        None => mime,
    }
}

/// What a probe learns about a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code of the final response
    pub status_code: u16,

    /// Content-Type header value, or `[none]`
    pub mime_type: String,
}

/// Links extracted from a loaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedPage {
    /// The URL the page ended up at after redirects
    pub final_url: String,

    /// Navigational hyperlink targets, absolute
    pub nav_links: Vec<String>,

    /// Inline resource targets (images, scripts, stylesheets, frames), absolute
    pub inline_links: Vec<String>,
}

/// The network capability the scheduler depends on
///
/// Both calls may be abandoned at any await point: the scheduler aborts the task
/// running them when its watchdog fires or the session stops.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches headers only and reports status and Content-Type
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, FetchError>;

    /// Fetches the full page and extracts its links
    async fn load(&self, url: &str, timeout: Duration) -> Result<LoadedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use site_spider::config::UserAgentConfig;
/// use site_spider::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SiteSpider".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: Some("https://example.com/bot".to_string()),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the User-Agent header: `Name/Version` or `Name/Version (+ContactURL)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the user agent configuration
    ///
    /// # Errors
    ///
    /// Returns `SpiderError::Reqwest` if the HTTP client cannot be built.
    pub fn new(config: &UserAgentConfig) -> crate::Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, FetchError> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e, timeout, Stage::Probe))?;

        Ok(ProbeResponse {
            status_code: response.status().as_u16(),
            mime_type: content_type(&response).unwrap_or_else(|| MISSING_MIME.to_string()),
        })
    }

    async fn load(&self, url: &str, timeout: Duration) -> Result<LoadedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e, timeout, Stage::Load))?;

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e, timeout, Stage::Load))?;

        let links = extract_links(&body, &final_url);
        tracing::trace!(
            "Extracted {} nav and {} inline links from {}",
            links.nav.len(),
            links.inline.len(),
            final_url
        );

        Ok(LoadedPage {
            final_url: final_url.to_string(),
            nav_links: links.nav,
            inline_links: links.inline,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Probe,
    Load,
}

/// Maps a reqwest error to the per-URL failure it represents
fn classify_error(url: &str, error: reqwest::Error, timeout: Duration, stage: Stage) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        match stage {
            Stage::Probe => FetchError::ProbeTimeout {
                url,
                after: timeout,
            },
            Stage::Load => FetchError::LoadTimeout {
                url,
                after: timeout,
            },
        }
    } else {
        FetchError::Http { url, source: error }
    }
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
