//! Crawl scheduler
//!
//! This module drives one spider session:
//! - Dequeuing URLs from the frontier in insertion order
//! - Probing each URL with a HEAD request under a watchdog
//! - Loading eligible pages under a second, independent watchdog
//! - Feeding admitted links back into the frontier
//! - Reporting every transition and every probed URL to the result sink
//!
//! Probes and loads run on spawned tasks and report back over a completion
//! channel. The driver races each completion against its watchdog and the
//! session's cancellation token; the slot generation decides which one wins.

use crate::crawler::fetcher::{LoadedPage, PageFetcher, ProbeResponse, ProbeResult};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::inflight::InFlight;
use crate::crawler::policy::CrawlPolicy;
use crate::output::{CrawlSummary, ResultSink};
use crate::url::{normalize, validate_seed};
use crate::{FetchError, Result, SpiderError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;

/// Default watchdog for a HEAD probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default watchdog for a page load
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Watchdog durations for the two stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub probe: Duration,
    pub load: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: DEFAULT_PROBE_TIMEOUT,
            load: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Not started, or stopped
    Idle,

    /// A HEAD probe is in flight
    Probing,

    /// A page load is in flight
    Loading,

    /// Links of a loaded page are being filtered into the frontier
    Extracting,

    /// The frontier ran dry
    Done,
}

/// Requests a stop from outside the task running the scheduler
///
/// Stopping is idempotent. A handle only affects the session that was current
/// when it was taken.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }
}

#[derive(Debug)]
enum Outcome {
    Probe(std::result::Result<ProbeResponse, FetchError>),
    Load(std::result::Result<LoadedPage, FetchError>),
}

#[derive(Debug)]
struct Completion {
    generation: u64,
    outcome: Outcome,
}

/// Everything one session owns; dropping it releases both slots
struct SessionState {
    frontier: Frontier,
    policy: CrawlPolicy,
    probe_slot: InFlight,
    page_slot: InFlight,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    cancel: CancellationToken,
    summary: CrawlSummary,
    started: Instant,
}

impl SessionState {
    fn new(seed: &str, policy: CrawlPolicy) -> Self {
        let mut frontier = Frontier::new();
        frontier.add_seed(seed);
        let (tx, rx) = unbounded_channel();

        Self {
            frontier,
            policy,
            probe_slot: InFlight::new(),
            page_slot: InFlight::new(),
            tx,
            rx,
            cancel: CancellationToken::new(),
            summary: CrawlSummary::new(),
            started: Instant::now(),
        }
    }

    fn finish(&mut self, completed: bool) -> CrawlSummary {
        self.summary.completed = completed;
        self.summary.duration = self.started.elapsed();
        self.summary.clone()
    }
}

/// How the driver loop ended
enum Flow {
    Complete,
    Stopped,
}

/// What the probe stage produced
enum Probed {
    /// A result arrived from the fetcher, successful or not
    Answered(ProbeResult),

    /// The probe was abandoned and recorded as timed out
    Abandoned,
}

/// What the load stage produced
enum Loaded {
    Page(LoadedPage),
    Abandoned,
}

/// Single-lane crawl scheduler
///
/// One probe and one page load are in flight at most. The scheduler owns all
/// session state; `start` creates it, `stop` tears it down.
///
/// # Example
///
/// ```no_run
/// use site_spider::config::UserAgentConfig;
/// use site_spider::crawler::{CrawlPolicy, HttpFetcher, Scheduler, Timeouts};
/// use site_spider::output::ChannelSink;
/// use std::sync::Arc;
///
/// # async fn example() -> site_spider::Result<()> {
/// let fetcher = HttpFetcher::new(&UserAgentConfig::default())?;
/// let (sink, _events) = ChannelSink::channel();
/// let mut scheduler = Scheduler::new(Arc::new(fetcher), Arc::new(sink), Timeouts::default());
///
/// let policy = CrawlPolicy::new(r"^https://example\.com/docs/")?;
/// scheduler.start("https://example.com/docs/", policy)?;
/// let summary = scheduler.run().await?;
/// println!("{} URLs recorded", summary.pages_recorded);
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    fetcher: Arc<dyn PageFetcher>,
    sink: Arc<dyn ResultSink>,
    timeouts: Timeouts,
    state: CrawlState,
    session: Option<SessionState>,
}

impl Scheduler {
    /// Creates an idle scheduler
    pub fn new(fetcher: Arc<dyn PageFetcher>, sink: Arc<dyn ResultSink>, timeouts: Timeouts) -> Self {
        Self {
            fetcher,
            sink,
            timeouts,
            state: CrawlState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Number of URLs still pending in the current session
    pub fn queue_depth(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.frontier.size())
    }

    /// Starts a new session from `seed`
    ///
    /// The seed is validated before anything changes; on error the previous
    /// session, if any, is left as it was. Otherwise any previous session is
    /// stopped and replaced.
    ///
    /// # Errors
    ///
    /// Returns `SpiderError::InvalidSeed` for a seed that is not an absolute
    /// HTTP(S) URL.
    pub fn start(&mut self, seed: &str, policy: CrawlPolicy) -> Result<()> {
        let seed = validate_seed(seed)?;

        self.stop();

        tracing::info!(
            "Starting spider session on {} (restrict to {})",
            seed,
            policy.restriction()
        );
        self.session = Some(SessionState::new(&seed, policy));
        Ok(())
    }

    /// Returns a handle that can stop the current session from another task
    ///
    /// Taken while no session exists, the handle is inert.
    pub fn stop_handle(&self) -> StopHandle {
        let token = match &self.session {
            Some(session) => session.cancel.clone(),
            None => CancellationToken::new(),
        };
        StopHandle { token }
    }

    /// Stops the current session
    ///
    /// Aborts any in-flight probe or page load, drops the frontier and returns
    /// to `Idle`. Calling it again, or without a session, does nothing more.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.cancel.cancel();
            session.probe_slot.release();
            session.page_slot.release();
            session.frontier.clear();
            tracing::info!("Spider session stopped");
        }
        self.state = CrawlState::Idle;
    }

    /// Drives the current session until the frontier is exhausted or a stop is requested
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The session ended; `completed` tells whether it ran dry
    /// * `Err(SpiderError::NotStarted)` - No session has been started
    /// * `Err(SpiderError::SinkUnavailable)` - The sink failed; the session was stopped
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        let Some(session) = self.session.as_mut() else {
            return Err(SpiderError::NotStarted);
        };

        let mut driver = Driver {
            fetcher: &self.fetcher,
            sink: self.sink.as_ref(),
            timeouts: self.timeouts,
            state: &mut self.state,
            session,
        };

        match driver.drive().await {
            Ok(Flow::Complete) => {
                let summary = match self.session.take() {
                    Some(mut session) => session.finish(true),
                    None => CrawlSummary::new(),
                };
                self.state = CrawlState::Done;
                tracing::info!(
                    "Spider session complete: {} URLs recorded, {} pages scanned",
                    summary.pages_recorded,
                    summary.pages_loaded
                );
                Ok(summary)
            }
            Ok(Flow::Stopped) => {
                let summary = match self.session.as_mut() {
                    Some(session) => session.finish(false),
                    None => CrawlSummary::new(),
                };
                self.stop();
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Spider session failed: {}", e);
                self.stop();
                Err(e)
            }
        }
    }
}

/// Borrowed view of a scheduler while `run` is executing
struct Driver<'a> {
    fetcher: &'a Arc<dyn PageFetcher>,
    sink: &'a dyn ResultSink,
    timeouts: Timeouts,
    state: &'a mut CrawlState,
    session: &'a mut SessionState,
}

impl Driver<'_> {
    async fn drive(&mut self) -> Result<Flow> {
        loop {
            if self.session.cancel.is_cancelled() {
                return Ok(Flow::Stopped);
            }

            self.status("Next page...")?;
            let Some(entry) = self.session.frontier.next() else {
                self.status("Complete")?;
                *self.state = CrawlState::Done;
                return Ok(Flow::Complete);
            };
            *self.state = CrawlState::Probing;

            let result = match self.probe(&entry).await? {
                Some(Probed::Answered(result)) => result,
                Some(Probed::Abandoned) => continue,
                None => return Ok(Flow::Stopped),
            };

            if !self.session.policy.eligible(&result) {
                tracing::debug!("Not loading {} ({})", result.url, result.status_label());
                self.status("Queueing page [1]...")?;
                continue;
            }

            let page = match self.load(&entry.url).await? {
                Some(Loaded::Page(page)) => page,
                Some(Loaded::Abandoned) => continue,
                None => return Ok(Flow::Stopped),
            };

            self.extract(page)?;
        }
    }

    /// Runs the probe stage for one URL and records its result
    ///
    /// Returns `None` if the session was stopped while waiting.
    async fn probe(&mut self, entry: &FrontierEntry) -> Result<Option<Probed>> {
        self.status(&format!("Prefetching {}", entry.url))?;

        let timeout = self.timeouts.probe;
        let generation = self.session.probe_slot.arm();
        let task = {
            let fetcher = Arc::clone(self.fetcher);
            let tx = self.session.tx.clone();
            let url = entry.url.clone();
            tokio::spawn(async move {
                let outcome = fetcher.probe(&url, timeout).await;
                let _ = tx.send(Completion {
                    generation,
                    outcome: Outcome::Probe(outcome),
                });
            })
        };
        self.session.probe_slot.attach(task.abort_handle());

        let deadline = tokio::time::Instant::now() + timeout;
        let cancel = self.session.cancel.clone();

        let outcome = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(None),

                Some(completion) = self.session.rx.recv() => {
                    let Completion { generation: tag, outcome } = completion;
                    match outcome {
                        Outcome::Probe(outcome) => {
                            if self.session.probe_slot.settle(tag).is_some() {
                                break Some(outcome);
                            }
                            tracing::debug!("Ignoring stale probe (generation {})", tag);
                        }
                        Outcome::Load(_) => {
                            tracing::debug!("Ignoring stale page load (generation {})", tag);
                        }
                    }
                }

                _ = sleep_until(deadline) => {
                    if let Some(handle) = self.session.probe_slot.settle(generation) {
                        handle.abort();
                    }
                    break None;
                }
            }
        };

        match outcome {
            Some(Ok(response)) => {
                let result = ProbeResult::answered(&entry.url, &entry.referrer, response);
                self.prefetched(&result)?;
                Ok(Some(Probed::Answered(result)))
            }
            Some(Err(FetchError::ProbeTimeout { .. })) | None => {
                tracing::warn!("Probe of {} timed out after {:?}", entry.url, timeout);
                self.session.summary.probe_timeouts += 1;
                self.status("Aborting HTTP Request")?;
                self.record(&ProbeResult::timed_out(&entry.url, &entry.referrer))?;
                Ok(Some(Probed::Abandoned))
            }
            Some(Err(e)) => {
                tracing::warn!("Probe failed: {}", e);
                self.session.summary.probe_failures += 1;
                let result = ProbeResult::unreachable(&entry.url, &entry.referrer);
                self.prefetched(&result)?;
                Ok(Some(Probed::Answered(result)))
            }
        }
    }

    /// Runs the load stage for one eligible URL
    ///
    /// Returns `None` if the session was stopped while waiting.
    async fn load(&mut self, url: &str) -> Result<Option<Loaded>> {
        self.status(&format!("Fetching {}", url))?;
        *self.state = CrawlState::Loading;

        let timeout = self.timeouts.load;
        let generation = self.session.page_slot.arm();
        let task = {
            let fetcher = Arc::clone(self.fetcher);
            let tx = self.session.tx.clone();
            let url = url.to_string();
            tokio::spawn(async move {
                let outcome = fetcher.load(&url, timeout).await;
                let _ = tx.send(Completion {
                    generation,
                    outcome: Outcome::Load(outcome),
                });
            })
        };
        self.session.page_slot.attach(task.abort_handle());
        self.status(&format!("Spidering {}", url))?;

        let deadline = tokio::time::Instant::now() + timeout;
        let cancel = self.session.cancel.clone();

        let outcome = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(None),

                Some(completion) = self.session.rx.recv() => {
                    let Completion { generation: tag, outcome } = completion;
                    match outcome {
                        Outcome::Load(outcome) => {
                            if let Some(handle) = self.session.page_slot.settle(tag) {
                                handle.abort();
                                break Some(outcome);
                            }
                            tracing::debug!("Ignoring stale page load (generation {})", tag);
                        }
                        Outcome::Probe(_) => {
                            tracing::debug!("Ignoring stale probe (generation {})", tag);
                        }
                    }
                }

                _ = sleep_until(deadline) => {
                    if let Some(handle) = self.session.page_slot.settle(generation) {
                        handle.abort();
                    }
                    break None;
                }
            }
        };

        match outcome {
            Some(Ok(page)) => Ok(Some(Loaded::Page(page))),
            Some(Err(FetchError::LoadTimeout { .. })) | None => {
                tracing::warn!("Page load of {} timed out after {:?}", url, timeout);
                self.session.summary.load_timeouts += 1;
                self.status("Aborting New Tab")?;
                Ok(Some(Loaded::Abandoned))
            }
            Some(Err(e)) => {
                tracing::warn!("Page load failed: {}", e);
                self.session.summary.load_failures += 1;
                self.status("Aborting New Tab")?;
                Ok(Some(Loaded::Abandoned))
            }
        }
    }

    /// Filters a loaded page's links into the frontier
    fn extract(&mut self, page: LoadedPage) -> Result<()> {
        *self.state = CrawlState::Extracting;

        let current_url = normalize(&page.final_url).to_string();
        self.status(&format!("Scanning {}", current_url))?;

        let mut links = page.nav_links;
        if self.session.policy.check_inline() {
            links.extend(page.inline_links);
        }

        // a redirect target counts as visited
        self.session.frontier.mark_done_alias(&current_url);

        let mut queued = 0;
        for link in &links {
            let link = normalize(link);
            if !self.session.policy.admit(link, &current_url) {
                tracing::trace!("Not admitting {}", link);
                continue;
            }
            if self.session.frontier.offer(link, &current_url) {
                tracing::trace!("Queued {}", link);
                queued += 1;
            }
        }

        tracing::debug!(
            "Scanned {}: {} links, {} queued",
            current_url,
            links.len(),
            queued
        );
        self.session.summary.pages_loaded += 1;
        self.session.summary.links_queued += queued;

        self.status("Queueing page [2]...")
    }

    fn prefetched(&mut self, result: &ProbeResult) -> Result<()> {
        let code = result
            .status_code
            .map_or_else(|| "0".to_string(), |c| c.to_string());
        self.status(&format!(
            "Prefetched {} ({} {})",
            result.url, code, result.mime_type
        ))?;
        self.record(result)
    }

    fn record(&mut self, result: &ProbeResult) -> Result<()> {
        tracing::debug!(
            "Recorded {} {} {}",
            result.url,
            result.status_label(),
            result.mime_type
        );
        self.sink.on_page_result(result)?;
        self.session.summary.pages_recorded += 1;
        Ok(())
    }

    fn status(&self, message: &str) -> Result<()> {
        self.sink.on_status(message, self.session.frontier.size())?;
        Ok(())
    }
}
