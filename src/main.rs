//! Site-Spider main entry point
//!
//! This is the command-line interface for the Site-Spider link checker.

use anyhow::{Context, Result};
use clap::Parser;
use site_spider::config::{load_config_with_hash, validate_timeout, Config};
use site_spider::crawler::{CrawlPolicy, HttpFetcher, Scheduler};
use site_spider::output::{
    print_statistics, write_markdown_report, ChannelSink, CrawlReport, ResultStatistics,
    SpiderEvent,
};
use site_spider::url::validate_seed;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

/// Site-Spider: a bounded single-site link checker
///
/// Site-Spider walks a website from a seed URL, following only links that match
/// a restriction pattern, and reports the HTTP status, MIME type and referrer of
/// every URL it finds.
#[derive(Parser, Debug)]
#[command(name = "site-spider")]
#[command(version)]
#[command(about = "A bounded single-site link checker", long_about = None)]
struct Cli {
    /// URL to start spidering from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Regex a URL must match to be spidered (default: the seed's directory)
    #[arg(short, long, value_name = "REGEX")]
    restrict: Option<String>,

    /// Also check off-pattern links found on on-pattern pages
    #[arg(long)]
    allow_plus_one: bool,

    /// Also follow links with query arguments
    #[arg(long)]
    allow_arguments: bool,

    /// Also check images, scripts, stylesheets and frames
    #[arg(long)]
    check_inline: bool,

    /// Seconds to wait for a HEAD probe
    #[arg(long, value_name = "SECS")]
    probe_timeout: Option<u64>,

    /// Seconds to wait for a page load
    #[arg(long, value_name = "SECS")]
    load_timeout: Option<u64>,

    /// Write a markdown report to this file when the session ends
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Validate settings and show what would be spidered without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let seed = validate_seed(&cli.seed).context("Invalid seed URL")?;
    let policy =
        CrawlPolicy::from_config(&config.policy, &seed).context("Invalid restriction pattern")?;

    if cli.dry_run {
        handle_dry_run(&config, &seed, &policy);
        return Ok(());
    }

    handle_spider(config, seed, policy).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_spider=info,warn"),
            1 => EnvFilter::new("site_spider=debug,info"),
            2 => EnvFilter::new("site_spider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(restrict) = &cli.restrict {
        config.policy.restriction = Some(restrict.clone());
    }
    config.policy.allow_plus_one |= cli.allow_plus_one;
    config.policy.allow_arguments |= cli.allow_arguments;
    config.policy.check_inline |= cli.check_inline;

    if let Some(secs) = cli.probe_timeout {
        validate_timeout("--probe-timeout", secs)?;
        config.spider.probe_timeout_secs = secs;
    }
    if let Some(secs) = cli.load_timeout {
        validate_timeout("--load-timeout", secs)?;
        config.spider.load_timeout_secs = secs;
    }
    if let Some(report) = &cli.report {
        config.output.report_path = Some(report.display().to_string());
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config, seed: &str, policy: &CrawlPolicy) {
    println!("=== Site-Spider Dry Run ===\n");

    println!("Session:");
    println!("  Starting on: {}", seed);
    println!("  Restrict to: {}", policy.restriction());
    println!("  Allow plus one: {}", policy.allow_plus_one());
    println!("  Allow arguments: {}", policy.allow_arguments());
    println!("  Check inline: {}", policy.check_inline());

    println!("\nWatchdogs:");
    println!("  Probe timeout: {}s", config.spider.probe_timeout_secs);
    println!("  Load timeout: {}s", config.spider.load_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    if let Some(contact) = &config.user_agent.contact_url {
        println!("  Contact URL: {}", contact);
    }

    println!("\nOutput:");
    match &config.output.report_path {
        Some(path) => println!("  Report: {}", path),
        None => println!("  Report: (none)"),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Seed matches restriction: {}",
        if policy.restriction().matches(seed) { "yes" } else { "no" }
    );
}

/// Runs one spider session and reports its results
async fn handle_spider(config: Config, seed: String, policy: CrawlPolicy) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to build HTTP client")?;
    let (sink, events) = ChannelSink::channel();
    let mut scheduler = Scheduler::new(
        Arc::new(fetcher),
        Arc::new(sink),
        config.spider.timeouts(),
    );

    let report = CrawlReport::new(seed.clone(), policy.restriction().as_str());
    scheduler
        .start(&seed, policy)
        .context("Failed to start spider session")?;

    let stop = scheduler.stop_handle();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received interrupt, stopping");
            stop.stop();
        }
    });

    let consumer = tokio::spawn(consume_events(events, report));

    let outcome = scheduler.run().await;
    signal_task.abort();

    // dropping the scheduler closes the event channel
    drop(scheduler);
    let mut report = consumer.await.context("Result consumer panicked")?;

    let summary = outcome.context("Spider session failed")?;
    report.finish(summary.clone());

    if let Some(path) = &config.output.report_path {
        write_markdown_report(&report, Path::new(path))
            .with_context(|| format!("Failed to write report to {}", path))?;
        tracing::info!("Report written to: {}", path);
    }

    println!();
    print_statistics(&ResultStatistics::from_results(&report.results), &summary);

    Ok(())
}

/// Streams results to stdout as they arrive and collects them for the report
///
/// Returns when the scheduler drops its sink. If stdout goes away the receiver
/// is dropped, which stops the session.
async fn consume_events(
    mut events: UnboundedReceiver<SpiderEvent>,
    mut report: CrawlReport,
) -> CrawlReport {
    while let Some(event) = events.recv().await {
        match event {
            SpiderEvent::Status {
                message,
                queue_depth,
            } => {
                tracing::debug!("[{} queued] {}", queue_depth, message);
            }
            SpiderEvent::Page(result) => {
                let mut stdout = std::io::stdout().lock();
                let written = writeln!(
                    stdout,
                    "{:<24} {:<24} {}  <- {}",
                    result.status_label(),
                    result.mime_essence(),
                    result.url,
                    result.referrer
                );
                report.record(result);

                if let Err(e) = written {
                    tracing::error!("Failed to write result: {}", e);
                    break;
                }
            }
        }
    }

    report
}
