//! Markdown report generation
//!
//! This module renders the results of one crawl session as a markdown document:
//! the session header, summary counters, and one table row per recorded URL.

use crate::crawler::ProbeResult;
use crate::output::stats::{class_label, ResultStatistics};
use crate::output::traits::CrawlSummary;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Everything needed to render the report for one session
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed URL the session started on
    pub starting_on: String,

    /// The restriction pattern, as text
    pub restrict_to: String,

    /// When the session started
    pub started_at: DateTime<Local>,

    /// When the session ended, if it has
    pub finished_at: Option<DateTime<Local>>,

    /// Scheduler counters, once the session has ended
    pub summary: Option<CrawlSummary>,

    /// Recorded results, in the order they arrived
    pub results: Vec<ProbeResult>,
}

impl CrawlReport {
    /// Creates an empty report for a session that starts now
    pub fn new(starting_on: impl Into<String>, restrict_to: impl Into<String>) -> Self {
        Self {
            starting_on: starting_on.into(),
            restrict_to: restrict_to.into(),
            started_at: Local::now(),
            finished_at: None,
            summary: None,
            results: Vec::new(),
        }
    }

    /// Appends one recorded result
    pub fn record(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    /// Marks the session finished with the scheduler's summary
    pub fn finish(&mut self, summary: CrawlSummary) {
        self.finished_at = Some(Local::now());
        self.summary = Some(summary);
    }
}

/// Writes a markdown report to a file
///
/// # Arguments
///
/// * `report` - The crawl report data
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Site Spider Results\n\n");

    md.push_str("## Session\n\n");
    md.push_str(&format!("- **Starting on**: {}\n", escape_cell(&report.starting_on)));
    md.push_str(&format!("- **Restrict to**: `{}`\n", report.restrict_to));
    md.push_str(&format!(
        "- **Started**: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    if let Some(finished) = &report.finished_at {
        md.push_str(&format!(
            "- **Finished**: {}\n",
            finished.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    if let Some(summary) = &report.summary {
        md.push_str(&format!(
            "- **Status**: {}\n",
            if summary.completed { "Complete" } else { "Stopped" }
        ));
        md.push_str(&format!(
            "- **Duration**: {:.1} seconds\n",
            summary.duration.as_secs_f64()
        ));
    }
    md.push('\n');

    let stats = ResultStatistics::from_results(&report.results);
    md.push_str("## Summary\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    for (class, count) in &stats.by_class {
        md.push_str(&format!("| {} | {} |\n", class_label(*class), count));
    }
    md.push_str(&format!("| **Total** | {} |\n\n", stats.total));

    md.push_str("## Results\n\n");
    if report.results.is_empty() {
        md.push_str("No URLs were recorded.\n");
        return md;
    }

    md.push_str("| URL | Code | MIME | Referrer |\n");
    md.push_str("|-----|------|------|----------|\n");
    for result in &report.results {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&result.url),
            result.status_label(),
            escape_cell(result.mime_essence()),
            escape_cell(&result.referrer)
        ));
    }

    md
}

/// Escapes characters that would break a markdown table cell
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CrawlReport {
        let mut report = CrawlReport::new("http://example.com/a/", r"^http://example\.com/a/");
        report.record(ProbeResult {
            url: "http://example.com/a/".to_string(),
            status_code: Some(200),
            mime_type: "text/html; charset=utf-8".to_string(),
            referrer: "[root page]".to_string(),
        });
        report.record(ProbeResult {
            url: "http://example.com/a/c".to_string(),
            status_code: Some(404),
            mime_type: "text/html".to_string(),
            referrer: "http://example.com/a/".to_string(),
        });
        report.record(ProbeResult::timed_out(
            "http://example.com/a/d",
            "http://example.com/a/",
        ));
        report
    }

    #[test]
    fn test_header_fields() {
        let md = format_markdown_report(&sample_report());
        assert!(md.contains("# Site Spider Results"));
        assert!(md.contains("- **Starting on**: http://example.com/a/"));
        assert!(md.contains(r"- **Restrict to**: `^http://example\.com/a/`"));
        assert!(!md.contains("**Finished**"));
    }

    #[test]
    fn test_result_rows() {
        let md = format_markdown_report(&sample_report());
        assert!(md.contains("| http://example.com/a/ | 200 OK | text/html | [root page] |"));
        assert!(md.contains(
            "| http://example.com/a/c | 404 Not Found | text/html | http://example.com/a/ |"
        ));
        assert!(md.contains(
            "| http://example.com/a/d | Unable to load | [???] | http://example.com/a/ |"
        ));
    }

    #[test]
    fn test_summary_table() {
        let md = format_markdown_report(&sample_report());
        assert!(md.contains("| 2xx Success | 1 |"));
        assert!(md.contains("| 4xx Client error | 1 |"));
        assert!(md.contains("| Unable to load | 1 |"));
        assert!(md.contains("| **Total** | 3 |"));
    }

    #[test]
    fn test_finished_report() {
        let mut report = sample_report();
        let mut summary = CrawlSummary::new();
        summary.completed = true;
        report.finish(summary);

        let md = format_markdown_report(&report);
        assert!(md.contains("**Finished**"));
        assert!(md.contains("- **Status**: Complete"));
    }

    #[test]
    fn test_empty_report() {
        let report = CrawlReport::new("http://example.com/", "^x");
        let md = format_markdown_report(&report);
        assert!(md.contains("No URLs were recorded."));
    }

    #[test]
    fn test_pipe_in_url_is_escaped() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
    }

    #[test]
    fn test_write_markdown_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        write_markdown_report(&sample_report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Site Spider Results"));
    }
}
