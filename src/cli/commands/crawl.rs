//! Crawl command: drive the listing for a date range and export the result.

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use console::style;

use gallerycrawl::config::Settings;
use gallerycrawl::models::{DateRange, PageRecord};
use gallerycrawl::scrapers::{
    browser, ChromeSession, CrawlReport, ItemExtractor, PaginationController,
};
use gallerycrawl::services::ReportAssembler;

use crate::cli::progress::BarProgress;

/// Days covered when no start date is given.
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Per-invocation options that do not live in [`Settings`].
pub struct CrawlOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub export: bool,
    pub json: bool,
}

/// Crawl the listing and write the spreadsheet.
pub async fn cmd_crawl(settings: &Settings, options: CrawlOptions) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let end = options.end.unwrap_or(today);
    let start = options
        .start
        .unwrap_or_else(|| today - Duration::days(DEFAULT_WINDOW_DAYS));
    let range = DateRange::new(start, end)?;

    let extractor = ItemExtractor::new(&settings.selectors)?;
    let include_author = extractor.has_author();

    eprintln!(
        "{} Crawling {} for {}",
        style("→").cyan(),
        settings.crawl.base_url,
        style(range).bold()
    );

    browser::prepare(&settings.browser)
        .await
        .context("browser setup failed")?;
    let session = ChromeSession::open(settings.browser.clone())
        .await
        .context("failed to start browser session")?;

    let controller = PaginationController::new(settings.crawl.clone(), extractor);
    let progress = BarProgress::new(settings.crawl.max_pages);
    let report = controller.run(session, range, &progress).await;

    print_summary(&report, settings.output.preview_rows);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report.records)?);
    }

    if report.records.is_empty() {
        eprintln!(
            "{} No posts found between {} and {}, nothing exported",
            style("!").yellow(),
            range.start(),
            range.end()
        );
        eprintln!("  {} Try a wider date range", style("→").dim());
        return Ok(());
    }

    if !options.export {
        return Ok(());
    }

    let exported = ReportAssembler::new(settings.output.file_prefix.as_str(), include_author)
        .assemble(&report.records, &range, Local::now().naive_local())?;
    let path = exported
        .save_to(&settings.output.directory)
        .with_context(|| format!("failed to write {}", exported.file_name))?;

    eprintln!(
        "{} Saved {} rows to {}",
        style("✓").green(),
        exported.rows,
        path.display()
    );

    Ok(())
}

fn print_summary(report: &CrawlReport, preview_rows: usize) {
    let stop = if report.stop_reason.is_clean() {
        style(report.stop_reason.describe()).dim()
    } else {
        style(report.stop_reason.describe()).yellow()
    };
    eprintln!(
        "{} {} posts from {} pages, stopped: {}",
        style("✓").green(),
        report.records.len(),
        report.pages_visited,
        stop
    );

    let counters = &report.counters;
    if counters.malformed_entries() > 0 {
        eprintln!(
            "  {} {} entries skipped (title missing: {}, date missing: {}, bad date: {})",
            style("!").yellow(),
            counters.malformed_entries(),
            counters.missing_title,
            counters.missing_date,
            counters.unparseable_dates
        );
    }
    if counters.pages_skipped > 0 {
        eprintln!(
            "  {} {} pages failed to load and were skipped",
            style("!").yellow(),
            counters.pages_skipped
        );
    }
    if counters.order_violations > 0 {
        eprintln!(
            "  {} listing was out of date order {} times, results may be incomplete",
            style("!").yellow(),
            counters.order_violations
        );
    }

    if report.records.is_empty() || preview_rows == 0 {
        return;
    }

    eprintln!();
    for record in report.records.iter().take(preview_rows) {
        print_row(record);
    }
    let hidden = report.records.len().saturating_sub(preview_rows);
    if hidden > 0 {
        eprintln!("  {} {} more", style("…").dim(), hidden);
    }
    eprintln!();
}

fn print_row(record: &PageRecord) {
    eprintln!(
        "  {} {}  {}",
        style("→").dim(),
        style(&record.raw_date_text).cyan(),
        record.title
    );
}
