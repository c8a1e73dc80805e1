use crate::config::RunConfig;
use crate::error::{ConfigError, CrawlError};
use crate::extract::extractor_for;
use crate::filter::ListingFilter;
use crate::pipeline::ExtractionPipeline;
use crate::sink::CsvSink;
use appscout_scanner::{
    CrawlSummary, Crawler, HttpFetcher, NodeOutcome, NodeReport, PageFetcher, Storefront,
};
use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub config: RunConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Outcome of a finished crawl run.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub storefront: Storefront,
    pub summary: CrawlSummary,
    pub output: PathBuf,
    pub known_keys: usize,
}

/// Execute a crawl over HTTP with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, CrawlError> {
    options.config.validate()?;
    let fetcher = HttpFetcher::with_timeout(options.config.timeout_secs)?;
    execute_crawl_with(
        fetcher,
        options,
        Local::now().date_naive(),
        progress_callback,
    )
    .await
}

/// Execute a crawl with any fetcher, measuring recency against `today`.
pub async fn execute_crawl_with<F: PageFetcher>(
    fetcher: F,
    options: CrawlOptions,
    today: NaiveDate,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, CrawlError> {
    let CrawlOptions {
        config,
        show_progress_bars,
    } = options;
    config.validate()?;
    if config.seeds.is_empty() {
        return Err(ConfigError::invalid("seeds", "no seed URLs given").into());
    }

    let output = config.output_path();
    let sink = CsvSink::open(&output)?;
    let known: HashSet<String> = if config.resume {
        sink.existing_keys()?
    } else {
        HashSet::new()
    };
    if config.resume {
        info!("Resuming: {} listings already in {}", known.len(), output.display());
    }
    let known_keys = known.len();

    let filter = ListingFilter::new(&config.filter, config.date_format());
    let mut pipeline =
        ExtractionPipeline::new(extractor_for(config.storefront), filter, sink).with_today(today);

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let user_callback = progress_callback.clone();
    let node_callback: appscout_scanner::ProgressCallback = Arc::new(move |report: &NodeReport| {
        if let Some(ref pb) = pb_clone {
            pb.set_message(format!(
                "Crawling... {} visited, {} saved | {}",
                report.visited,
                report.accepted,
                describe_node(report)
            ));
            pb.tick();
        }
        if let Some(ref callback) = user_callback {
            callback(describe_node(report));
        }
    });

    let mut crawler = Crawler::new(fetcher, config.storefront)
        .with_limits(config.limits())
        .with_known_keys(known)
        .with_progress_callback(node_callback);
    crawler.open(&config.seeds)?;

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Crawling {} from {} seed(s) into {}",
            config.storefront,
            config.seeds.len(),
            output.display()
        ));
    }

    let result = crawler.run(&mut pipeline).await;

    if let Some(ref pb) = progress_bar {
        let summary = crawler.summary();
        pb.finish_with_message(format!(
            "Crawl complete! {} visited, {} saved",
            summary.visited, summary.accepted
        ));
    }
    result?;

    let summary = crawler.close();
    Ok(CrawlReport {
        storefront: config.storefront,
        summary,
        output,
        known_keys,
    })
}

fn describe_node(report: &NodeReport) -> String {
    match &report.outcome {
        NodeOutcome::Accepted => format!("saved {}", report.node.key),
        NodeOutcome::Rejected(reason) => format!("skipped {}: {}", report.node.key, reason),
        NodeOutcome::Skipped(reason) => format!("passed {}: {}", report.node.key, reason),
        NodeOutcome::Failed(reason) => format!("failed {}: {}", report.node.url, reason),
    }
}

/// Generate a crawl report from a finished run
pub fn generate_crawl_report(report: &CrawlReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Storefront: {}\n", report.storefront));
    out.push_str(&format!("  Pages visited: {}\n", summary.visited));
    out.push_str(&format!("  Records saved: {}\n", summary.accepted));
    out.push_str(&format!("  Records filtered out: {}\n", summary.rejected));
    out.push_str(&format!("  Pages passed over: {}\n", summary.skipped));
    out.push_str(&format!("  Fetch failures: {}\n", summary.failed));
    if report.known_keys > 0 {
        out.push_str(&format!("  Already in dataset: {}\n", report.known_keys));
    }
    if let Some(reason) = summary.stop_reason {
        out.push_str(&format!("  Stopped: {}\n", reason.as_str()));
    }
    out.push_str(&format!("  Output: {}\n", report.output.display()));
    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use appscout_scanner::StopReason;

    #[test]
    fn test_report_lists_counts_and_reason() {
        let report = CrawlReport {
            storefront: Storefront::GooglePlay,
            summary: CrawlSummary {
                visited: 12,
                accepted: 4,
                rejected: 6,
                skipped: 1,
                failed: 1,
                stop_reason: Some(StopReason::Drained),
            },
            output: PathBuf::from("out.csv"),
            known_keys: 0,
        };
        let text = generate_crawl_report(&report);
        assert!(text.contains("Pages visited: 12"));
        assert!(text.contains("Records saved: 4"));
        assert!(text.contains("Stopped: frontier drained"));
        assert!(!text.contains("Already in dataset"));
    }
}
