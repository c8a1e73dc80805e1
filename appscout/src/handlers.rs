use anyhow::{Context, Result, anyhow, bail};
use appscout_core::catalog::{self, category_seeds};
use appscout_core::config::{
    InstallThreshold, RecencyWindow, RunConfig, ThresholdMode, WindowUnit, default_output,
};
use appscout_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
use appscout_core::dataset::{DatasetSource, merge_sources};
use appscout_core::report::{ReportFormat, render_crawl_report, render_merge_report, save_report};
use appscout_scanner::Storefront;
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use url::Url;

// Helper functions for crawl handler

/// Load and parse seed URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read seeds file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && (url.scheme() == "http" || url.scheme() == "https")
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && url.host_str().is_some_and(|h| h.contains('.'))
    {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Install the fmt subscriber; DEBUG when verbose, INFO otherwise.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

pub fn print_banner() {
    println!(
        "{} {}",
        "appscout".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "storefront listing crawler".bright_black());
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn storefront_arg(args: &ArgMatches) -> Option<Storefront> {
    args.get_one::<String>("storefront")
        .and_then(|s| Storefront::from_str(s))
}

fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Build the run configuration for `crawl`: config file first, then flags.
pub fn build_run_config(args: &ArgMatches) -> Result<RunConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    if let Some(storefront) = storefront_arg(args) {
        if args.get_one::<String>("output").is_none()
            && config.output == default_output(config.storefront)
        {
            config.output = default_output(storefront).to_string();
        }
        config.storefront = storefront;
    }
    if let Some(output) = args.get_one::<String>("output") {
        config.output = output.clone();
    }
    if let Some(v) = args.get_one::<usize>("max-nodes") {
        config.max_nodes = *v;
    }
    if let Some(v) = args.get_one::<usize>("max-depth") {
        config.max_depth = *v;
    }
    if let Some(v) = args.get_one::<usize>("fanout") {
        config.per_page_fanout = *v;
    }
    if let Some(v) = args.get_one::<u64>("delay-ms") {
        config.request_delay_ms = *v;
    }
    if let Some(v) = args.get_one::<usize>("target") {
        config.target_accepted = Some(*v);
    }
    if let Some(v) = args.get_one::<u64>("timeout") {
        config.timeout_secs = *v;
    }
    if let Some(v) = args.get_one::<u32>("retries") {
        config.max_retries = *v;
    }
    if args.get_flag("resume") {
        config.resume = true;
    }

    let window = match (args.get_one::<u32>("months"), args.get_one::<u32>("days")) {
        (Some(m), _) => Some((*m, WindowUnit::Months)),
        (None, Some(d)) => Some((*d, WindowUnit::Days)),
        (None, None) => None,
    };
    if let Some((amount, unit)) = window {
        let date_format = config.filter.recency.take().and_then(|r| r.date_format);
        config.filter.recency = Some(RecencyWindow {
            amount,
            unit,
            date_format,
        });
    }
    if let Some(format) = args.get_one::<String>("date-format") {
        match config.filter.recency.as_mut() {
            Some(recency) => recency.date_format = Some(format.clone()),
            None => bail!("--date-format needs a recency window (--months or --days)"),
        }
    }
    if let Some(raw) = args.get_one::<String>("min-installs") {
        config.filter.installs = Some(InstallThreshold::parse(raw, ThresholdMode::AtLeast)?);
    }
    if let Some(raw) = args.get_one::<String>("max-installs") {
        config.filter.installs = Some(InstallThreshold::parse(raw, ThresholdMode::AtMost)?);
    }

    let mut seeds: Vec<String> = args
        .get_many::<String>("seed")
        .map(|values| values.filter_map(|s| parse_url_line(s)).collect())
        .unwrap_or_default();
    if let Some(path) = args.get_one::<PathBuf>("seeds-file") {
        seeds.extend(load_urls_from_file(path).map_err(|e| anyhow!(e))?);
    }
    if let Some(names) = args.get_many::<String>("category") {
        let names: Vec<String> = names.cloned().collect();
        let names = if names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
            Vec::new()
        } else {
            names
        };
        let countries: Vec<String> = args
            .get_many::<String>("country")
            .map(|values| values.map(|c| c.to_lowercase()).collect())
            .unwrap_or_default();
        seeds.extend(category_seeds(config.storefront, &names, &countries)?);
    }
    if !seeds.is_empty() {
        config.seeds = seeds;
    }

    config.validate()?;
    if config.seeds.is_empty() {
        bail!("Provide at least one --seed, --seeds-file or --category");
    }
    Ok(config)
}

pub async fn handle_crawl(sub_matches: &ArgMatches) -> Result<()> {
    let config = build_run_config(sub_matches)?;
    let show_progress_bars = !sub_matches.get_flag("no-progress");
    let format = report_format(sub_matches);

    // Print crawl configuration
    println!(
        "\n{} Crawling {}",
        "→".blue(),
        config.storefront.to_string().bright_white()
    );
    println!("Seeds: {}", config.seeds.len());
    println!(
        "Max nodes: {}  Max depth: {}  Fan-out: {}",
        config.max_nodes, config.max_depth, config.per_page_fanout
    );
    println!("Delay: {}ms", config.request_delay_ms);
    if let Some(recency) = &config.filter.recency {
        let unit = match recency.unit {
            WindowUnit::Days => "days",
            WindowUnit::Months => "months",
        };
        println!(
            "Released within: {} {} ({})",
            recency.amount,
            unit,
            config.date_format()
        );
    }
    if let Some(installs) = &config.filter.installs {
        let mode = match installs.mode {
            ThresholdMode::AtLeast => "at least",
            ThresholdMode::AtMost => "at most",
        };
        println!("Installs: {} {}", mode, installs.threshold);
    }
    let resume_note = if config.resume { " (resume)" } else { "" };
    println!("Output: {}{}\n", config.output_path().display(), resume_note);

    let options = CrawlOptions {
        config,
        show_progress_bars,
    };

    // Without the spinner, print each node outcome as a line
    let progress_callback: Option<CrawlProgressCallback> = if show_progress_bars {
        None
    } else {
        Some(Arc::new(|msg: String| {
            println!("{}", msg);
        }))
    };

    let report = execute_crawl(options, progress_callback)
        .await
        .context("Crawl failed")?;

    println!("\n{} Crawl complete!\n", "✓".green().bold());

    let rendered = render_crawl_report(&report, format)?;
    match sub_matches.get_one::<PathBuf>("report") {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{} Report saved: {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// The fresh dataset for `merge`: `--fresh`, or the storefront's crawl output.
pub fn fresh_source(args: &ArgMatches) -> Result<(DatasetSource, PathBuf)> {
    let storefront = storefront_arg(args).unwrap_or_default();
    let fresh_raw = args
        .get_one::<String>("fresh")
        .map(String::as_str)
        .unwrap_or_else(|| default_output(storefront));
    match DatasetSource::parse(fresh_raw) {
        DatasetSource::Local(path) => Ok((DatasetSource::Local(path.clone()), path)),
        DatasetSource::Remote(_) => bail!("--fresh must be a local file, got {}", fresh_raw),
    }
}

pub async fn handle_merge(sub_matches: &ArgMatches) -> Result<()> {
    let (fresh, fresh_path) = fresh_source(sub_matches)?;
    let output = match sub_matches.get_one::<String>("output") {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
        None => fresh_path.clone(),
    };
    let base = sub_matches
        .get_one::<String>("base")
        .map(|raw| DatasetSource::parse(raw));
    let timeout = Duration::from_secs(*sub_matches.get_one::<u64>("timeout").unwrap_or(&30));

    print_divider();
    println!("{}", "  DATASET MERGE".bright_white().bold());
    print_divider();
    println!();

    let report = merge_sources(base.as_ref(), &fresh, &output, timeout)
        .await
        .context("Merge failed")?;

    for warning in &report.warnings {
        println!("{} {}", "⚠".yellow().bold(), warning);
    }
    println!("{} Merged dataset saved: {}\n", "✓".green().bold(), output.display());
    print!("{}", render_merge_report(&report, report_format(sub_matches))?);
    Ok(())
}

pub fn handle_categories(sub_matches: &ArgMatches) -> Result<()> {
    let storefront = storefront_arg(sub_matches).unwrap_or_default();

    println!("{}", format!("Categories for {}", storefront).bright_white().bold());
    for category in catalog::categories(storefront) {
        println!("  {} {}", format!("{:<24}", category.id).cyan(), category.name);
    }
    if storefront == Storefront::AppStore {
        println!();
        println!("Countries: {}", catalog::APP_STORE_COUNTRIES.join(" "));
    }
    Ok(())
}
