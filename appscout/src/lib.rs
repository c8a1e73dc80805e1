pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{build_run_config, load_urls_from_file, parse_url_line};

// Re-export crawl functionality from appscout-core
pub use appscout_core::crawl::{
    CrawlOptions, CrawlProgressCallback, CrawlReport, execute_crawl, generate_crawl_report,
};
