pub mod app_store;
pub mod catalog;
pub mod config;
pub mod crawl;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod filter;
pub mod google_play;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sink;

pub use config::RunConfig;
pub use dataset::{Dataset, DatasetSource, MergeOutcome, MergeReport, merge};
pub use error::{ConfigError, CrawlError, MergeError, SinkError};
pub use extract::{FieldExtractor, extractor_for};
pub use filter::{ListingFilter, Rejection};
pub use pipeline::ExtractionPipeline;
pub use record::{Field, Record};
pub use sink::CsvSink;
