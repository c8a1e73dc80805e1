pub mod crawler;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod links;
pub mod page;

pub use crawler::{
    CrawlLimits, CrawlState, CrawlSummary, Crawler, NodeHandler, NodeOutcome, NodeReport,
    ProgressCallback, StopReason,
};
pub use error::ScanError;
pub use fetch::{HttpFetcher, PageFetcher};
pub use identity::Storefront;
pub use page::{FetchedPage, Node, NodeKind};
