use crate::error::SinkError;
use crate::extract::FieldExtractor;
use crate::filter::ListingFilter;
use crate::sink::CsvSink;
use appscout_scanner::{FetchedPage, Node, NodeHandler, NodeOutcome, ScanError};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Extract, filter, persist: the work done on every fetched listing.
///
/// Accepted records are in the sink before `process` returns.
pub struct ExtractionPipeline {
    extractor: Box<dyn FieldExtractor>,
    filter: ListingFilter,
    sink: CsvSink,
    today: NaiveDate,
}

impl ExtractionPipeline {
    pub fn new(extractor: Box<dyn FieldExtractor>, filter: ListingFilter, sink: CsvSink) -> Self {
        Self {
            extractor,
            filter,
            sink,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date recency is measured against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn process(&mut self, node: &Node, page: &FetchedPage) -> Result<NodeOutcome, SinkError> {
        let record = self.extractor.extract(&page.body, &node.url);

        if let Err(rejection) = self.filter.evaluate(&record, self.today) {
            debug!("Skipping {} ({}): {}", record.app_name, node.key, rejection);
            return Ok(NodeOutcome::Rejected(rejection.to_string()));
        }

        self.sink.append(&record)?;
        info!(
            "Saved {} ({}) - {} installs - released {}",
            record.app_name, node.key, record.install_count, record.release_date
        );
        Ok(NodeOutcome::Accepted)
    }
}

impl NodeHandler for ExtractionPipeline {
    fn handle(&mut self, node: &Node, page: &FetchedPage) -> appscout_scanner::error::Result<NodeOutcome> {
        self.process(node, page)
            .map_err(|e| ScanError::Handler(format!("failed to write record: {}", e)))
    }
}
