use crate::error::{Result, ScanError};
use crate::fetch::PageFetcher;
use crate::identity::Storefront;
use crate::links::discover_links;
use crate::page::{FetchedPage, Node};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Called once per dequeued node after its outcome is known.
pub type ProgressCallback = Arc<dyn Fn(&NodeReport) + Send + Sync>;

/// Receives every fetched listing page, in crawl order.
///
/// Returning `Err` aborts the run; per-node problems should be reported as
/// `NodeOutcome::Rejected` or `NodeOutcome::Failed` instead.
pub trait NodeHandler: Send {
    fn handle(&mut self, node: &Node, page: &FetchedPage) -> Result<NodeOutcome>;
}

impl<F> NodeHandler for F
where
    F: FnMut(&Node, &FetchedPage) -> Result<NodeOutcome> + Send,
{
    fn handle(&mut self, node: &Node, page: &FetchedPage) -> Result<NodeOutcome> {
        self(node, page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    Accepted,
    Rejected(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct NodeReport {
    pub node: Node,
    pub outcome: NodeOutcome,
    pub links_enqueued: usize,
    pub visited: usize,
    pub accepted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The frontier ran empty.
    Drained,
    /// `max_nodes` fetches were made.
    BudgetExhausted,
    /// `target_accepted` records were accepted.
    TargetReached,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Drained => "frontier drained",
            StopReason::BudgetExhausted => "node budget exhausted",
            StopReason::TargetReached => "target reached",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Running,
    Done(StopReason),
    Aborted,
}

#[derive(Debug, Clone)]
pub struct CrawlLimits {
    pub max_nodes: usize,
    pub max_depth: usize,
    pub per_page_fanout: usize,
    pub request_delay: Duration,
    pub target_accepted: Option<usize>,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_nodes: 3000,
            max_depth: 10,
            per_page_fanout: 20,
            request_delay: Duration::from_secs(1),
            target_accepted: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub visited: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
    pub stop_reason: Option<StopReason>,
}

/// Breadth-first frontier crawler.
///
/// One instance is one run: `open` enqueues the seeds, `run` drains the
/// frontier through a [`NodeHandler`], `close` hands back the summary. The
/// visited set and frontier live only inside the instance.
pub struct Crawler<F: PageFetcher> {
    fetcher: F,
    storefront: Storefront,
    limits: CrawlLimits,
    visited: HashSet<String>,
    known: HashSet<String>,
    frontier: VecDeque<Node>,
    state: CrawlState,
    last_fetch: Option<Instant>,
    summary: CrawlSummary,
    progress_callback: Option<ProgressCallback>,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, storefront: Storefront) -> Self {
        Self {
            fetcher,
            storefront,
            limits: CrawlLimits::default(),
            visited: HashSet::new(),
            known: HashSet::new(),
            frontier: VecDeque::new(),
            state: CrawlState::Idle,
            last_fetch: None,
            summary: CrawlSummary::default(),
            progress_callback: None,
        }
    }

    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Keys accepted or rejected by an earlier run. They are never enqueued
    /// from discovered links and never handed to the handler.
    pub fn with_known_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.known.extend(keys);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    /// Enqueue the seeds at depth 0.
    ///
    /// Listing URLs become listing nodes; anything else (category pages,
    /// feeds) becomes an index node that is only mined for links.
    pub fn open<S: AsRef<str>>(&mut self, seeds: &[S]) -> Result<()> {
        if self.state != CrawlState::Idle {
            return Err(ScanError::Other("crawler already opened".to_string()));
        }
        if seeds.is_empty() {
            return Err(ScanError::Other("no seed URLs given".to_string()));
        }

        for seed in seeds {
            let seed = seed.as_ref();
            let node = match self.storefront.canonical_url(seed, None) {
                Some(canonical) => {
                    let key = self
                        .storefront
                        .key_of(&canonical)
                        .ok_or_else(|| ScanError::InvalidUrl(seed.to_string()))?;
                    Node::listing(canonical.to_string(), key, 0)
                }
                None => {
                    let url = Url::parse(seed.trim())
                        .ok()
                        .filter(|u| u.scheme() == "http" || u.scheme() == "https")
                        .ok_or_else(|| ScanError::InvalidUrl(seed.to_string()))?;
                    Node::index(url.to_string(), 0)
                }
            };
            debug!("Seed {} ({:?})", node.url, node.kind);
            self.frontier.push_back(node);
        }

        Ok(())
    }

    /// Drive the frontier until it drains, the node budget is spent or the
    /// accepted target is reached.
    pub async fn run<H: NodeHandler>(&mut self, handler: &mut H) -> Result<CrawlSummary> {
        match self.state {
            CrawlState::Idle if self.frontier.is_empty() => {
                return Err(ScanError::Other("crawler has no seeds, call open first".to_string()));
            }
            CrawlState::Idle => {}
            _ => return Err(ScanError::Other("crawler already ran".to_string())),
        }

        self.state = CrawlState::Running;
        info!(
            "Starting crawl: {} seeds, max {} nodes, max depth {}",
            self.frontier.len(),
            self.limits.max_nodes,
            self.limits.max_depth
        );

        let stop_reason = loop {
            if let Some(target) = self.limits.target_accepted
                && self.summary.accepted >= target
            {
                break StopReason::TargetReached;
            }
            if self.summary.visited >= self.limits.max_nodes {
                break StopReason::BudgetExhausted;
            }
            let Some(node) = self.frontier.pop_front() else {
                break StopReason::Drained;
            };

            if self.visited.contains(&node.key) {
                debug!("Already visited {}, discarding", node.key);
                continue;
            }
            self.visited.insert(node.key.clone());

            if let Err(e) = self.process(node, handler).await {
                self.state = CrawlState::Aborted;
                return Err(e);
            }
        };

        self.summary.stop_reason = Some(stop_reason);
        self.state = CrawlState::Done(stop_reason);
        info!(
            "Crawl complete ({}). Visited {}, accepted {}, rejected {}, failed {}",
            stop_reason.as_str(),
            self.summary.visited,
            self.summary.accepted,
            self.summary.rejected,
            self.summary.failed
        );
        Ok(self.summary.clone())
    }

    /// Release the frontier and visited set, returning the run summary.
    pub fn close(self) -> CrawlSummary {
        debug!(
            "Closing crawler with {} nodes left in the frontier",
            self.frontier.len()
        );
        self.summary
    }

    async fn process<H: NodeHandler>(&mut self, node: Node, handler: &mut H) -> Result<()> {
        self.pace().await;
        self.summary.visited += 1;

        let fetched = fetch_with_retry(
            &self.fetcher,
            &node.url,
            self.limits.max_retries,
            self.limits.retry_backoff,
        )
        .await;
        self.last_fetch = Some(Instant::now());

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                warn!("Fetch failed for {}: {}", node.url, e);
                self.summary.failed += 1;
                self.report(node, NodeOutcome::Failed(e.to_string()), 0);
                return Ok(());
            }
        };

        let links_enqueued = self.enqueue_links(&node, &page);

        let outcome = if !node.is_listing() {
            NodeOutcome::Skipped("index page".to_string())
        } else if self.known.contains(&node.key) {
            NodeOutcome::Skipped("already in dataset".to_string())
        } else {
            handler.handle(&node, &page)?
        };

        match outcome {
            NodeOutcome::Accepted => self.summary.accepted += 1,
            NodeOutcome::Rejected(_) => self.summary.rejected += 1,
            NodeOutcome::Skipped(_) => self.summary.skipped += 1,
            NodeOutcome::Failed(_) => self.summary.failed += 1,
        }
        self.report(node, outcome, links_enqueued);
        Ok(())
    }

    fn enqueue_links(&mut self, node: &Node, page: &FetchedPage) -> usize {
        if node.depth >= self.limits.max_depth || self.summary.visited >= self.limits.max_nodes {
            return 0;
        }

        let fresh: Vec<Node> = discover_links(page, self.storefront, Some(&node.key))
            .into_iter()
            .filter(|link| !self.visited.contains(&link.key) && !self.known.contains(&link.key))
            .take(self.limits.per_page_fanout)
            .map(|link| Node::listing(link.url, link.key, node.depth + 1))
            .collect();

        let count = fresh.len();
        debug!("Enqueuing {} links from {} at depth {}", count, node.url, node.depth + 1);
        self.frontier.extend(fresh);
        count
    }

    async fn pace(&self) {
        if let Some(last) = self.last_fetch {
            let elapsed = last.elapsed();
            if elapsed < self.limits.request_delay {
                tokio::time::sleep(self.limits.request_delay - elapsed).await;
            }
        }
    }

    fn report(&self, node: Node, outcome: NodeOutcome, links_enqueued: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback(&NodeReport {
                node,
                outcome,
                links_enqueued,
                visited: self.summary.visited,
                accepted: self.summary.accepted,
            });
        }
    }
}

async fn fetch_with_retry<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    max_retries: u32,
    backoff: Duration,
) -> Result<FetchedPage> {
    let mut attempt = 0;
    loop {
        match fetcher.fetch(url).await {
            Ok(page) => return Ok(page),
            Err(e) if attempt < max_retries && e.is_transient() => {
                attempt += 1;
                warn!("Retrying {} ({}/{}): {}", url, attempt, max_retries, e);
                tokio::time::sleep(backoff * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}
