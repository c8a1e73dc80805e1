use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A fetched page, as handed from the crawler to link discovery and node handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub body: String,
}

impl FetchedPage {
    pub fn new(url: String, body: String) -> Self {
        Self {
            url,
            status_code: 200,
            content_type: None,
            response_time: Duration::from_secs(0),
            body,
        }
    }

    pub fn is_json(&self) -> bool {
        match self.content_type {
            Some(ref ct) => ct.contains("json"),
            None => {
                let trimmed = self.body.trim_start();
                trimmed.starts_with('{') || trimmed.starts_with('[')
            }
        }
    }
}

/// A crawl node: a URL, its identity key and the depth it was discovered at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub url: String,
    pub key: String,
    pub depth: usize,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A storefront listing; handed to the node handler after fetching.
    Listing,
    /// A category page or feed; only used for link discovery.
    Index,
}

impl Node {
    pub fn listing(url: String, key: String, depth: usize) -> Self {
        Self {
            url,
            key,
            depth,
            kind: NodeKind::Listing,
        }
    }

    pub fn index(url: String, depth: usize) -> Self {
        Self {
            key: url.clone(),
            url,
            depth,
            kind: NodeKind::Index,
        }
    }

    pub fn is_listing(&self) -> bool {
        self.kind == NodeKind::Listing
    }
}
