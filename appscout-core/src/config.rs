use crate::error::ConfigError;
use crate::filter::parse_magnitude;
use appscout_scanner::{CrawlLimits, Storefront};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowUnit {
    Days,
    Months,
}

/// Keep records released within the last `amount` units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyWindow {
    pub amount: u32,
    pub unit: WindowUnit,
    /// chrono format of the release date field; storefront default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    AtLeast,
    AtMost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallThreshold {
    #[serde(deserialize_with = "deserialize_magnitude")]
    pub threshold: u64,
    pub mode: ThresholdMode,
}

impl InstallThreshold {
    /// Parse a threshold given as `5K`, `1.2M` or a plain number.
    pub fn parse(raw: &str, mode: ThresholdMode) -> Result<Self, ConfigError> {
        let threshold = parse_magnitude(raw).ok_or_else(|| {
            ConfigError::invalid("filter.installs.threshold", format!("'{}' is not a count", raw))
        })?;
        Ok(Self { threshold, mode })
    }
}

fn deserialize_magnitude<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => parse_magnitude(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("'{}' is not a count", s))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency: Option<RecencyWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installs: Option<InstallThreshold>,
}

/// Everything one crawl run needs. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub storefront: Storefront,
    pub seeds: Vec<String>,
    pub output: String,
    pub max_nodes: usize,
    pub max_depth: usize,
    pub per_page_fanout: usize,
    pub request_delay_ms: u64,
    pub target_accepted: Option<usize>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub resume: bool,
    pub filter: FilterConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            storefront: Storefront::GooglePlay,
            seeds: Vec::new(),
            output: "google_play_apps.csv".to_string(),
            max_nodes: 3000,
            max_depth: 10,
            per_page_fanout: 20,
            request_delay_ms: 1000,
            target_accepted: None,
            timeout_secs: 15,
            max_retries: 0,
            retry_backoff_ms: 500,
            resume: false,
            filter: FilterConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nodes == 0 {
            return Err(ConfigError::invalid("max_nodes", "must be at least 1"));
        }
        if self.target_accepted == Some(0) {
            return Err(ConfigError::invalid("target_accepted", "must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be at least 1"));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::invalid("output", "path is empty"));
        }
        if let Some(recency) = &self.filter.recency {
            if recency.amount == 0 {
                return Err(ConfigError::invalid(
                    "filter.recency.amount",
                    "window must be at least 1",
                ));
            }
            if let Some(format) = &recency.date_format
                && format.trim().is_empty()
            {
                return Err(ConfigError::invalid(
                    "filter.recency.date_format",
                    "format is empty",
                ));
            }
        }
        Ok(())
    }

    /// Crawler limits derived from this config.
    pub fn limits(&self) -> CrawlLimits {
        CrawlLimits {
            max_nodes: self.max_nodes,
            max_depth: self.max_depth,
            per_page_fanout: self.per_page_fanout,
            request_delay: Duration::from_millis(self.request_delay_ms),
            target_accepted: self.target_accepted,
            max_retries: self.max_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// Output path with `~` and environment variables expanded.
    pub fn output_path(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.output)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.output.clone());
        PathBuf::from(expanded)
    }

    /// Release date format the filter reads.
    pub fn date_format(&self) -> &str {
        self.filter
            .recency
            .as_ref()
            .and_then(|r| r.date_format.as_deref())
            .unwrap_or_else(|| default_date_format(self.storefront))
    }
}

/// Release date format written by each storefront's extractor.
pub fn default_date_format(storefront: Storefront) -> &'static str {
    match storefront {
        Storefront::GooglePlay => "%b %d, %Y",
        Storefront::AppStore => "%B %d, %Y",
    }
}

/// Default output file for a storefront.
pub fn default_output(storefront: Storefront) -> &'static str {
    match storefront {
        Storefront::GooglePlay => "google_play_apps.csv",
        Storefront::AppStore => "app_store_apps.csv",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.max_nodes, 3000);
        assert_eq!(config.per_page_fanout, 20);
        assert_eq!(config.max_retries, 0);
        assert!(config.validate().is_ok());
        assert_eq!(config.limits().request_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_date_format_override() {
        let mut config = RunConfig::default();
        assert_eq!(config.date_format(), "%b %d, %Y");
        config.filter.recency = Some(RecencyWindow {
            amount: 3,
            unit: WindowUnit::Months,
            date_format: Some("%Y-%m-%d".to_string()),
        });
        assert_eq!(config.date_format(), "%Y-%m-%d");
    }
}
