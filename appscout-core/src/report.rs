// Run and merge reports

use crate::crawl::{CrawlReport, generate_crawl_report};
use crate::dataset::MergeReport;
use appscout_scanner::StopReason;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReportData {
    pub generated_at: String,
    pub storefront: String,
    pub visited: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    pub known_keys: usize,
    pub output: String,
}

impl From<&CrawlReport> for RunReportData {
    fn from(report: &CrawlReport) -> Self {
        let summary = &report.summary;
        Self {
            generated_at: timestamp(),
            storefront: report.storefront.to_string(),
            visited: summary.visited,
            accepted: summary.accepted,
            rejected: summary.rejected,
            skipped: summary.skipped,
            failed: summary.failed,
            stop_reason: summary.stop_reason,
            known_keys: report.known_keys,
            output: report.output.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReportData {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_source: Option<String>,
    pub base_available: bool,
    pub base_count: usize,
    pub fresh_count: usize,
    pub added: usize,
    pub updated: usize,
    pub total: usize,
    pub output: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<&MergeReport> for MergeReportData {
    fn from(report: &MergeReport) -> Self {
        Self {
            generated_at: timestamp(),
            base_source: report.base_source.clone(),
            base_available: report.base_available,
            base_count: report.base_count,
            fresh_count: report.fresh_count,
            added: report.added,
            updated: report.updated,
            total: report.total,
            output: report.output.display().to_string(),
            warnings: report.warnings.clone(),
        }
    }
}

pub fn render_crawl_report(
    report: &CrawlReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(report)),
        ReportFormat::Json => serde_json::to_string_pretty(&RunReportData::from(report)),
    }
}

pub fn render_merge_report(
    report: &MergeReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_merge_report(report)),
        ReportFormat::Json => serde_json::to_string_pretty(&MergeReportData::from(report)),
    }
}

pub fn generate_merge_report(report: &MergeReport) -> String {
    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Merge:\n");
    match (&report.base_source, report.base_available) {
        (Some(source), true) => out.push_str(&format!("  Base: {}\n", source)),
        (Some(source), false) => out.push_str(&format!("  Base: {} (unavailable)\n", source)),
        (None, _) => out.push_str("  Base: none\n"),
    }
    out.push_str(&format!("  Existing records: {}\n", report.base_count));
    out.push_str(&format!("  Fresh records: {}\n", report.fresh_count));
    out.push_str(&format!("  New records added: {}\n", report.added));
    out.push_str(&format!("  Existing records updated: {}\n", report.updated));
    out.push_str(&format!("  Total after merge: {}\n", report.total));
    out.push_str(&format!("  Output: {}\n", report.output.display()));
    for warning in &report.warnings {
        out.push_str(&format!("  [!] {}\n", warning));
    }
    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, content)
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
