//! Keyed record collections and the merge of a base dataset with a fresh one.

use crate::error::{MergeError, SinkError};
use crate::record::{COLUMNS, Record};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Records keyed by identity key. At most one record per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: HashMap<String, Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.records.keys()
    }

    /// Insert a record, replacing any record with the same key.
    ///
    /// Returns `false` without inserting when the record has no app link.
    pub fn insert(&mut self, record: Record) -> bool {
        match record.identity_key() {
            Some(key) => {
                self.records.insert(key, record);
                true
            }
            None => false,
        }
    }

    /// Read CSV rows with the standard header. Rows without an app link are
    /// skipped; later rows win over earlier rows with the same key.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut dataset = Dataset::new();
        let mut skipped = 0usize;
        for row in csv_reader.deserialize::<Record>() {
            if !dataset.insert(row?) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Skipped {} rows without an app link", skipped);
        }
        Ok(dataset)
    }

    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        let file = fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Records ordered by app name, then identity key.
    pub fn sorted(&self) -> Vec<&Record> {
        let mut entries: Vec<(&String, &Record)> = self.records.iter().collect();
        entries.sort_by(|(ka, a), (kb, b)| {
            a.app_name
                .as_str()
                .cmp(b.app_name.as_str())
                .then_with(|| ka.cmp(kb))
        });
        entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Header plus sorted rows.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SinkError> {
        let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        csv_writer.write_record(COLUMNS)?;
        for record in self.sorted() {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub fn save(&self, path: &Path) -> Result<(), SinkError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(path);
        let file = fs::File::create(&tmp)?;
        if let Err(e) = self.write_to(file) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for record in iter {
            dataset.insert(record);
        }
        dataset
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset.csv".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub dataset: Dataset,
    pub base_count: usize,
    pub fresh_count: usize,
    pub added: usize,
    pub updated: usize,
}

/// Union of `base` and `fresh`; on a shared key the fresh record wins.
///
/// A missing base yields exactly the fresh dataset.
pub fn merge(base: Option<&Dataset>, fresh: &Dataset) -> MergeOutcome {
    let mut merged = base.cloned().unwrap_or_default();
    let base_count = merged.len();
    let mut added = 0;
    let mut updated = 0;

    for (key, record) in &fresh.records {
        if merged.records.insert(key.clone(), record.clone()).is_some() {
            updated += 1;
        } else {
            added += 1;
        }
    }

    MergeOutcome {
        dataset: merged,
        base_count,
        fresh_count: fresh.len(),
        added,
        updated,
    }
}

/// Where a dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Remote(String),
    Local(PathBuf),
}

impl DatasetSource {
    /// `http(s)://` locations are remote, anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DatasetSource::Remote(trimmed.to_string())
        } else {
            let expanded = shellexpand::full(trimmed)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| trimmed.to_string());
            DatasetSource::Local(PathBuf::from(expanded))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Remote(url) => url.clone(),
            DatasetSource::Local(path) => path.display().to_string(),
        }
    }

    pub async fn load(&self, timeout: Duration) -> Result<Dataset, MergeError> {
        match self {
            DatasetSource::Remote(url) => fetch_remote(url, timeout).await,
            DatasetSource::Local(path) => {
                if !path.exists() {
                    return Err(MergeError::unavailable(self.describe(), "file not found"));
                }
                Dataset::from_path(path).map_err(|e| MergeError::unavailable(self.describe(), e))
            }
        }
    }
}

/// Download a dataset over HTTP. Any failure makes the source unavailable.
pub async fn fetch_remote(url: &str, timeout: Duration) -> Result<Dataset, MergeError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MergeError::unavailable(url, e))?;
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| MergeError::unavailable(url, e))?;
    let body = response
        .text()
        .await
        .map_err(|e| MergeError::unavailable(url, e))?;
    Dataset::from_reader(body.as_bytes()).map_err(|e| MergeError::unavailable(url, e))
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub base_source: Option<String>,
    pub base_available: bool,
    pub base_count: usize,
    pub fresh_count: usize,
    pub added: usize,
    pub updated: usize,
    pub total: usize,
    pub output: PathBuf,
    pub warnings: Vec<String>,
}

/// Load `fresh`, try `base`, merge and write the result to `output`.
///
/// An unavailable base degrades to a fresh-only merge with a warning. An
/// unavailable fresh dataset is fatal.
pub async fn merge_sources(
    base: Option<&DatasetSource>,
    fresh: &DatasetSource,
    output: &Path,
    timeout: Duration,
) -> Result<MergeReport, MergeError> {
    let mut warnings = Vec::new();

    let base_dataset = match base {
        Some(source) => match source.load(timeout).await {
            Ok(dataset) => {
                info!("Loaded {} records from {}", dataset.len(), source.describe());
                Some(dataset)
            }
            Err(e) => {
                warn!("{}; merging fresh data only", e);
                warnings.push(format!("{}; merged fresh data only", e));
                None
            }
        },
        None => None,
    };

    let fresh_dataset = fresh.load(timeout).await?;
    info!("Loaded {} fresh records from {}", fresh_dataset.len(), fresh.describe());

    let outcome = merge(base_dataset.as_ref(), &fresh_dataset);
    outcome.dataset.save(output).map_err(|e| match e {
        SinkError::Io(e) => MergeError::Io(e),
        SinkError::Csv(e) => MergeError::Csv(e),
    })?;
    info!("Wrote {} merged records to {}", outcome.dataset.len(), output.display());

    Ok(MergeReport {
        base_source: base.map(DatasetSource::describe),
        base_available: base_dataset.is_some(),
        base_count: outcome.base_count,
        fresh_count: outcome.fresh_count,
        added: outcome.added,
        updated: outcome.updated,
        total: outcome.dataset.len(),
        output: output.to_path_buf(),
        warnings,
    })
}
