use crate::dataset::Dataset;
use crate::error::SinkError;
use crate::record::{COLUMNS, Record};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only CSV record file.
///
/// The header is written once, when the file is new or empty. Every append
/// opens the file, writes one row and flushes before returning, so a crash
/// never loses an accepted record.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    written: usize,
}

impl CsvSink {
    /// Open `path` for appending, creating it (and its parent directory) if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if needs_header {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(COLUMNS)?;
            writer.flush()?;
            debug!("Wrote header to {}", path.display());
        } else {
            terminate_last_row(&path)?;
        }

        Ok(Self { path, written: 0 })
    }

    pub fn append(&mut self, record: &Record) -> Result<(), SinkError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this sink.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Identity keys already present in the file.
    pub fn existing_keys(&self) -> Result<HashSet<String>, SinkError> {
        let dataset = Dataset::from_path(&self.path)?;
        Ok(dataset.keys().cloned().collect())
    }
}

/// An interrupted write can leave the last row without its line break;
/// close it so the next append starts on a fresh line.
fn terminate_last_row(path: &Path) -> Result<(), SinkError> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(b"\n")?;
        file.flush()?;
        debug!("Terminated unfinished last row in {}", path.display());
    }
    Ok(())
}
