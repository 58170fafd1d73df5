//! The per-directory transaction log.
//!
//! ```text
//! from, to, 2024_03_01_18_22_05
//! fssort.ini,fssort__2024_03_01_18_22_05.ini
//! a_10.jpg,holiday_i0010.jpg
//! ```
//!
//! The header is the only record with more than two fields; its last field is
//! the batch timestamp. Fields are quoted only when a name contains a comma,
//! a quote or a line break, so ordinary logs stay plain `from,to` lines.

use crate::error::RegroupError;
use crate::plan::tagged_name;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// `chrono` format of the batch timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// Current local time formatted as a batch timestamp
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Name of the log written for a batch: `<stem>__<timestamp><ext>`
pub fn log_file_name(history_root: &str, timestamp: &str) -> String {
    tagged_name(history_root, timestamp)
}

/// Text after the last `__` in the log's name, used to keep restored names
/// from clobbering files that already exist
pub fn conflict_token(log_name: &str) -> String {
    log_name.rsplit("__").next().unwrap_or(log_name).to_string()
}

/// One parsed line of a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Header { timestamp: String },
    Entry { from: String, to: String },
    Malformed(String),
}

/// Append-only writer for a batch's log
pub struct TransactionLog {
    path: PathBuf,
    writer: csv::Writer<File>,
    entries: usize,
}

impl TransactionLog {
    /// Open `path` for appending and write the header
    pub fn create(path: &Path, timestamp: &str) -> Result<Self, RegroupError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| RegroupError::HistoryWrite {
                path: path.to_path_buf(),
                source: e.into(),
            })?;

        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        let mut log = Self {
            path: path.to_path_buf(),
            writer,
            entries: 0,
        };
        let stamp = format!(" {timestamp}");
        log.write(&["from", " to", stamp.as_str()])?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of renames recorded so far
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Record a completed rename. Flushed immediately so an interrupted batch
    /// still leaves an undoable log.
    pub fn record(&mut self, from: &str, to: &str) -> Result<(), RegroupError> {
        self.write(&[from, to])?;
        self.entries += 1;
        Ok(())
    }

    fn write(&mut self, fields: &[&str]) -> Result<(), RegroupError> {
        let path = &self.path;
        self.writer
            .write_record(fields)
            .map_err(|source| RegroupError::HistoryWrite {
                path: path.clone(),
                source,
            })?;
        self.writer.flush().map_err(|e| RegroupError::HistoryWrite {
            path: path.clone(),
            source: e.into(),
        })
    }

    /// Close and delete the log
    pub fn discard(self) -> std::io::Result<()> {
        let path = self.path;
        drop(self.writer);
        fs::remove_file(path)
    }
}

/// Parse every record of the log at `path`
pub fn read_log(path: &Path) -> Result<Vec<LogRecord>, RegroupError> {
    let read_error = |source| RegroupError::HistoryRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(read_error)?;
        records.push(match record.len() {
            0 | 1 => LogRecord::Malformed(record.iter().collect::<Vec<_>>().join(",")),
            2 => LogRecord::Entry {
                from: record[0].to_string(),
                to: record[1].to_string(),
            },
            n => LogRecord::Header {
                timestamp: record[n - 1].trim().to_string(),
            },
        });
    }
    Ok(records)
}
