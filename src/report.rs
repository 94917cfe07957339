use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::error::EnteroError;

pub const LOOKUP_LOG_PREFIX: &str = "barcode_errors";
pub const DOWNLOAD_LOG_PREFIX: &str = "fasta_errors";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupError {
    pub name: String,
    pub barcode: String,
    pub query_url: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadError {
    pub name: String,
    pub barcode: String,
    pub download_url: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorRecord {
    Lookup(LookupError),
    Download(DownloadError),
}

impl ErrorRecord {
    /// One tab-delimited log line: name, barcode, URL, reason.
    pub fn to_line(&self) -> String {
        let (name, barcode, url, reason) = match self {
            ErrorRecord::Lookup(e) => (&e.name, &e.barcode, &e.query_url, &e.reason),
            ErrorRecord::Download(e) => (&e.name, &e.barcode, &e.download_url, &e.reason),
        };
        [name, barcode, url, reason]
            .iter()
            .map(|field| sanitize(field))
            .collect::<Vec<_>>()
            .join("\t")
    }
}

impl From<LookupError> for ErrorRecord {
    fn from(value: LookupError) -> Self {
        ErrorRecord::Lookup(value)
    }
}

impl From<DownloadError> for ErrorRecord {
    fn from(value: DownloadError) -> Self {
        ErrorRecord::Download(value)
    }
}

fn sanitize(field: &str) -> String {
    field
        .chars()
        .map(|ch| if matches!(ch, '\t' | '\n' | '\r') { ' ' } else { ch })
        .collect()
}

/// Per-run failure records, one ordered list per category.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    lookup: Vec<ErrorRecord>,
    download: Vec<ErrorRecord>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lookup_error(&mut self, error: LookupError) {
        self.lookup.push(error.into());
    }

    pub fn record_download_error(&mut self, error: DownloadError) {
        self.download.push(error.into());
    }

    pub fn record(&mut self, record: ErrorRecord) {
        match record {
            ErrorRecord::Lookup(error) => self.record_lookup_error(error),
            ErrorRecord::Download(error) => self.record_download_error(error),
        }
    }

    pub fn lookup_errors(&self) -> &[ErrorRecord] {
        &self.lookup
    }

    pub fn download_errors(&self) -> &[ErrorRecord] {
        &self.download
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub lookup_log: Utf8PathBuf,
    pub download_log: Utf8PathBuf,
}

/// Writes the two error logs once, at the end of a run.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: Utf8PathBuf,
    stamp: String,
}

impl ReportWriter {
    pub fn new(output_dir: &Utf8Path, started_at: DateTime<Local>) -> Self {
        Self {
            output_dir: output_dir.to_owned(),
            stamp: started_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn paths(&self) -> ReportPaths {
        ReportPaths {
            lookup_log: self
                .output_dir
                .join(format!("{LOOKUP_LOG_PREFIX}{}.log", self.stamp)),
            download_log: self
                .output_dir
                .join(format!("{DOWNLOAD_LOG_PREFIX}{}.log", self.stamp)),
        }
    }

    pub fn write(&self, errors: &ErrorCollector) -> Result<ReportPaths, EnteroError> {
        let paths = self.paths();
        write_log(&paths.lookup_log, errors.lookup_errors())?;
        write_log(&paths.download_log, errors.download_errors())?;
        info!(
            lookup_errors = errors.lookup_errors().len(),
            download_errors = errors.download_errors().len(),
            "error logs written"
        );
        Ok(paths)
    }
}

fn write_log(path: &Utf8Path, records: &[ErrorRecord]) -> Result<(), EnteroError> {
    let mut content = String::new();
    for record in records {
        content.push_str(&record.to_line());
        content.push('\n');
    }
    fs::write(path.as_std_path(), content)
        .map_err(|err| EnteroError::Filesystem(format!("write {path}: {err}")))
}
