use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::TokenManager;
use crate::config::RunConfig;
use crate::domain::{BarcodeEntry, Credentials, Database};
use crate::enterobase::EnterobaseClient;
use crate::error::EnteroError;
use crate::pacing::RateLimiter;
use crate::registry::BarcodeRegistry;
use crate::report::{DownloadError, ErrorCollector, ErrorRecord, LookupError, ReportWriter};
use crate::store::AssemblyStore;

/// Result of the resolve/download exchange for one barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success {
        download_url: String,
        bytes: Vec<u8>,
    },
    LookupFailed {
        query_url: String,
        reason: String,
        status: Option<u16>,
    },
    DownloadFailed {
        download_url: String,
        reason: String,
        status: Option<u16>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Downloaded { path: Utf8PathBuf },
    LookupFailed,
    DownloadFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResult {
    pub name: String,
    pub barcode: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub database: Database,
    pub output_dir: Utf8PathBuf,
    pub processed: usize,
    pub entries: Vec<EntryResult>,
    pub lookup_errors: Vec<ErrorRecord>,
    pub download_errors: Vec<ErrorRecord>,
    pub lookup_log: Utf8PathBuf,
    pub download_log: Utf8PathBuf,
}

impl RunSummary {
    pub fn downloaded(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, EntryStatus::Downloaded { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Drives the per-barcode resolve -> download exchange over a whole registry.
pub struct AssemblyFetcher<C: EnterobaseClient> {
    client: C,
    tokens: TokenManager,
    database: Database,
    store: AssemblyStore,
    limiter: RateLimiter,
    report: ReportWriter,
    errors: ErrorCollector,
}

impl<C: EnterobaseClient> AssemblyFetcher<C> {
    pub fn new(client: C, credentials: Credentials, config: &RunConfig) -> Self {
        Self {
            client,
            tokens: TokenManager::new(credentials),
            database: config.database,
            store: AssemblyStore::new(config.output_dir.clone(), config.append_barcode),
            limiter: config.rate_limiter,
            report: ReportWriter::new(&config.output_dir, config.started_at),
            errors: ErrorCollector::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    /// Runs both phases for one entry. Only a failed login is returned as `Err`;
    /// every other failure is folded into the outcome.
    pub fn fetch_entry(&mut self, entry: &BarcodeEntry) -> Result<FetchOutcome, EnteroError> {
        let query_url = self.client.assemblies_url(self.database, &entry.barcode);
        let token = self.tokens.token(&self.client)?;

        let search = match self.client.search_assemblies(token, &query_url) {
            Ok(search) => search,
            Err(err) => {
                return Ok(FetchOutcome::LookupFailed {
                    query_url,
                    status: err.status(),
                    reason: err.to_string(),
                });
            }
        };
        let Some(download_url) = search.first_download_link().map(str::to_string) else {
            return Ok(FetchOutcome::LookupFailed {
                reason: EnteroError::AssemblyNotFound(entry.barcode.clone()).to_string(),
                query_url,
                status: None,
            });
        };

        match self.client.download(token, &download_url) {
            Ok(bytes) => Ok(FetchOutcome::Success {
                download_url,
                bytes,
            }),
            Err(err) => Ok(FetchOutcome::DownloadFailed {
                download_url,
                status: err.status(),
                reason: err.to_string(),
            }),
        }
    }

    /// Fetches one entry, stores the file on success and records any failure.
    pub fn process_entry(&mut self, entry: &BarcodeEntry) -> Result<EntryStatus, EnteroError> {
        match self.fetch_entry(entry)? {
            FetchOutcome::Success {
                download_url,
                bytes,
            } => match self.store.write_assembly(entry, &bytes) {
                Ok(path) => {
                    info!(name = %entry.name, barcode = %entry.barcode, %path, "assembly saved");
                    Ok(EntryStatus::Downloaded { path })
                }
                Err(err) => {
                    self.record_download_failure(entry, download_url, err.to_string());
                    Ok(EntryStatus::DownloadFailed)
                }
            },
            FetchOutcome::LookupFailed {
                query_url, reason, ..
            } => {
                warn!(name = %entry.name, barcode = %entry.barcode, %reason, "assembly lookup failed");
                self.errors.record_lookup_error(LookupError {
                    name: entry.name.clone(),
                    barcode: entry.barcode.clone(),
                    query_url,
                    reason,
                });
                Ok(EntryStatus::LookupFailed)
            }
            FetchOutcome::DownloadFailed {
                download_url,
                reason,
                ..
            } => {
                self.record_download_failure(entry, download_url, reason);
                Ok(EntryStatus::DownloadFailed)
            }
        }
    }

    /// Processes every entry in registry order, pausing after each one, then
    /// writes both error logs.
    pub fn run(
        mut self,
        registry: &BarcodeRegistry,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, EnteroError> {
        info!(
            entries = registry.len(),
            database = %self.database,
            output_dir = %self.store.root(),
            "starting assembly downloads"
        );
        let mut entries = Vec::with_capacity(registry.len());
        for (idx, entry) in registry.iter().enumerate() {
            let start = Instant::now();
            let status = self.process_entry(entry)?;
            sink.event(ProgressEvent {
                message: format!(
                    "Progress: {} with barcode {} ({} in total) has been processed.",
                    entry.name,
                    entry.barcode,
                    idx + 1
                ),
                elapsed: Some(start.elapsed()),
            });
            entries.push(EntryResult {
                name: entry.name.clone(),
                barcode: entry.barcode.clone(),
                status,
            });
            self.limiter.wait();
        }

        let paths = self.report.write(&self.errors)?;
        Ok(RunSummary {
            database: self.database,
            output_dir: self.store.root().to_owned(),
            processed: entries.len(),
            entries,
            lookup_errors: self.errors.lookup_errors().to_vec(),
            download_errors: self.errors.download_errors().to_vec(),
            lookup_log: paths.lookup_log,
            download_log: paths.download_log,
        })
    }

    fn record_download_failure(&mut self, entry: &BarcodeEntry, download_url: String, reason: String) {
        warn!(name = %entry.name, barcode = %entry.barcode, %reason, "assembly download failed");
        self.errors.record_download_error(DownloadError {
            name: entry.name.clone(),
            barcode: entry.barcode.clone(),
            download_url,
            reason,
        });
    }
}
