use std::fs;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};

use crate::domain::Database;
use crate::enterobase::DEFAULT_SERVER;
use crate::error::EnteroError;
use crate::pacing::{DEFAULT_INTERVAL_SECS, RateLimiter};
use crate::report::TIMESTAMP_FORMAT;

pub const DEFAULT_OUTPUT_PREFIX: &str = "Enterobase_Assemblies";

/// Options as typed on the command line, before validation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub database: String,
    pub output_dir: Option<PathBuf>,
    pub append_barcode: bool,
    pub interval_secs: i64,
    pub server: String,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            database: Database::default().to_string(),
            output_dir: None,
            append_barcode: false,
            interval_secs: DEFAULT_INTERVAL_SECS as i64,
            server: DEFAULT_SERVER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub database: Database,
    pub output_dir: Utf8PathBuf,
    pub append_barcode: bool,
    pub rate_limiter: RateLimiter,
    pub server: String,
    pub started_at: DateTime<Local>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        options: RunOptions,
        started_at: DateTime<Local>,
    ) -> Result<RunConfig, EnteroError> {
        let database: Database = options.database.parse()?;

        if !options.input.is_file() {
            return Err(EnteroError::MissingInput(options.input));
        }

        let output_dir = match options.output_dir {
            Some(path) => Utf8PathBuf::from_path_buf(path)
                .map_err(|_| EnteroError::Filesystem("non-utf8 output directory".to_string()))?,
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|err| EnteroError::Filesystem(err.to_string()))?;
                let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|_| {
                    EnteroError::Filesystem("invalid working directory".to_string())
                })?;
                default_output_dir(&cwd, started_at)
            }
        };

        Ok(RunConfig {
            input: options.input,
            database,
            output_dir,
            append_barcode: options.append_barcode,
            rate_limiter: RateLimiter::from_secs(options.interval_secs),
            server: options.server,
            started_at,
        })
    }

    pub fn ensure_output_dir(config: &RunConfig) -> Result<(), EnteroError> {
        fs::create_dir_all(config.output_dir.as_std_path()).map_err(|err| {
            EnteroError::Filesystem(format!(
                "create output directory {}: {err}",
                config.output_dir
            ))
        })
    }
}

pub fn default_output_dir(cwd: &Utf8Path, started_at: DateTime<Local>) -> Utf8PathBuf {
    cwd.join(format!(
        "{DEFAULT_OUTPUT_PREFIX}{}",
        started_at.format(TIMESTAMP_FORMAT)
    ))
}
