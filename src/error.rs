use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EnteroError {
    #[error("invalid database name: {0} (expected one of {valid})", valid = crate::domain::Database::names())]
    InvalidDatabase(String),

    #[error("could not find the barcode list at {0}")]
    MissingInput(PathBuf),

    #[error("failed to read barcode list at {0}")]
    InputRead(PathBuf),

    #[error("malformed barcode list line {line}: expected `name<TAB>barcode`, got {content:?}")]
    MalformedBarcodeLine { line: usize, content: String },

    #[error("Enterobase login failed with status {status}: {message}")]
    #[diagnostic(help("check your Enterobase username, password and API access for this database"))]
    Authentication { status: u16, message: String },

    #[error("Enterobase request failed: {0}")]
    Http(String),

    #[error("Enterobase returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected Enterobase response: {0}")]
    InvalidResponse(String),

    #[error("no assembly found for barcode {0}")]
    AssemblyNotFound(String),

    #[error("failed to read credentials: {0}")]
    Credentials(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl EnteroError {
    pub fn status(&self) -> Option<u16> {
        match self {
            EnteroError::Authentication { status, .. } | EnteroError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
