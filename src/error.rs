//! Reporter error types

use std::path::PathBuf;
use thiserror::Error;

/// Broad failure classes surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputNotFound,
    InsufficientData,
    UnexpectedFailure,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("trade log not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("not enough trades to evaluate ({buys} buys, {sells} sells)")]
    InsufficientData { buys: usize, sells: usize },

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound { .. } => ErrorKind::InputNotFound,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            _ => ErrorKind::UnexpectedFailure,
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
