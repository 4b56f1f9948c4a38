use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read target list {path:?}: {message}")]
    TargetList {
        path: PathBuf,
        message: String,
    },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Failed to create output directory {path:?}: {message}")]
    Directory {
        path: PathBuf,
        message: String,
    },

    #[error("Report write failed: {0}")]
    Report(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout: {operation} exceeded {seconds} seconds")]
    Timeout {
        operation: String,
        seconds: u64,
    },
}

pub type ScanResult<T> = std::result::Result<T, ScanError>;
