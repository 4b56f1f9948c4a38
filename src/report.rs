// src/report.rs
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ScanError, ScanResult};

/// Severity of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Success,
    Warning,
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            ReportLevel::Success => "SUCCESS",
            ReportLevel::Warning => "WARNING",
            ReportLevel::Error => "ERROR",
        };
        // pad() so width specifiers on the caller side apply.
        f.pad(level)
    }
}

/// The single durable outcome log for a run.
///
/// All scan tasks share one writer; a single mutex serializes appends so
/// lines are never interleaved or lost. The lock is held for exactly one
/// line. Line order reflects completion order, not input order.
pub struct ReportWriter {
    file: Mutex<File>,
}

impl ReportWriter {
    /// Open the report file in append mode, creating it if absent.
    pub fn open(path: &Path) -> ScanResult<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| ScanError::Report(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append one report line:
    /// `[<timestamp>] <LEVEL>  <target>  <details>`.
    pub async fn append(&self, level: ReportLevel, target: &str, details: &str) -> ScanResult<()> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] {:7}  {}  {}\n", now, level, target, details);

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .map_err(|e| ScanError::Report(e.to_string()))?;

        debug!("Report entry: {} {}", level, target);
        Ok(())
    }
}
