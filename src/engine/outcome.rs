// src/engine/outcome.rs
use crate::report::ReportLevel;

/// Terminal result of scanning one target. Exactly one per target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Success {
        target: String,
        title: String,
        byte_size: usize,
        screenshot_taken: bool,
    },
    FetchFailed {
        target: String,
        error: String,
    },
    DirectoryFailed {
        target: String,
        error: String,
    },
    CaptureFailed {
        target: String,
        error: String,
    },
}

impl ScanOutcome {
    pub fn target(&self) -> &str {
        match self {
            ScanOutcome::Success { target, .. }
            | ScanOutcome::FetchFailed { target, .. }
            | ScanOutcome::DirectoryFailed { target, .. }
            | ScanOutcome::CaptureFailed { target, .. } => target,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    /// Report severity for this outcome. Every terminal outcome is
    /// durably recorded, success and failure alike.
    pub fn level(&self) -> ReportLevel {
        match self {
            ScanOutcome::Success { .. } => ReportLevel::Success,
            ScanOutcome::CaptureFailed { .. } => ReportLevel::Warning,
            ScanOutcome::FetchFailed { .. } | ScanOutcome::DirectoryFailed { .. } => {
                ReportLevel::Error
            }
        }
    }

    /// Details column of the report line.
    pub fn details(&self) -> String {
        match self {
            ScanOutcome::Success {
                title, byte_size, ..
            } => format!("Title: {}  Size: {}", title, byte_size),
            ScanOutcome::FetchFailed { error, .. } => format!("Fetch Failed: {}", error),
            ScanOutcome::DirectoryFailed { error, .. } => format!("Directory Failed: {}", error),
            ScanOutcome::CaptureFailed { error, .. } => format!("Screenshot Failed: {}", error),
        }
    }
}
