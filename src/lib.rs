pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod report;
pub mod target;
pub mod utils;

// Re-export main types for easier access
pub use capture::{Capturer, ChromiumCapturer};
pub use config::ScanConfig;
pub use engine::{ScanOutcome, Scanner};
pub use error::{ScanError, ScanResult};
pub use fetch::{FetchedPage, Fetcher, ProxiedFetcher};
pub use report::{ReportLevel, ReportWriter};
pub use target::load_targets;
