// src/capture/mod.rs
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ScanResult;

pub mod chromium;

pub use chromium::ChromiumCapturer;

/// Rendering a target in an isolated browser session and producing a
/// visual snapshot. Failure domain independent from fetching: the
/// orchestrator keeps already-fetched content whatever happens here.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Capturer: Send + Sync {
    async fn capture(&self, target: &str) -> ScanResult<Vec<u8>>;
}
