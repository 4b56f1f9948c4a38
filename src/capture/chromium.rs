// src/capture/chromium.rs
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::debug;

use crate::capture::Capturer;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};

/// Headless Chromium capturer.
///
/// Each capture launches an isolated browser routed through the SOCKS5
/// proxy, navigates, waits a fixed settle delay for dynamic content, takes
/// a full-page PNG and closes the browser. The whole operation is bounded
/// by a hard deadline.
pub struct ChromiumCapturer {
    proxy_addr: String,
    deadline_secs: u64,
    settle_delay: Duration,
    ignore_cert_errors: bool,
}

impl ChromiumCapturer {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            proxy_addr: config.proxy_addr.clone(),
            deadline_secs: config.capture_timeout_secs,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            ignore_cert_errors: config.accept_invalid_certs,
        }
    }

    async fn capture_inner(&self, target: &str) -> ScanResult<Vec<u8>> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--proxy-server=socks5://{}", self.proxy_addr))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if self.ignore_cert_errors {
            builder = builder.arg("--ignore-certificate-errors");
        }

        let config = builder
            .build()
            .map_err(ScanError::Capture)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Capture(format!("Browser launch failed: {}", e)))?;

        // Drain browser events until the session ends.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = Self::navigate_and_shoot(&browser, target, self.settle_delay).await;

        browser.close().await.ok();
        browser.wait().await.ok();
        events.await.ok();

        result
    }

    async fn navigate_and_shoot(
        browser: &Browser,
        target: &str,
        settle_delay: Duration,
    ) -> ScanResult<Vec<u8>> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScanError::Capture(format!("Failed to open page: {}", e)))?;

        page.goto(target)
            .await
            .map_err(|e| ScanError::Capture(format!("Navigation failed: {}", e)))?;

        // Let dynamic content settle before shooting.
        tokio::time::sleep(settle_delay).await;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let bytes = page
            .screenshot(params)
            .await
            .map_err(|e| ScanError::Capture(format!("Screenshot failed: {}", e)))?;

        debug!("Captured {} ({} bytes)", target, bytes.len());
        Ok(bytes)
    }
}

#[async_trait]
impl Capturer for ChromiumCapturer {
    async fn capture(&self, target: &str) -> ScanResult<Vec<u8>> {
        enforce_deadline(
            format!("capture {}", target),
            self.deadline_secs,
            self.capture_inner(target),
        )
        .await
    }
}

/// Run a capture future under a hard deadline, mapping expiry to
/// `ScanError::Timeout`.
///
/// On expiry the in-flight future is dropped before its own
/// close/wait runs; a browser launched by it is reaped through
/// `Browser`'s `Drop`, which kills the child process.
async fn enforce_deadline<T>(
    operation: String,
    seconds: u64,
    fut: impl Future<Output = ScanResult<T>>,
) -> ScanResult<T> {
    tokio::time::timeout(Duration::from_secs(seconds), fut)
        .await
        .map_err(|_| ScanError::Timeout { operation, seconds })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_maps_to_timeout_error() {
        let err = enforce_deadline(
            "capture http://a.onion".to_string(),
            45,
            future::pending::<ScanResult<Vec<u8>>>(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScanError::Timeout { seconds: 45, .. }));
    }

    #[tokio::test]
    async fn test_completed_capture_passes_through() {
        let bytes = enforce_deadline("capture x".to_string(), 45, async { Ok(vec![1u8, 2]) })
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_inner_error_is_not_masked_as_timeout() {
        let err = enforce_deadline("capture x".to_string(), 45, async {
            Err::<Vec<u8>, _>(ScanError::Capture("render crashed".into()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ScanError::Capture(_)));
    }
}
