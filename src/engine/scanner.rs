// src/engine/scanner.rs
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

use crate::capture::Capturer;
use crate::config::ScanConfig;
use crate::engine::outcome::ScanOutcome;
use crate::error::{ScanError, ScanResult};
use crate::fetch::Fetcher;
use crate::report::ReportWriter;
use crate::utils::html::extract_title;
use crate::utils::sanitize::sanitize;

const PAGE_FILE: &str = "index.html";
const SCREENSHOT_FILE: &str = "screenshot.png";

/// Upper bound on collision-suffix attempts for one directory name.
const MAX_DIR_ATTEMPTS: u32 = 1000;

/// Orchestrates one scan task per target with a bounded fan-out and a
/// join barrier: `run` returns only after every task has finished.
pub struct Scanner {
    config: Arc<ScanConfig>,
    fetcher: Arc<dyn Fetcher>,
    capturer: Arc<dyn Capturer>,
    report: Arc<ReportWriter>,
    semaphore: Arc<Semaphore>,
}

impl Scanner {
    pub fn new(
        config: Arc<ScanConfig>,
        fetcher: Arc<dyn Fetcher>,
        capturer: Arc<dyn Capturer>,
        report: Arc<ReportWriter>,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency()));
        Self {
            config,
            fetcher,
            capturer,
            report,
            semaphore,
        }
    }

    /// Scan every target concurrently and wait for all of them.
    ///
    /// Each task is independent; a failing target never affects another.
    /// Exactly one `ScanOutcome` comes back per target, and exactly one
    /// report line is appended per target.
    pub async fn run(&self, targets: &[String]) -> Vec<ScanOutcome> {
        if targets.is_empty() {
            info!("No targets to scan");
            return Vec::new();
        }

        let total = targets.len();
        info!(
            "Scanning {} targets with max concurrency {}",
            total,
            self.config.concurrency()
        );

        // Full capacity so no send can block while tasks are awaited.
        let (tx, mut rx) = mpsc::channel(total);
        let mut handles = Vec::with_capacity(total);

        for (index, target) in targets.iter().enumerate() {
            let target = target.clone();
            let tx = tx.clone();
            let semaphore = self.semaphore.clone();
            let config = self.config.clone();
            let fetcher = self.fetcher.clone();
            let capturer = self.capturer.clone();
            let report = self.report.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");

                info!("[{}/{}] Scanning {}", index + 1, total, target);
                let outcome =
                    Self::scan_target(&config, fetcher.as_ref(), capturer.as_ref(), &target).await;

                if let Err(e) = report
                    .append(outcome.level(), &target, &outcome.details())
                    .await
                {
                    warn!("Failed to record outcome for {}: {}", target, e);
                }

                tx.send(outcome).await.ok();
            }));
        }
        drop(tx);

        // Join barrier: every task completes before results are returned.
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Scan task panicked: {}", e);
            }
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!("All scans completed: {}/{} succeeded", succeeded, total);
        outcomes
    }

    /// Per-target state machine: fetch, name, create directory, persist
    /// page content, capture, persist screenshot. Every failure is
    /// terminal for this target only.
    async fn scan_target(
        config: &ScanConfig,
        fetcher: &dyn Fetcher,
        capturer: &dyn Capturer,
        target: &str,
    ) -> ScanOutcome {
        let page = match fetcher.fetch(target).await {
            Ok(page) => page,
            Err(e) => {
                error!("Request error for {}: {}", target, e);
                return ScanOutcome::FetchFailed {
                    target: target.to_string(),
                    error: e.to_string(),
                };
            }
        };
        debug!(
            "Response status for {}: {} ({} bytes)",
            target,
            page.status,
            page.body.len()
        );

        let title = extract_title(&String::from_utf8_lossy(&page.body));
        let safe_title = sanitize(&title);
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let dir_base = format!("{}_{}", safe_title, timestamp);

        let dir = match create_output_dir(&config.output_dir, &dir_base) {
            Ok(dir) => dir,
            Err(e) => {
                error!("Error creating folder for {}: {}", target, e);
                return ScanOutcome::DirectoryFailed {
                    target: target.to_string(),
                    error: e.to_string(),
                };
            }
        };

        // Page content goes down first so a capture failure can never
        // lose it.
        if let Err(e) = tokio::fs::write(dir.join(PAGE_FILE), &page.body).await {
            error!("Error writing page content for {}: {}", target, e);
            return ScanOutcome::DirectoryFailed {
                target: target.to_string(),
                error: format!("Failed to write {}: {}", PAGE_FILE, e),
            };
        }

        info!("Screenshotting {}", target);
        match capturer.capture(target).await {
            Ok(image) => {
                let path = dir.join(SCREENSHOT_FILE);
                if let Err(e) = tokio::fs::write(&path, &image).await {
                    warn!("Error saving screenshot for {}: {}", target, e);
                    return ScanOutcome::CaptureFailed {
                        target: target.to_string(),
                        error: format!("Failed to write {}: {}", SCREENSHOT_FILE, e),
                    };
                }
                info!("Screenshot saved: {}", path.display());
            }
            Err(e) => {
                warn!("Screenshot error for {}: {}", target, e);
                return ScanOutcome::CaptureFailed {
                    target: target.to_string(),
                    error: e.to_string(),
                };
            }
        }

        ScanOutcome::Success {
            target: target.to_string(),
            title,
            byte_size: page.body.len(),
            screenshot_taken: true,
        }
    }
}

/// Create a per-target output directory under `root`.
///
/// `create_dir` is atomic, so same-second collisions between identical
/// sanitized titles are resolved deterministically by suffixing `_2`,
/// `_3`, ... until creation succeeds.
fn create_output_dir(root: &Path, base_name: &str) -> ScanResult<PathBuf> {
    for attempt in 1..=MAX_DIR_ATTEMPTS {
        let name = if attempt == 1 {
            base_name.to_string()
        } else {
            format!("{}_{}", base_name, attempt)
        };
        let path = root.join(name);

        match std::fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ScanError::Directory {
                    path,
                    message: e.to_string(),
                })
            }
        }
    }

    Err(ScanError::Directory {
        path: root.join(base_name),
        message: format!("Gave up after {} name collisions", MAX_DIR_ATTEMPTS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockCapturer;
    use crate::fetch::{FetchedPage, MockFetcher};
    use crate::report::ReportWriter;

    fn test_config(dir: &Path) -> Arc<ScanConfig> {
        let mut config = ScanConfig::default();
        config.output_dir = dir.join("scans");
        config.report_file = dir.join("scan_report.txt");
        std::fs::create_dir_all(&config.output_dir).unwrap();
        Arc::new(config)
    }

    fn page(html: &str) -> FetchedPage {
        FetchedPage {
            body: html.as_bytes().to_vec(),
            status: 200,
        }
    }

    fn scanner(
        config: Arc<ScanConfig>,
        fetcher: MockFetcher,
        capturer: MockCapturer,
    ) -> Scanner {
        let report = Arc::new(ReportWriter::open(&config.report_file).unwrap());
        Scanner::new(config, Arc::new(fetcher), Arc::new(capturer), report)
    }

    fn scan_dirs(config: &ScanConfig) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&config.output_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        dirs.sort();
        dirs
    }

    #[tokio::test]
    async fn test_success_path_persists_artifacts_and_logs() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(page("<html><title>My Page</title></html>")));

        let mut capturer = MockCapturer::new();
        capturer.expect_capture().returning(|_| Ok(vec![1, 2, 3]));

        let scanner = scanner(config.clone(), fetcher, capturer);
        let outcomes = scanner.run(&["http://a.onion".to_string()]).await;

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            ScanOutcome::Success { title, byte_size, screenshot_taken: true, .. }
                if title.as_str() == "My Page" && *byte_size == 35
        ));

        let dirs = scan_dirs(&config);
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0]
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("My_Page_"));

        let html = std::fs::read(dirs[0].join(PAGE_FILE)).unwrap();
        assert_eq!(html, b"<html><title>My Page</title></html>");
        let shot = std::fs::read(dirs[0].join(SCREENSHOT_FILE)).unwrap();
        assert_eq!(shot, vec![1, 2, 3]);

        let report = std::fs::read_to_string(&config.report_file).unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.contains("SUCCESS"));
        assert!(report.contains("Title: My Page"));
    }

    #[tokio::test]
    async fn test_fetch_failure_creates_no_directory_and_isolates_others() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().returning(|target| {
            if target.contains("dead") {
                Err(ScanError::Fetch("connection refused".into()))
            } else {
                Ok(page("<title>Alive</title>"))
            }
        });

        let mut capturer = MockCapturer::new();
        capturer.expect_capture().returning(|_| Ok(vec![9]));

        let scanner = scanner(config.clone(), fetcher, capturer);
        let outcomes = scanner
            .run(&[
                "http://dead.onion".to_string(),
                "http://alive.onion".to_string(),
            ])
            .await;

        assert_eq!(outcomes.len(), 2);
        let dead = outcomes
            .iter()
            .find(|o| o.target() == "http://dead.onion")
            .unwrap();
        let alive = outcomes
            .iter()
            .find(|o| o.target() == "http://alive.onion")
            .unwrap();
        assert!(matches!(dead, ScanOutcome::FetchFailed { .. }));
        assert!(alive.is_success());

        // Only the live target produced a directory.
        let dirs = scan_dirs(&config);
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0]
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("Alive_"));

        let report = std::fs::read_to_string(&config.report_file).unwrap();
        assert_eq!(report.lines().count(), 2);
        assert!(report.contains("ERROR"));
        assert!(report.contains("Fetch Failed: Fetch failed: connection refused"));
        assert!(report.contains("SUCCESS"));
    }

    #[tokio::test]
    async fn test_capture_failure_preserves_page_content() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(page("<title>Partial</title>")));

        let mut capturer = MockCapturer::new();
        capturer.expect_capture().returning(|_| {
            Err(ScanError::Timeout {
                operation: "capture http://a.onion".into(),
                seconds: 45,
            })
        });

        let scanner = scanner(config.clone(), fetcher, capturer);
        let outcomes = scanner.run(&["http://a.onion".to_string()]).await;

        assert!(matches!(&outcomes[0], ScanOutcome::CaptureFailed { .. }));

        // Directory and page content survive the capture failure.
        let dirs = scan_dirs(&config);
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].join(PAGE_FILE).exists());
        assert!(!dirs[0].join(SCREENSHOT_FILE).exists());

        let report = std::fs::read_to_string(&config.report_file).unwrap();
        assert_eq!(report.lines().count(), 1);
        assert!(report.contains("WARNING"));
        assert!(report.contains("Screenshot Failed:"));
    }

    #[tokio::test]
    async fn test_join_barrier_yields_one_outcome_per_target() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(8)
            .returning(|_| Ok(page("<title>N</title>")));

        let mut capturer = MockCapturer::new();
        capturer.expect_capture().times(8).returning(|_| Ok(vec![0]));

        let scanner = scanner(config.clone(), fetcher, capturer);
        let targets: Vec<String> = (0..8).map(|i| format!("http://t{}.onion", i)).collect();
        let outcomes = scanner.run(&targets).await;

        assert_eq!(outcomes.len(), 8);
        let report = std::fs::read_to_string(&config.report_file).unwrap();
        assert_eq!(report.lines().count(), 8);
    }

    #[tokio::test]
    async fn test_same_second_title_collision_gets_distinct_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(page("<title>Same</title>")));

        let mut capturer = MockCapturer::new();
        capturer.expect_capture().returning(|_| Ok(vec![0]));

        let scanner = scanner(config.clone(), fetcher, capturer);
        let outcomes = scanner
            .run(&[
                "http://one.onion".to_string(),
                "http://two.onion".to_string(),
            ])
            .await;

        assert!(outcomes.iter().all(|o| o.is_success()));
        let dirs = scan_dirs(&config);
        assert_eq!(dirs.len(), 2);
        assert_ne!(dirs[0], dirs[1]);
    }

    #[tokio::test]
    async fn test_empty_target_list_is_a_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let scanner = scanner(config.clone(), MockFetcher::new(), MockCapturer::new());
        let outcomes = scanner.run(&[]).await;

        assert!(outcomes.is_empty());
        assert!(scan_dirs(&config).is_empty());
    }

    #[test]
    fn test_create_output_dir_suffixes_on_collision() {
        let tmp = tempfile::tempdir().unwrap();

        let first = create_output_dir(tmp.path(), "Same_20240101_000000").unwrap();
        let second = create_output_dir(tmp.path(), "Same_20240101_000000").unwrap();
        let third = create_output_dir(tmp.path(), "Same_20240101_000000").unwrap();

        assert_eq!(first.file_name().unwrap(), "Same_20240101_000000");
        assert_eq!(second.file_name().unwrap(), "Same_20240101_000000_2");
        assert_eq!(third.file_name().unwrap(), "Same_20240101_000000_3");
    }

    #[test]
    fn test_create_output_dir_fails_on_missing_root() {
        let err = create_output_dir(Path::new("/nonexistent/root"), "x").unwrap_err();
        assert!(matches!(err, ScanError::Directory { .. }));
    }
}
