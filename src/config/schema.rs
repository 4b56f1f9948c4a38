use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Scan run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// SOCKS5 proxy endpoint (`host:port`) routing all outbound traffic.
    pub proxy_addr: String,

    /// Root directory receiving one subdirectory per fetched target.
    pub output_dir: PathBuf,

    /// Append-only report file shared by all scan tasks.
    pub report_file: PathBuf,

    /// Overall fetch timeout per target, in seconds.
    pub fetch_timeout_secs: u64,

    /// Hard deadline on a single capture, in seconds.
    pub capture_timeout_secs: u64,

    /// Settle delay between navigation and screenshot, in milliseconds.
    pub settle_delay_ms: u64,

    /// Maximum simultaneous scan tasks; 0 means one per CPU.
    pub max_concurrent_scans: usize,

    /// Skip certificate validation on both the fetch and render paths.
    pub accept_invalid_certs: bool,

    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            proxy_addr: "127.0.0.1:9050".to_string(),
            output_dir: PathBuf::from("scans"),
            report_file: PathBuf::from("scan_report.txt"),
            fetch_timeout_secs: 20,
            capture_timeout_secs: 45,
            settle_delay_ms: 2000,
            max_concurrent_scans: 8,
            accept_invalid_certs: true,
            user_agent: format!("torscout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScanConfig {
    /// Effective concurrency cap, resolving the `0 = auto` sentinel.
    pub fn concurrency(&self) -> usize {
        if self.max_concurrent_scans == 0 {
            num_cpus::get()
        } else {
            self.max_concurrent_scans
        }
    }

    /// Load configuration from a file or the defaults.
    pub fn load(config_path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        crate::config::loader::load_config(config_path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config_str)?;
        Ok(())
    }
}
