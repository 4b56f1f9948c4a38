// src/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, Proxy};
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};

/// A fetched page: raw body bytes plus the response status.
///
/// Non-2xx statuses are still fetch successes at this layer; the status is
/// only logged downstream.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: Vec<u8>,
    pub status: u16,
}

/// Retrieval of raw resource bytes for a target.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &str) -> ScanResult<FetchedPage>;
}

/// HTTP fetcher routing every request through a SOCKS5 proxy.
#[derive(Debug)]
pub struct ProxiedFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ProxiedFetcher {
    /// Build one client bound to the configured proxy endpoint.
    ///
    /// `socks5h` so hostname resolution happens on the proxy side, which
    /// `.onion` addresses require. The timeout covers connect and full
    /// body read. Single attempt per target, no retry.
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let proxy = Proxy::all(format!("socks5h://{}", config.proxy_addr))
            .map_err(|e| ScanError::Config(format!("Invalid proxy endpoint: {}", e)))?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ScanError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs: config.fetch_timeout_secs,
        })
    }
}

#[async_trait]
impl Fetcher for ProxiedFetcher {
    async fn fetch(&self, target: &str) -> ScanResult<FetchedPage> {
        debug!("GET {}", target);

        let response = self.client.get(target).send().await.map_err(|e| {
            if e.is_timeout() {
                ScanError::Timeout {
                    operation: format!("fetch {}", target),
                    seconds: self.timeout_secs,
                }
            } else {
                ScanError::Fetch(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScanError::Timeout {
                        operation: format!("fetch {}", target),
                        seconds: self.timeout_secs,
                    }
                } else {
                    ScanError::Fetch(format!("Error reading response body: {}", e))
                }
            })?
            .to_vec();

        debug!("Fetched {} ({} bytes, status {})", target, body.len(), status);
        Ok(FetchedPage { body, status })
    }
}
