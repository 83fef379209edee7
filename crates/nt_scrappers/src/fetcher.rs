use async_trait::async_trait;
use nt_core::{Error, Result};
use reqwest::Client;
use tracing::debug;

use crate::config::ScrapeConfig;

/// Network transport. Returns the raw body of a successful response.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("{}: HTTP {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}
