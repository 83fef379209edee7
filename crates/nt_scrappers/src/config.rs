use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("nt-scrappers/", env!("CARGO_PKG_VERSION"));

/// Knobs for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Maximum number of requests in flight across all sources.
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Pages followed per category listing, the first one included.
    pub max_listing_pages: usize,
    pub fetch_stylesheets: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            request_timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_listing_pages: 2,
            fetch_stylesheets: true,
        }
    }
}
