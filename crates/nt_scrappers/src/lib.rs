pub mod cli;
pub mod config;
pub mod feed;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod page;
pub mod scrapers;
pub mod toolkit;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use config::ScrapeConfig;
pub use fetcher::{Fetcher, HttpFetcher};
pub use manager::{IngestReport, ScraperManager};
pub use page::Page;
pub use scrapers::{get_scraper_factories, seed_sources, Scraper, SiteProfile};

pub mod prelude {
    pub use super::page::Page;
    pub use super::scrapers::Scraper;
    pub use nt_core::{Article, Error, Result, Source, SourcePage};
}
