use nt_core::{Article, Result, Source, SourcePage};
use url::Url;

use crate::page::Page;

pub mod cascade;
pub mod extract;
pub mod france;
pub mod jsonld;
pub mod profile;
pub mod sanitize;

pub use profile::SiteProfile;

use france::{AcrimedScraper, BastaScraper, DiploScraper, ReporterreScraper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub emoji: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    /// Stable identifier, used as the seeded `Source::id`.
    pub id: i64,
    pub name: &'static str,
    pub emoji: &'static str,
    pub region: Region,
}

/// A publisher adapter. Implementors provide their [`SiteProfile`] and
/// metadata; every extraction operation defaults to the shared logic in
/// [`extract`] driven by that profile.
pub trait Scraper: Send + Sync {
    fn profile(&self) -> &'static SiteProfile;

    fn source_metadata(&self) -> SourceMetadata;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    /// Returns true if the URL belongs to this publisher's host (or one of
    /// its subdomains).
    fn can_handle(&self, url: &str) -> bool {
        let host = self.profile().host;
        Url::parse(url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .is_some_and(|h| h == host || h.ends_with(&format!(".{host}")))
    }

    fn base_url(&self) -> &'static str {
        self.profile().base_url
    }

    fn feed_url(&self) -> String {
        self.profile().feed_url()
    }

    fn listing_urls(&self) -> Vec<String> {
        self.profile().listing_urls()
    }

    fn page_urls(&self) -> Vec<String> {
        self.profile().page_urls()
    }

    fn source(&self) -> Source {
        let meta = self.source_metadata();
        Source::new(meta.id, meta.name, self.base_url())
    }

    fn extract_article(&self, page: &Page) -> Result<Article> {
        extract::extract_article(self.profile(), page)
    }

    fn extract_article_into(&self, page: &Page, article: &mut Article) -> Result<()> {
        extract::extract_article_into(self.profile(), page, article)
    }

    fn extract_category_listing(&self, page: &Page) -> Result<Vec<Article>> {
        extract::extract_category_listing(self.profile(), page)
    }

    fn next_listing_page(&self, page: &Page) -> Result<Option<String>> {
        extract::next_listing_page(self.profile(), page)
    }

    fn extract_source_pages(&self, page: &Page) -> Result<Vec<SourcePage>> {
        extract::extract_source_pages(self.profile(), page)
    }

    fn complete_source_page(&self, stub: &mut SourcePage, page: &Page) -> Result<()> {
        extract::complete_source_page(self.profile(), stub, page)
    }
}

pub type BoxedScraper = Box<dyn Scraper>;
pub type ScraperFactory = fn() -> BoxedScraper;

pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        (|| Box::new(ReporterreScraper::new()) as BoxedScraper) as ScraperFactory,
        (|| Box::new(BastaScraper::new()) as BoxedScraper) as ScraperFactory,
        (|| Box::new(AcrimedScraper::new()) as BoxedScraper) as ScraperFactory,
        (|| Box::new(DiploScraper::new()) as BoxedScraper) as ScraperFactory,
    ]
}

/// The fixed publisher set, as rows to seed storage with.
pub fn seed_sources() -> Vec<Source> {
    get_scraper_factories()
        .into_iter()
        .map(|factory| factory().source())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_sources_have_unique_ids_and_names() {
        let sources = seed_sources();
        assert_eq!(sources.len(), 4);

        let ids: HashSet<_> = sources.iter().map(|s| s.id).collect();
        let names: HashSet<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(ids.len(), sources.len());
        assert_eq!(names.len(), sources.len());
        assert!(sources.iter().all(|s| s.is_enabled && s.url.ends_with('/')));
    }

    #[test]
    fn test_every_profile_compiles() {
        for factory in get_scraper_factories() {
            let scraper = factory();
            let name = scraper.source_metadata().name;
            if let Err(e) = scraper.profile().validate() {
                panic!("{name}: {e}");
            }
        }
    }

    #[test]
    fn test_can_handle_matches_hosts_only() {
        let scrapers: Vec<_> = get_scraper_factories().into_iter().map(|f| f()).collect();
        let handling = |url: &str| {
            scrapers
                .iter()
                .filter(|s| s.can_handle(url))
                .map(|s| s.source_metadata().name)
                .collect::<Vec<_>>()
        };

        assert_eq!(handling("https://reporterre.net/Un-article"), vec!["Reporterre"]);
        assert_eq!(handling("https://www.monde-diplomatique.fr/2020/10/X/62288"), vec!["Le Monde diplomatique"]);
        assert!(handling("https://example.com/reporterre.net").is_empty());
        assert!(handling("not a url").is_empty());
    }
}
