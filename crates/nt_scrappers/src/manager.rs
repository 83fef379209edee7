use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use nt_core::{Article, ArticleStatus, ArticleStorage, Css, Error, Result, Source, SourcePage};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ScrapeConfig;
use crate::feed;
use crate::fetcher::Fetcher;
use crate::logging::Logger;
use crate::page::Page;
use crate::scrapers::{get_scraper_factories, BoxedScraper, ScraperFactory, SourceMetadata};

/// Outcome of ingesting one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub pages: usize,
    pub stylesheets: usize,
    pub cancelled: bool,
}

impl IngestReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, status: ArticleStatus) {
        match status {
            ArticleStatus::New => self.new += 1,
            ArticleStatus::Updated => self.updated += 1,
            ArticleStatus::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.updated + self.unchanged
    }
}

pub struct ScraperManager {
    storage: Arc<dyn ArticleStorage>,
    fetcher: Arc<dyn Fetcher>,
    factories: Vec<ScraperFactory>,
    config: ScrapeConfig,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl ScraperManager {
    pub fn new(storage: Arc<dyn ArticleStorage>, fetcher: Arc<dyn Fetcher>, config: ScrapeConfig) -> Self {
        Self {
            storage,
            fetcher,
            factories: get_scraper_factories(),
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn get_scrapers(&self) -> Vec<BoxedScraper> {
        self.factories.iter().map(|f| f()).collect()
    }

    /// Cancelling the token stops scheduling further pages and sources.
    /// Work already stored stays valid.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn get_scraper_for_url(&self, url: &str) -> Result<BoxedScraper> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        self.factories
            .iter()
            .map(|factory| factory())
            .find(|scraper| scraper.can_handle(url))
            .ok_or_else(|| Error::Scraping(format!("No scraper found for URL: {}", url)))
    }

    /// `source` is `region` or `region/name`, e.g. `france/reporterre`.
    pub fn get_scrapers_for_source(&self, source: &str) -> Result<Vec<BoxedScraper>> {
        let (region, name) = parse_source(source)?;
        let scrapers: Vec<_> = self
            .get_scrapers()
            .into_iter()
            .filter(|scraper| scraper.source_metadata().region.name == region)
            .filter(|scraper| name.map_or(true, |name| scraper.cli_names().contains(&name)))
            .collect();

        if scrapers.is_empty() {
            return Err(Error::Scraping(format!("No scraper found for {}", source)));
        }
        Ok(scrapers)
    }

    /// Scrapers grouped by region name.
    pub fn get_all_scrapers(&self) -> BTreeMap<String, Vec<SourceMetadata>> {
        let mut scrapers: BTreeMap<String, Vec<SourceMetadata>> = BTreeMap::new();
        for scraper in self.get_scrapers() {
            let meta = scraper.source_metadata();
            scrapers.entry(meta.region.name.to_string()).or_default().push(meta);
        }
        scrapers
    }

    /// Fetches and extracts a single article, merged over what storage
    /// already holds for that url.
    pub async fn scrape_url(&self, url: &str) -> Result<(Article, ArticleStatus)> {
        let scraper = self.get_scraper_for_url(url)?;
        let source = scraper.source();
        let bytes = self.fetcher.fetch(url).await?;
        let page = Page::from_bytes(source.id, url, scraper.base_url(), &bytes);

        let mut article = self
            .storage
            .find_article(source.id, url)
            .await?
            .unwrap_or_else(|| Article::stub(source.id, &source.name, url));
        scraper.extract_article_into(&page, &mut article)?;

        let status = self.storage.upsert_article(&article).await?;
        Ok((article, status))
    }

    /// Ingests every enabled source.
    pub async fn scrape_all(&self) -> Result<Vec<IngestReport>> {
        self.run(self.get_scrapers()).await
    }

    /// Ingests the sources selected by `source` (see
    /// [`get_scrapers_for_source`](Self::get_scrapers_for_source)), or all of
    /// them.
    pub async fn scrape_source(&self, source: Option<&str>) -> Result<Vec<IngestReport>> {
        match source {
            Some(source) => self.run(self.get_scrapers_for_source(source)?).await,
            None => self.scrape_all().await,
        }
    }

    async fn run(&self, scrapers: Vec<BoxedScraper>) -> Result<Vec<IngestReport>> {
        let enabled: HashMap<i64, Source> = self
            .storage
            .sources()
            .await?
            .into_iter()
            .filter(|source| source.is_enabled)
            .map(|source| (source.id, source))
            .collect();

        let mut tasks = JoinSet::new();
        for scraper in scrapers {
            if self.cancel.is_cancelled() {
                break;
            }
            let meta = scraper.source_metadata();
            let Some(source) = enabled.get(&meta.id).cloned() else {
                tracing::info!("{} {} is disabled, skipping", meta.emoji, meta.name);
                continue;
            };
            let run = SourceRun {
                logger: Logger::new().with_new_prefixes(meta.emoji).with_prefix(meta.name),
                scraper,
                source,
                storage: self.storage.clone(),
                fetcher: self.fetcher.clone(),
                semaphore: self.semaphore.clone(),
                config: self.config.clone(),
                cancel: self.cancel.clone(),
            };
            tasks.spawn(run.ingest());
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("Source task failed: {}", e),
            }
        }
        reports.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(reports)
    }
}

fn parse_source(source: &str) -> Result<(&str, Option<&str>)> {
    let parts: Vec<&str> = source.split('/').collect();
    match parts.as_slice() {
        [region] if !region.is_empty() => Ok((*region, None)),
        [region, name] if !region.is_empty() && !name.is_empty() => Ok((*region, Some(*name))),
        _ => Err(Error::Scraping(format!(
            "Invalid source format: {} (expected region or region/name)",
            source
        ))),
    }
}

/// Everything one source task needs, owned so it can be spawned.
struct SourceRun {
    scraper: BoxedScraper,
    source: Source,
    storage: Arc<dyn ArticleStorage>,
    fetcher: Arc<dyn Fetcher>,
    semaphore: Arc<Semaphore>,
    config: ScrapeConfig,
    cancel: CancellationToken,
    logger: Logger,
}

impl SourceRun {
    async fn ingest(self) -> IngestReport {
        let mut report = IngestReport::new(&self.source.name);
        self.logger.info("Starting ingestion");

        let stubs = self.collect_stubs(&mut report).await;
        self.logger.debug(&format!("{} article candidates", stubs.len()));

        let results = join_all(stubs.into_iter().map(|stub| self.ingest_article(stub))).await;
        let mut css_urls = HashSet::new();
        for result in results {
            match result {
                Ok(Some((status, css_url))) => {
                    report.record(status);
                    if !css_url.is_empty() {
                        css_urls.insert(css_url);
                    }
                }
                Ok(None) => report.cancelled = true,
                Err(_) => report.failed += 1,
            }
        }

        for page in self.ingest_pages(&mut report).await {
            if !page.css_url.is_empty() {
                css_urls.insert(page.css_url);
            }
        }

        if self.config.fetch_stylesheets {
            self.ingest_stylesheets(css_urls, &mut report).await;
        }

        report.cancelled |= self.cancel.is_cancelled();
        self.logger.info(&format!(
            "{} new, {} updated, {} unchanged, {} failed, {} pages",
            report.new, report.updated, report.unchanged, report.failed, report.pages
        ));
        report
    }

    async fn fetch_page(&self, url: &str) -> Result<Page> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::External(e.into()))?;
        let bytes = self.fetcher.fetch(url).await?;
        Ok(Page::from_bytes(self.source.id, url, self.scraper.base_url(), &bytes))
    }

    /// Feed items first, then every listing page; the same url seen twice
    /// is merged into one stub.
    async fn collect_stubs(&self, report: &mut IngestReport) -> Vec<Article> {
        let mut stubs: Vec<Article> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut add = |stub: Article| match index.get(&stub.url) {
            Some(&i) => stubs[i].merge_from(stub),
            None => {
                index.insert(stub.url.clone(), stubs.len());
                stubs.push(stub);
            }
        };

        let feed_url = self.scraper.feed_url();
        match self.fetch_page(&feed_url).await {
            Ok(page) => match feed::parse_feed(page.html.as_bytes(), &self.source) {
                Ok(items) => items.into_iter().for_each(&mut add),
                Err(e) => {
                    self.logger.error(&format!("{}", e));
                    report.failed += 1;
                }
            },
            Err(e) => {
                self.logger.error(&format!("Failed to fetch feed: {}", e));
                report.failed += 1;
            }
        }

        for listing_url in self.scraper.listing_urls() {
            let mut next = Some(listing_url);
            let mut walked = 0;
            while let Some(url) = next.take() {
                if walked >= self.config.max_listing_pages || self.cancel.is_cancelled() {
                    break;
                }
                walked += 1;

                let page = match self.fetch_page(&url).await {
                    Ok(page) => page,
                    Err(e) => {
                        self.logger.warn(&format!("Failed to fetch listing: {}", e));
                        report.failed += 1;
                        break;
                    }
                };
                match self.scraper.extract_category_listing(&page) {
                    Ok(listed) => listed.into_iter().for_each(&mut add),
                    Err(e) => {
                        self.logger.error(&format!("{}: {}", url, e));
                        report.failed += 1;
                        break;
                    }
                }
                next = match self.scraper.next_listing_page(&page) {
                    Ok(next) => next,
                    Err(e) => {
                        self.logger.error(&format!("{}: {}", url, e));
                        None
                    }
                };
            }
        }

        stubs
    }

    /// `Ok(None)` when cancelled before the fetch.
    async fn ingest_article(&self, stub: Article) -> Result<Option<(ArticleStatus, String)>> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        let logger = self.logger.with_prefix(&stub.url);

        let result = async {
            let mut article = match self.storage.find_article(self.source.id, &stub.url).await? {
                Some(mut stored) => {
                    stored.merge_from(stub.clone());
                    stored
                }
                None => stub.clone(),
            };
            let page = self.fetch_page(&stub.url).await?;
            self.scraper.extract_article_into(&page, &mut article)?;
            let status = self.storage.upsert_article(&article).await?;
            Ok::<_, Error>((status, article.css_url))
        }
        .await;

        match result {
            Ok(done) => {
                logger.debug(&format!("{:?}", done.0));
                Ok(Some(done))
            }
            Err(e) => {
                logger.warn(&format!("{}", e));
                Err(e)
            }
        }
    }

    /// Stores the static pages and returns them.
    async fn ingest_pages(&self, report: &mut IngestReport) -> Vec<SourcePage> {
        let mut stored = Vec::new();
        for url in self.scraper.page_urls() {
            if self.cancel.is_cancelled() {
                break;
            }
            let pages = match self.fetch_page(&url).await {
                Ok(page) => self.scraper.extract_source_pages(&page),
                Err(e) => Err(e),
            };
            let mut pages = match pages {
                Ok(pages) => pages,
                Err(e) => {
                    self.logger.warn(&format!("Failed to ingest page {}: {}", url, e));
                    report.failed += 1;
                    continue;
                }
            };

            for page in pages.iter_mut().filter(|p| !p.is_primary) {
                let completed = match self.fetch_page(&page.url).await {
                    Ok(fetched) => self.scraper.complete_source_page(page, &fetched),
                    Err(e) => Err(e),
                };
                if let Err(e) = completed {
                    self.logger.warn(&format!("Failed to complete page {}: {}", page.url, e));
                    report.failed += 1;
                }
            }

            for page in pages {
                match self.storage.upsert_source_page(&page).await {
                    Ok(_) => {
                        report.pages += 1;
                        stored.push(page);
                    }
                    Err(e) => {
                        self.logger.error(&format!("Failed to store page {}: {}", page.url, e));
                        report.failed += 1;
                    }
                }
            }
        }
        stored
    }

    /// Fetches stylesheets not cached yet.
    async fn ingest_stylesheets(&self, urls: HashSet<String>, report: &mut IngestReport) {
        for url in urls {
            if self.cancel.is_cancelled() {
                break;
            }
            match self.storage.find_css(&url).await {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => {
                    self.logger.error(&format!("{}", e));
                    continue;
                }
            }

            let result = async {
                let page = self.fetch_page(&url).await?;
                self.storage.upsert_css(&Css::new(url.as_str(), page.html)).await
            }
            .await;
            match result {
                Ok(_) => report.stylesheets += 1,
                Err(e) => {
                    self.logger.warn(&format!("Failed to cache stylesheet {}: {}", url, e));
                    report.failed += 1;
                }
            }
        }
    }
}
