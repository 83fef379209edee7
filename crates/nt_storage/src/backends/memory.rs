use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use nt_core::{Article, ArticleStatus, ArticleStorage, Css, Error, Result, Source, SourcePage};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Everything the store holds, in insertion order. Serialized as is for
/// snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sources: Vec<Source>,
    pub articles: Vec<Article>,
    pub source_pages: Vec<SourcePage>,
    pub stylesheets: Vec<Css>,
}

#[derive(Debug, Default)]
struct MemoryStore {
    data: Snapshot,
    next_id: i64,
}

impl MemoryStore {
    fn from_snapshot(data: Snapshot) -> Self {
        let next_id = data
            .articles
            .iter()
            .map(|a| a.id)
            .chain(data.source_pages.iter().map(|p| p.id))
            .chain(data.stylesheets.iter().map(|c| c.id))
            .max()
            .unwrap_or(0);
        Self { data, next_id }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn upsert_article(&mut self, article: &Article) -> ArticleStatus {
        let existing = self
            .data
            .articles
            .iter()
            .position(|a| a.source_id == article.source_id && a.url == article.url);

        match existing {
            Some(i) => {
                let stored = &mut self.data.articles[i];
                let mut incoming = article.clone();
                incoming.id = stored.id;
                if *stored == incoming {
                    ArticleStatus::Unchanged
                } else {
                    *stored = incoming;
                    ArticleStatus::Updated
                }
            }
            None => {
                let mut incoming = article.clone();
                incoming.id = self.allocate_id();
                self.data.articles.push(incoming);
                ArticleStatus::New
            }
        }
    }

    fn upsert_source_page(&mut self, page: &SourcePage) -> ArticleStatus {
        if page.is_primary {
            for other in self
                .data
                .source_pages
                .iter_mut()
                .filter(|p| p.source_id == page.source_id && p.url != page.url)
            {
                other.is_primary = false;
            }
        }

        let existing = self
            .data
            .source_pages
            .iter()
            .position(|p| p.source_id == page.source_id && p.url == page.url);

        match existing {
            Some(i) => {
                let stored = &mut self.data.source_pages[i];
                let mut incoming = page.clone();
                incoming.id = stored.id;
                if *stored == incoming {
                    ArticleStatus::Unchanged
                } else {
                    *stored = incoming;
                    ArticleStatus::Updated
                }
            }
            None => {
                let mut incoming = page.clone();
                incoming.id = self.allocate_id();
                self.data.source_pages.push(incoming);
                ArticleStatus::New
            }
        }
    }

    fn upsert_css(&mut self, css: &Css) -> ArticleStatus {
        match self.data.stylesheets.iter().position(|c| c.url == css.url) {
            Some(i) => {
                let stored = &mut self.data.stylesheets[i];
                if stored.style == css.style {
                    ArticleStatus::Unchanged
                } else {
                    stored.style = css.style.clone();
                    ArticleStatus::Updated
                }
            }
            None => {
                let mut incoming = css.clone();
                incoming.id = self.allocate_id();
                self.data.stylesheets.push(incoming);
                ArticleStatus::New
            }
        }
    }
}

/// Process-local storage behind a tokio `RwLock`. Sources are seeded at
/// construction; nothing creates them afterwards.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new(sources: Vec<Source>) -> Self {
        Self::from_snapshot(Snapshot {
            sources,
            ..Default::default()
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::from_snapshot(snapshot))),
        }
    }

    /// Loads a snapshot written by [`write_snapshot`](Self::write_snapshot).
    /// Seeded sources missing from the file are added, so a snapshot taken
    /// before a publisher was introduced still loads.
    pub async fn load(path: impl AsRef<Path>, sources: Vec<Source>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let mut snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        for source in sources {
            if !snapshot.sources.iter().any(|s| s.id == source.id) {
                snapshot.sources.push(source);
            }
        }
        debug!(
            "Loaded {} articles from {}",
            snapshot.articles.len(),
            path.as_ref().display()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.store.read().await.data.clone()
    }

    pub async fn write_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.snapshot().await)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn sources(&self) -> Result<Vec<Source>> {
        Ok(self.store.read().await.data.sources.clone())
    }

    async fn set_source_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut store = self.store.write().await;
        let source = store
            .data
            .sources
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::Storage(format!("Unknown source: {}", name)))?;
        source.is_enabled = enabled;
        Ok(())
    }

    async fn upsert_article(&self, article: &Article) -> Result<ArticleStatus> {
        if article.url.trim().is_empty() {
            return Err(Error::Storage("Refusing to store an article without url".to_string()));
        }
        Ok(self.store.write().await.upsert_article(article))
    }

    async fn find_article(&self, source_id: i64, url: &str) -> Result<Option<Article>> {
        Ok(self
            .store
            .read()
            .await
            .data
            .articles
            .iter()
            .find(|a| a.source_id == source_id && a.url == url)
            .cloned())
    }

    async fn get_by_source(&self, source_id: i64) -> Result<Vec<Article>> {
        Ok(self
            .store
            .read()
            .await
            .data
            .articles
            .iter()
            .filter(|a| a.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn upsert_source_page(&self, page: &SourcePage) -> Result<ArticleStatus> {
        Ok(self.store.write().await.upsert_source_page(page))
    }

    async fn source_pages(&self, source_id: i64) -> Result<Vec<SourcePage>> {
        let store = self.store.read().await;
        let mut pages: Vec<_> = store
            .data
            .source_pages
            .iter()
            .filter(|p| p.source_id == source_id)
            .cloned()
            .collect();
        pages.sort_by_key(|p| p.position);
        Ok(pages)
    }

    async fn upsert_css(&self, css: &Css) -> Result<ArticleStatus> {
        Ok(self.store.write().await.upsert_css(css))
    }

    async fn find_css(&self, url: &str) -> Result<Option<Css>> {
        Ok(self
            .store
            .read()
            .await
            .data
            .stylesheets
            .iter()
            .find(|c| c.url == url)
            .cloned())
    }
}
