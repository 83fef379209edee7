use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Article, Css, Source, SourcePage};
use crate::Result;

/// Outcome of an upsert, compared against what was already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleStatus {
    New,
    Updated,
    Unchanged,
}

/// Persistence collaborator. Articles and source pages are keyed by
/// `(source_id, url)`, stylesheets by `url`.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// All known sources, enabled or not.
    async fn sources(&self) -> Result<Vec<Source>>;

    /// Enable or disable ingestion for the source with the given name.
    async fn set_source_enabled(&self, name: &str, enabled: bool) -> Result<()>;

    /// Insert or update an article, assigning an id on insert.
    async fn upsert_article(&self, article: &Article) -> Result<ArticleStatus>;

    async fn find_article(&self, source_id: i64, url: &str) -> Result<Option<Article>>;

    /// Get all articles from a specific source
    async fn get_by_source(&self, source_id: i64) -> Result<Vec<Article>>;

    /// Insert or update a source page. Storing a primary page demotes any
    /// other primary page of the same source.
    async fn upsert_source_page(&self, page: &SourcePage) -> Result<ArticleStatus>;

    async fn source_pages(&self, source_id: i64) -> Result<Vec<SourcePage>>;

    async fn upsert_css(&self, css: &Css) -> Result<ArticleStatus>;

    async fn find_css(&self, url: &str) -> Result<Option<Css>>;
}
