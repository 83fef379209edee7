use nt_core::Result;

use crate::scrapers::cascade::Candidate;
use crate::scrapers::sanitize::{self, SanitizeStep};
use crate::toolkit::dom;

/// Where each article field lives on a publisher's article pages.
#[derive(Debug, Clone, Copy)]
pub struct ArticleSelectors {
    pub title: &'static [Candidate],
    pub section: &'static [Candidate],
    pub theme: &'static [Candidate],
    pub author: &'static [Candidate],
    pub date: &'static [Candidate],
    pub description: &'static [Candidate],
    /// Container serialized (after sanitation) as the article body.
    pub body: &'static str,
    /// Lead image element.
    pub image: &'static str,
}

/// Category listing pages: one entry per item, in document order.
#[derive(Debug, Clone, Copy)]
pub struct ListingSelectors {
    pub item: &'static str,
    /// Anchor inside an item (or the item itself) holding the article URL.
    pub link: &'static str,
    pub date: &'static [Candidate],
    /// A highlighted entry shown outside the regular list.
    pub top_story: Option<&'static str>,
    /// Anchor pointing at the next listing page.
    pub next_page: Option<&'static str>,
}

/// Static pages ("qui sommes-nous", "contact", ...).
#[derive(Debug, Clone, Copy)]
pub struct PageSelectors {
    pub title: &'static [Candidate],
    pub body: &'static str,
    /// Classes of the anchors that link to sibling static pages.
    pub nav_buttons: &'static [&'static str],
    /// Button label given to the primary page.
    pub primary_button: &'static str,
}

/// Everything that differs between publishers. Adapters are this data plus
/// the odd custom extractor; the extraction logic itself is shared.
#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub name: &'static str,
    /// Always ends with `/`.
    pub base_url: &'static str,
    pub host: &'static str,
    pub feed_path: &'static str,
    pub listing_paths: &'static [&'static str],
    pub page_paths: &'static [&'static str],
    pub stylesheet: &'static str,
    pub article: ArticleSelectors,
    pub listing: ListingSelectors,
    pub pages: PageSelectors,
    pub pipeline: &'static [SanitizeStep],
}

impl SiteProfile {
    pub fn feed_url(&self) -> String {
        format!("{}{}", self.base_url, self.feed_path)
    }

    pub fn listing_urls(&self) -> Vec<String> {
        self.listing_paths
            .iter()
            .map(|path| format!("{}{}", self.base_url, path))
            .collect()
    }

    pub fn page_urls(&self) -> Vec<String> {
        self.page_paths
            .iter()
            .map(|path| format!("{}{}", self.base_url, path))
            .collect()
    }

    /// Compiles every selector and checks the pipeline order, so a broken
    /// table fails loudly instead of silently yielding blank fields.
    pub fn validate(&self) -> Result<()> {
        let candidates = [
            self.article.title,
            self.article.section,
            self.article.theme,
            self.article.author,
            self.article.date,
            self.article.description,
            self.listing.date,
            self.pages.title,
        ];

        let mut selectors: Vec<&str> = candidates
            .iter()
            .flat_map(|list| list.iter().flat_map(Candidate::selectors))
            .collect();
        selectors.extend([
            self.stylesheet,
            self.article.body,
            self.article.image,
            self.listing.item,
            self.listing.link,
            self.pages.body,
        ]);
        selectors.extend(self.listing.top_story);
        selectors.extend(self.listing.next_page);
        selectors.extend(self.pipeline.iter().flat_map(SanitizeStep::selectors));

        for selector in selectors {
            dom::compile(selector)?;
        }
        sanitize::validate(self.pipeline)
    }
}
