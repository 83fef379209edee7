use crate::scrapers::cascade::Candidate;
use crate::scrapers::profile::{ArticleSelectors, ListingSelectors, PageSelectors, SiteProfile};
use crate::scrapers::sanitize::SanitizeStep;
use crate::scrapers::{Scraper, SourceMetadata};

use super::REGION;

const PROFILE: SiteProfile = SiteProfile {
    name: "Basta!",
    base_url: "https://basta.media/",
    host: "basta.media",
    feed_path: "spip.php?page=backend",
    listing_paths: &["Alternatives", "Inegalites", "Ecologie", "Politique"],
    page_paths: &["Qui-sommes-nous"],
    stylesheet: "link[rel='stylesheet'][href*='basta']",
    article: ArticleSelectors {
        title: &[Candidate::Text("h1.titre"), Candidate::Meta("og:title")],
        section: &[Candidate::Text(".rubrique a")],
        theme: &[Candidate::Text(".surtitre")],
        author: &[
            Candidate::Text(".auteurs a"),
            Candidate::OwnText(".signature"),
            Candidate::JsonLdAuthor,
        ],
        date: &[
            Candidate::Attr("abbr.published", "title"),
            Candidate::Text(".info-publi"),
        ],
        description: &[Candidate::Text(".chapo"), Candidate::Meta("og:description")],
        body: "div.texte",
        image: ".logo-article img",
    },
    listing: ListingSelectors {
        item: "ul.liste-articles > li",
        link: "a",
        date: &[
            Candidate::Attr("abbr.published", "title"),
            Candidate::Text(".info-publi"),
        ],
        top_story: None,
        next_page: Some(".pagination a[rel='next']"),
    },
    pages: PageSelectors {
        title: &[Candidate::Text("h1"), Candidate::Meta("og:title")],
        body: "div.texte",
        nav_buttons: &["lien-page"],
        primary_button: "Qui sommes-nous ?",
    },
    pipeline: &[
        SanitizeStep::AppendFootnotes("div.notes"),
        SanitizeStep::RewriteUrls,
        SanitizeStep::MarkCssAnchor("basta-article"),
        SanitizeStep::StripWidgets(&["div.forum", ".soutenir", "script", "iframe[src*='newsletter']"]),
        SanitizeStep::EscapeHashtags,
        SanitizeStep::ForceHttps,
    ],
};

#[derive(Debug, Clone, Default)]
pub struct BastaScraper;

impl BastaScraper {
    pub fn new() -> Self {
        Self
    }
}

impl Scraper for BastaScraper {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }

    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: 2,
            name: "Basta!",
            emoji: "✊",
            region: REGION,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["basta", "bastamag"]
    }
}
