use crate::scrapers::cascade::Candidate;
use crate::scrapers::profile::{ArticleSelectors, ListingSelectors, PageSelectors, SiteProfile};
use crate::scrapers::sanitize::SanitizeStep;
use crate::scrapers::{Scraper, SourceMetadata};

use super::REGION;

const PROFILE: SiteProfile = SiteProfile {
    name: "Acrimed",
    base_url: "https://www.acrimed.org/",
    host: "acrimed.org",
    feed_path: "spip.php?page=backend",
    listing_paths: &["Medias-et-journalisme", "Informations-et-medias", "Economie-des-medias"],
    page_paths: &["Qui-sommes-nous"],
    stylesheet: "link[rel='stylesheet'][href*='acrimed']",
    article: ArticleSelectors {
        title: &[Candidate::Text("h1.titre-article"), Candidate::Meta("og:title")],
        section: &[Candidate::ListItem("ul.fil-ariane", 1)],
        theme: &[Candidate::Text(".surtitre")],
        author: &[
            Candidate::Text(".auteurs a"),
            Candidate::ListItem("ul.auteurs", 0),
            Candidate::JsonLdAuthor,
        ],
        date: &[
            Candidate::Attr("time[datetime]", "datetime"),
            Candidate::Text(".date-article"),
        ],
        description: &[Candidate::Text(".chapo"), Candidate::Meta("description")],
        body: "div.texte",
        image: ".logo img",
    },
    listing: ListingSelectors {
        item: ".liste-articles .article",
        link: "h3 a",
        date: &[Candidate::Attr("time", "datetime"), Candidate::Text(".date")],
        top_story: None,
        next_page: Some(".pagination a.lien_pagination[rel='next']"),
    },
    pages: PageSelectors {
        title: &[Candidate::Text("h1"), Candidate::Meta("og:title")],
        body: "div.texte",
        nav_buttons: &["bouton", "bouton-rubrique"],
        primary_button: "Qui sommes-nous ?",
    },
    pipeline: &[
        SanitizeStep::AppendFootnotes("div.notes"),
        SanitizeStep::RewriteUrls,
        SanitizeStep::MarkCssAnchor("acrimed-article"),
        SanitizeStep::StripWidgets(&["div.forum", ".partage-reseaux", "script"]),
        SanitizeStep::EscapeHashtags,
        SanitizeStep::ForceHttps,
    ],
};

#[derive(Debug, Clone, Default)]
pub struct AcrimedScraper;

impl AcrimedScraper {
    pub fn new() -> Self {
        Self
    }
}

impl Scraper for AcrimedScraper {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }

    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: 3,
            name: "Acrimed",
            emoji: "📺",
            region: REGION,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["acrimed"]
    }
}
