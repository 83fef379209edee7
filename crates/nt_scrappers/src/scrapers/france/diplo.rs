use std::sync::LazyLock;

use kuchikiki::NodeRef;
use nt_core::Result;
use regex::Regex;

use crate::scrapers::cascade::Candidate;
use crate::scrapers::profile::{ArticleSelectors, ListingSelectors, PageSelectors, SiteProfile};
use crate::scrapers::sanitize::SanitizeStep;
use crate::scrapers::{Scraper, SourceMetadata};
use crate::toolkit::{dates, dom};

use super::REGION;

const PROFILE: SiteProfile = SiteProfile {
    name: "Le Monde diplomatique",
    base_url: "https://www.monde-diplomatique.fr/",
    host: "monde-diplomatique.fr",
    feed_path: "recents.xml",
    listing_paths: &["index/sujet/ecologie", "index/sujet/medias", "index/sujet/travail"],
    page_paths: &["diplo/apropos"],
    stylesheet: "link[rel='stylesheet'][href*='diplo']",
    article: ArticleSelectors {
        title: &[Candidate::Text("h1.h1"), Candidate::Meta("og:title")],
        section: &[Candidate::Text(".cartouche .rubrique")],
        theme: &[Candidate::Text(".cartouche .surtitre")],
        author: &[
            Candidate::Text(".lesauteurs .auteur"),
            Candidate::TextAfter(".cartouche hr"),
            Candidate::Meta("author"),
        ],
        date: &[
            Candidate::Meta("article:published_time"),
            Candidate::Custom(issue_date),
        ],
        description: &[Candidate::Text(".chapo"), Candidate::Meta("description")],
        body: "div.texte",
        image: ".logo_article img",
    },
    listing: ListingSelectors {
        item: ".liste li.unarticle",
        link: "a",
        date: &[Candidate::Custom(issue_date)],
        top_story: None,
        next_page: Some(".pagination a.suivant"),
    },
    pages: PageSelectors {
        title: &[Candidate::Text("h1"), Candidate::Meta("og:title")],
        body: "div.texte",
        nav_buttons: &["bouton_apropos"],
        primary_button: "À propos",
    },
    pipeline: &[
        SanitizeStep::AppendFootnotes("div.notes"),
        SanitizeStep::RewriteUrls,
        SanitizeStep::MarkCssAnchor("diplo-article"),
        SanitizeStep::StripWidgets(&[".abonnement", ".partage", "script"]),
        SanitizeStep::EscapeHashtags,
        SanitizeStep::ForceHttps,
    ],
};

static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([^\W\d_]+)\s+(\d{4})$").expect("MONTH_YEAR is a valid static regex pattern")
});

/// Articles are dated by monthly issue ("octobre 2020"); the issue resolves
/// to the first day of that month.
fn issue_date(scope: &NodeRef) -> Result<Option<String>> {
    let Some(node) = dom::select_first(scope, ".dates_auteurs .date, .date")? else {
        return Ok(None);
    };
    let text = dom::text_of(&node).to_lowercase();

    let Some(caps) = MONTH_YEAR.captures(&text) else {
        // Already a full date, let the generic parsers have it.
        return Ok(Some(text));
    };
    let month = &caps[1];
    let known = dates::FRENCH_MONTHS.iter().any(|(name, _)| *name == month);
    Ok(known.then(|| format!("1 {} {}", month, &caps[2])))
}

#[derive(Debug, Clone, Default)]
pub struct DiploScraper;

impl DiploScraper {
    pub fn new() -> Self {
        Self
    }
}

impl Scraper for DiploScraper {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }

    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: 4,
            name: "Le Monde diplomatique",
            emoji: "🗞️",
            region: REGION,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["diplo", "monde-diplomatique"]
    }
}
